//! Closed-form combination formulas over an interpolated reference curve.
//!
//! Every formula reads the curve through [`ReferenceCurve`] and only calls
//! formulas defined above it in this file, so evaluation is a fixed-depth
//! call tree with no shared state. Branch guards and operator order are
//! empirical and must stay exactly as written.

use crate::domain::EvaluationRequest;
use crate::table::{ReferenceCurve, TableError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type FormulaResult = Result<f64, TableError>;

const KERNEL1_PRIMARY: f64 = 73.1389;
const KERNEL1_SHIFTED: f64 = 14.838;
const KERNEL2_PRIMARY: f64 = 83.1389;
const KERNEL2_SWAPPED: f64 = 4.838;
const COMBINE2_SCALE: f64 = 1.44;
const FALLBACK_X2: f64 = 4.349;
const FALLBACK_Y: f64 = 23.23;
const FALLBACK_XYZ: f64 = 2.348;

/// Top-level rule that produced an [`Evaluation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchBranch {
    Fun1,
    Kernel1,
    Kernel2,
    Fallback,
}

impl DispatchBranch {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fun1 => "fun1",
            Self::Kernel1 => "kernel1",
            Self::Kernel2 => "kernel2",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for DispatchBranch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub value: f64,
    pub branch: DispatchBranch,
}

/// The formula set bound to one read-only reference curve.
#[derive(Debug)]
pub struct FormulaCascade<'a, C: ReferenceCurve + ?Sized> {
    curve: &'a C,
}

impl<'a, C: ReferenceCurve + ?Sized> FormulaCascade<'a, C> {
    pub fn new(curve: &'a C) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &'a C {
        self.curve
    }

    pub fn ref_a(&self, coordinate: f64) -> FormulaResult {
        self.curve.ref_a(coordinate)
    }

    pub fn ref_b(&self, coordinate: f64) -> FormulaResult {
        self.curve.ref_b(coordinate)
    }

    pub fn delta_z(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        if x > y {
            Ok(self.ref_a(x)? + self.ref_b(z)? - self.ref_a(y)?)
        } else {
            Ok(self.ref_a(y)? + self.ref_b(y)? - self.ref_b(z)?)
        }
    }

    /// Strict `x² + 2y > 1` guard; the boundary value takes the second branch.
    pub fn combine1(&self, x: f64, y: f64) -> FormulaResult {
        let val = x * x + 2.0 * y;
        if val > 1.0 {
            Ok(self.delta_z(x, y, x)? + y * val.ln())
        } else {
            Ok(y + self.delta_z(y, x, y)?)
        }
    }

    pub fn q_factor(&self, x: f64, y: f64) -> FormulaResult {
        if x.abs() < 1.0 {
            Ok(x * self.combine1(x, y)?)
        } else {
            Ok(y * self.combine1(x, y)?)
        }
    }

    pub fn r_factor(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        if x > y {
            Ok(x * y * self.q_factor(y, z)?)
        } else {
            Ok(x * z * self.q_factor(x, y)?)
        }
    }

    pub fn kernel1(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        Ok(KERNEL1_PRIMARY * self.r_factor(x, y, z)?
            + KERNEL1_SHIFTED * self.r_factor(x - y, z, y)?)
    }

    pub fn fun1(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        let direct = self.kernel1(x, y, z)?;
        let swapped = self.kernel1(x, z, y)?;
        Ok(x * direct + y * swapped - z * swapped)
    }

    pub fn combine2(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        if z >= y {
            Ok(self.delta_z(x, y, z)? + COMBINE2_SCALE * y * z)
        } else {
            Ok(COMBINE2_SCALE * y * self.delta_z(z, x, y)?)
        }
    }

    /// Not reached from [`Self::evaluate`]; kept as part of the formula set.
    pub fn combine3(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        if z > y {
            Ok(self.delta_z(x, y, z)? + y * z)
        } else {
            Ok(y + self.delta_z(z, x, y)?)
        }
    }

    // q_factor1 and r_factor2 repeat q_factor and r_factor on purpose: the
    // dispatch guard depends on them and they must not be folded together.
    pub fn q_factor1(&self, x: f64, y: f64) -> FormulaResult {
        if x.abs() < 1.0 {
            Ok(x * self.combine1(x, y)?)
        } else {
            Ok(y * self.combine1(x, y)?)
        }
    }

    pub fn r_factor2(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        if x > y {
            Ok(x * y * self.q_factor1(y, z)?)
        } else {
            Ok(x * z * self.q_factor1(x, y)?)
        }
    }

    pub fn q_factor2(&self, x: f64, y: f64) -> FormulaResult {
        if x.abs() < 1.0 {
            Ok(x * self.combine2(x, y, y)?)
        } else {
            Ok(y * self.combine2(x, y, y)?)
        }
    }

    pub fn r_factor3(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        if x > y {
            Ok(x * y * self.q_factor2(y, z)?)
        } else {
            Ok(x * z * self.q_factor2(x, y)?)
        }
    }

    pub fn kernel2(&self, x: f64, y: f64, z: f64) -> FormulaResult {
        Ok(KERNEL2_PRIMARY * self.r_factor3(x, y, z)?
            + KERNEL2_SWAPPED * self.r_factor3(x, z, y)?)
    }

    /// Picks the first applicable rule and evaluates it.
    ///
    /// The zero tests on `r_factor2` and `r_factor3` are exact comparisons.
    pub fn evaluate(&self, x: f64, y: f64, z: f64) -> Result<Evaluation, TableError> {
        let (branch, value) = if x * x + 2.0 * y > 1.0 {
            (DispatchBranch::Fun1, self.fun1(x, y, z)?)
        } else if self.r_factor2(x, y, z)? != 0.0 {
            (DispatchBranch::Kernel1, self.kernel1(x, y, z)?)
        } else if self.r_factor3(x, y, z)? != 0.0 {
            (DispatchBranch::Kernel2, self.kernel2(x, y, z)?)
        } else {
            (DispatchBranch::Fallback, fallback(x, y, z))
        };

        tracing::debug!(x, y, z, %branch, value, "cascade evaluated");
        Ok(Evaluation { value, branch })
    }
}

/// Closed-form last resort; needs no reference curve.
pub fn fallback(x: f64, y: f64, z: f64) -> f64 {
    FALLBACK_X2 * x * x + FALLBACK_Y * y - FALLBACK_XYZ * x * y * z
}

/// Evaluates the cascade at `(x, y, z)` against `curve`.
pub fn evaluate<C: ReferenceCurve + ?Sized>(curve: &C, x: f64, y: f64, z: f64) -> FormulaResult {
    FormulaCascade::new(curve)
        .evaluate(x, y, z)
        .map(|evaluation| evaluation.value)
}

pub fn evaluate_traced<C: ReferenceCurve + ?Sized>(
    curve: &C,
    request: EvaluationRequest,
) -> Result<Evaluation, TableError> {
    FormulaCascade::new(curve).evaluate(request.x, request.y, request.z)
}
