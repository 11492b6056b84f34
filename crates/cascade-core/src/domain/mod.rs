pub mod errors;

pub use errors::{CascadeError, CascadeResult, ErrorCategory};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The three reduced-state coordinates of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EvaluationRequest {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Parses exactly three whitespace-separated numbers.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let x = tokens.next()?.parse::<f64>().ok()?;
        let y = tokens.next()?.parse::<f64>().ok()?;
        let z = tokens.next()?.parse::<f64>().ok()?;
        if tokens.next().is_some() {
            return None;
        }
        Some(Self::new(x, y, z))
    }
}

impl Display for EvaluationRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::EvaluationRequest;

    #[test]
    fn parses_three_numeric_tokens() {
        let request = EvaluationRequest::parse("  0.5\t-1  2e-1 ").expect("request");
        assert_eq!(request, EvaluationRequest::new(0.5, -1.0, 0.2));
        assert_eq!(request.to_string(), "(0.5, -1, 0.2)");
    }

    #[test]
    fn rejects_missing_extra_or_non_numeric_tokens() {
        assert!(EvaluationRequest::parse("1 2").is_none());
        assert!(EvaluationRequest::parse("1 2 3 4").is_none());
        assert!(EvaluationRequest::parse("1 two 3").is_none());
        assert!(EvaluationRequest::parse("").is_none());
    }
}
