use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Which reference table applies to a given `x` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    High,
    Unit,
    Low,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [Self::High, Self::Unit, Self::Low];

    /// `x > 1` selects `High`, `|x| == 1` selects `Unit`, anything else
    /// (including `x < -1` and NaN) selects `Low`.
    pub fn for_coordinate(x: f64) -> Self {
        if x > 1.0 {
            Self::High
        } else if x == 1.0 || x == -1.0 {
            Self::Unit
        } else {
            Self::Low
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::High => "dat_X_1_1.dat",
            Self::Unit => "dat_X_1_00.dat",
            Self::Low => "dat_X_00_1.dat",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Unit => "unit",
            Self::Low => "low",
        }
    }

    pub fn path_in(self, table_dir: &Path) -> PathBuf {
        table_dir.join(self.file_name())
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
