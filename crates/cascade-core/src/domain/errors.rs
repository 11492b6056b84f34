use crate::table::TableError;
use std::fmt::{Display, Formatter};

pub type CascadeResult<T> = Result<T, CascadeError>;

/// Failure class of a [`CascadeError`]. Each class owns one process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Input,
    Io,
    Computation,
    Internal,
}

impl ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Input => 2,
            Self::Io => 3,
            Self::Computation => 4,
            Self::Internal => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Io => "io",
            Self::Computation => "computation",
            Self::Internal => "internal",
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure reported to the user with a stable dotted code such as
/// `IO.TABLE_OPEN`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} error [{code}] {message}")]
pub struct CascadeError {
    category: ErrorCategory,
    code: &'static str,
    message: String,
}

impl CascadeError {
    pub fn input_validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::Input, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::Io, code, message)
    }

    pub fn computation(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::Computation, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_category(ErrorCategory::Internal, code, message)
    }

    fn with_category(
        category: ErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    /// First stderr line, e.g. `ERROR: [IO.TABLE_OPEN] failed to open ...`.
    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl From<TableError> for CascadeError {
    fn from(error: TableError) -> Self {
        let code = match error {
            TableError::EmptyTable => "RUN.EMPTY_TABLE",
            TableError::DegenerateSpan { .. } => "RUN.DEGENERATE_TABLE",
        };
        Self::computation(code, error.to_string())
    }
}
