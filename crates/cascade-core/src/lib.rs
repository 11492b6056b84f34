pub mod cascade;
pub mod domain;
pub mod table;

pub use cascade::{DispatchBranch, Evaluation, FormulaCascade, evaluate, evaluate_traced};
pub use domain::{CascadeError, CascadeResult, ErrorCategory, EvaluationRequest};
pub use table::{ReferenceCurve, ReferenceField, ReferenceTable, Sample, TableError, TableKind};
