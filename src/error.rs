//! Engine error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced before any scheduling happens.
///
/// Placement shortfalls are not errors: they are reported in
/// [`PlacementReport`](crate::scheduler::PlacementReport).
#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("invalid timetable configuration ({} issue(s)): {}", .0.len(), join_messages(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("failed to parse timetable input: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type TimetableResult<T> = Result<T, TimetableError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for TimetableError {
    fn from(errors: Vec<ValidationError>) -> Self {
        TimetableError::InvalidConfig(errors)
    }
}
