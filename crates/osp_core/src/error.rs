use std::fmt;

use thiserror::Error;

use crate::validation::ValidationError;

/// Which uniqueness guarantee a write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The generated public identifier is already allocated. Retryable.
    RequestId,
    /// The payment reference has already been claimed by another request.
    Utr,
    ServiceName,
    /// The service is still referenced by at least one request.
    ServiceInUse,
}

impl ConflictKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ConflictKind::RequestId)
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConflictKind::RequestId => "request identifier is already allocated",
            ConflictKind::Utr => "payment reference (UTR) has already been used",
            ConflictKind::ServiceName => "a service with this name already exists",
            ConflictKind::ServiceInUse => "service is referenced by existing requests",
        };
        f.write_str(msg)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a single-field validation failure.
    pub fn invalid(code: &str, field: &str, message: impl Into<String>) -> Self {
        Error::Validation(vec![ValidationError::new(code, field, message)])
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_field() {
        let err = Error::Validation(vec![
            ValidationError::new("OSP-001", "fullName", "full name is required"),
            ValidationError::new("OSP-002", "phone", "phone must be exactly 10 digits"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: fullName: full name is required; phone: phone must be exactly 10 digits"
        );
    }

    #[test]
    fn only_request_id_conflicts_are_retryable() {
        assert!(ConflictKind::RequestId.is_retryable());
        assert!(!ConflictKind::Utr.is_retryable());
        assert!(!ConflictKind::ServiceName.is_retryable());
        assert!(!ConflictKind::ServiceInUse.is_retryable());
    }
}
