//! Validation error types

use std::fmt;

/// Validation error for user payloads and identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email, identifier)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Numeric field below zero
    Negative { field: &'static str },

    /// Request body could not be decoded into a payload
    Body { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::Negative { field } => write!(f, "{} cannot be negative", field),
            Self::Body { reason } => write!(f, "invalid request body: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "email",
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "email exceeds maximum length of 255 characters"
        );

        let err = ValidationError::Negative { field: "age" };
        assert_eq!(err.to_string(), "age cannot be negative");
    }

    #[test]
    fn body_error_keeps_reason() {
        let err = ValidationError::Body {
            reason: "missing field `age`".into(),
        };
        assert!(err.to_string().contains("missing field `age`"));
    }
}
