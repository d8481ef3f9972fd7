//! Error types for review validation and the document store.

use crate::models::RatingCategory;
use thiserror::Error;

/// A submitted review was rejected before reaching the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{category} rating {value} is outside the range 0-5")]
    InvalidRating {
        category: RatingCategory,
        value: f64,
    },

    #[error("{category} rating is required")]
    MissingRating { category: RatingCategory },

    #[error("access tag names must not be blank")]
    EmptyTag,
}

/// Document store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("facility {id} was modified concurrently (expected revision {expected}, found {actual})")]
    RevisionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn facility_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "facility",
            id: id.to_string(),
        }
    }
}

/// Errors surfaced by the review workflow.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid review: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagCategory;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::InvalidRating {
            category: TagCategory::Sensory,
            value: 7.0,
        };
        assert_eq!(err.to_string(), "Sensory rating 7 is outside the range 0-5");

        let err = StoreError::facility_not_found("abc");
        assert_eq!(err.to_string(), "facility not found: abc");
    }

    #[test]
    fn test_service_error_wraps_validation() {
        let err: ServiceError = ValidationError::EmptyTag.into();
        assert!(matches!(err, ServiceError::Validation(ValidationError::EmptyTag)));
        assert_eq!(err.to_string(), "invalid review: access tag names must not be blank");
    }
}
