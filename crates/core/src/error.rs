//! Domain error model.

use thiserror::Error;

use crate::id::MaterialId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// stock accounting, conflicts). Storage and transport concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (negative capacity, empty name, ...).
    #[error("{0}")]
    Validation(String),

    /// A referenced record does not exist (or is outside the acting store).
    #[error("{0}")]
    NotFound(String),

    /// A restock would push a material past its `max_capacity`.
    #[error("Invalid restock quantity")]
    CapacityExceeded {
        material_id: MaterialId,
        requested: i64,
        max_capacity: i64,
    },

    /// A sale would drive a material's `current_capacity` below zero.
    #[error("Please enter a valid sale data")]
    InsufficientStock {
        material_id: MaterialId,
        required: i64,
        available: i64,
    },

    /// A derived value could not be computed (e.g. division by zero).
    #[error("computation failed: {0}")]
    Computation(String),

    /// A uniqueness rule was violated (duplicate name, second store, ...).
    #[error("{0}")]
    Conflict(String),

    /// Credentials or identity were rejected.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// True for the failures a batch (restock/sale) reports back to the caller
    /// as an `error_messages` body instead of a hard failure status.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(_)
                | DomainError::NotFound(_)
                | DomainError::CapacityExceeded { .. }
                | DomainError::InsufficientStock { .. }
                | DomainError::Conflict(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_errors_render_caller_facing_messages() {
        let exceeded = DomainError::CapacityExceeded {
            material_id: MaterialId::new(1),
            requested: 120,
            max_capacity: 100,
        };
        assert_eq!(exceeded.to_string(), "Invalid restock quantity");

        let short = DomainError::InsufficientStock {
            material_id: MaterialId::new(1),
            required: 500,
            available: 100,
        };
        assert_eq!(short.to_string(), "Please enter a valid sale data");
    }

    #[test]
    fn computation_and_auth_failures_are_not_soft() {
        assert!(!DomainError::computation("division by zero").is_soft());
        assert!(!DomainError::Unauthorized.is_soft());
        assert!(DomainError::not_found("Material doesn't exists!").is_soft());
    }
}
