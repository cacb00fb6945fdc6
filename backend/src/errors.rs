//! Error types for the scheduling engine.
//!
//! Validation errors are raised client-side and never reach the repository.
//! Remote and not-found errors come back from the repository collaborator and
//! are surfaced to the user the same way.

use thiserror::Error;
use uuid::Uuid;

/// Shared `Result` alias for the backend crate.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Client-side validation failures that block a submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("At least one customer is required")]
    NoCustomers,
    #[error("Customer {index} name cannot be empty")]
    EmptyCustomerName { index: usize },
    #[error("Customer {index} phone cannot be empty")]
    EmptyCustomerPhone { index: usize },
    #[error("Treatment type cannot be empty")]
    EmptyTreatmentType,
    #[error("End time must be after start time")]
    EndNotAfterStart,
    #[error("Invalid hex color: {0}")]
    InvalidColor(String),
    #[error("Color {0} is already used by another staff member")]
    ColorInUse(String),
    #[error("At least one treatment type is required")]
    NoTreatmentTypes,
}

/// Top-level error type for the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("remote failure in {context}: {details}")]
    Remote {
        context: &'static str,
        details: String,
    },

    #[error("record not found: {id}")]
    NotFound { id: Uuid },

    #[error("invalid configuration: {details}")]
    Config { details: String },

    #[error("schedule store is no longer running")]
    StoreClosed,
}

impl ScheduleError {
    pub fn remote(context: &'static str, details: impl Into<String>) -> Self {
        Self::Remote {
            context,
            details: details.into(),
        }
    }

    pub fn config(details: impl Into<String>) -> Self {
        Self::Config {
            details: details.into(),
        }
    }

    /// Whether this failure came back from the repository collaborator
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::NotFound { .. })
    }

    /// Message suitable for showing next to the failed action.
    ///
    /// Not-found is reported like any other remote failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Remote { context, .. } => format!("Failed to {}", context),
            Self::NotFound { .. } => "Failed to find the record, it may have been removed".to_string(),
            Self::Config { details } => format!("Configuration error: {}", details),
            Self::StoreClosed => "Calendar is not running".to_string(),
        }
    }
}
