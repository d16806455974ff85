//! Contract error types for the newsroom module
//!
//! These errors are transport-agnostic. The REST layer maps them onto
//! problem-details responses in `api::rest::error`.

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Newsroom domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewsroomError {
    /// Resource does not exist (or is hidden from the caller)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Missing, expired or invalid credentials
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Caller is authenticated but lacks the permission
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Input rejected by a business rule
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    /// Duplicate unique key or a dependent row blocks the change
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// The requested workflow transition does not exist
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// An outbound collaborator (email, storage) refused the request
    #[error("Delivery failed: {reason}")]
    Delivery { reason: String },

    /// Anything else; the cause is logged where it happened
    #[error("Internal error")]
    Internal,
}

impl NewsroomError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Validation {
            message: format!("{}: {}", field, message),
            details: vec![FieldError::new(field, message)],
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::Delivery {
            reason: reason.into(),
        }
    }
}
