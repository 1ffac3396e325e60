use thiserror::Error;

use crate::access::AccessError;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    AccessDenied(#[from] AccessError),
    #[error("User store unavailable: {0}")]
    Unavailable(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(UserError);
