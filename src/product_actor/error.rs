use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Product store unavailable: {0}")]
    Unavailable(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(ProductError);
