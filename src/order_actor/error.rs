use thiserror::Error;

use crate::access::AccessError;
use crate::domain::InvalidTransition;
use crate::product_actor::ProductError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Order total mismatch: submitted {submitted}, computed {computed}")]
    TotalMismatch { submitted: u64, computed: u64 },
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error(transparent)]
    AccessDenied(#[from] AccessError),
    #[error("Catalog lookup failed: {0}")]
    Catalog(#[source] ProductError),
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(OrderError);
