//! Catalog store: product records, their validation rules and errors.

pub mod entity;
pub mod error;

pub use error::*;
