//! User directory: user records and their errors.

pub mod entity;
pub mod error;

pub use error::*;
