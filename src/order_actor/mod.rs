//! Order ledger: order records, status actions and errors.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
