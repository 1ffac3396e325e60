//! Storefront records and the value types they are built from.

pub mod cart;
pub mod email;
pub mod order;
pub mod product;
pub mod user;

pub use cart::*;
pub use email::*;
pub use order::*;
pub use product::*;
pub use user::*;
