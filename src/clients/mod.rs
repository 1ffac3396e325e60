//! Typed handles over the resource actors. Business rules that span more
//! than one record live here.

#[macro_use]
mod macros;

mod admin_client;
mod order_client;
mod product_client;
mod user_client;

pub use admin_client::*;
pub use order_client::*;
pub use product_client::*;
pub use user_client::*;
