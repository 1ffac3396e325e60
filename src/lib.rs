//! Storefront core: catalog, order ledger, user directory and the admin
//! allow-list, each collection owned by its own actor.

pub mod access;
pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod images;
pub mod order_actor;
pub mod product_actor;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
