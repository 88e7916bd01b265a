//! Core business logic - framework-agnostic ledger, capacity and order operations.
//!
//! Every operation takes a `DatabaseConnection` and returns [`crate::errors::Result`].

pub mod capacity;
pub mod item;
pub mod ledger;
pub mod location;
pub mod order;
pub mod user;
