//! Data layer for the food-delivery admin dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views (the CLI, and the pages served behind the `server` crate) never talk
//! to the backend directly. They call a resource operation in [`resources`],
//! which reads through the shared [`cache::QueryCache`] and falls back to the
//! [`api::ApiClient`] on a miss. Writes go straight to the client and then
//! invalidate the cache keys they affect.
//!
//! The routing guard in [`guard`] only needs cookie state and is shared with
//! the server's middleware.

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod models;
pub mod notify;
pub mod resources;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, ApiRequest};
pub use cache::{QueryCache, QueryKey, QueryResult};
pub use context::DataContext;
pub use error::{ApiError, ErrorKind};
