//! Backend HTTP access.

pub mod client;
pub mod envelope;

pub use client::{ADMIN_USER_HEADER, ApiClient, ApiRequest, RequestBody};
pub use envelope::{Envelope, Page, PageInfo};
