//! Utility functions and helpers.

pub mod http;

pub use http::{ApiClient, auth_header, create_async_client};
