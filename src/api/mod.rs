//! HTTP API for the agenda service.

pub mod handlers;
mod rest;

pub use handlers::ApiState;
pub use rest::{create_rest_router, RestApiConfig};
