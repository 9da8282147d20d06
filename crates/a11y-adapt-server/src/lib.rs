//! HTTP service and CLI shell around the a11y-adapt engine.

pub mod config;
pub mod error;
pub mod server;
pub mod types;

pub use error::{ServerError, ServerResult};
pub use server::{router, AppState, HttpServer};
