//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the transcript endpoints
//! - Request handlers and JSON response shapes
//! - Error responses carrying fallback languages
//! - CORS middleware

pub mod handlers;
pub mod routes;

pub use routes::create_router;
