//! API layer - HTTP handlers and middleware
//!
//! - Request handlers grouped by area (catalog, cart, accounts, orders)
//! - Session and login-required middleware
//! - Validating extractors
//! - Route definitions and the OpenAPI document

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
