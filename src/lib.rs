//! Storefront - catalog, session cart, accounts and checkout
//!
//! A JSON storefront backend built on Axum and SeaORM. Shoppers browse
//! the catalog, collect products in a session-backed cart and check out
//! through a PayPal standard payment handoff.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Catalog, cart, session, account and order types
//! - **services**: Use cases (catalog, accounts, order pipeline, payments, sessions)
//! - **infra**: Database, repositories, migrations and session stores
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Load catalog content
//! cargo run -- seed catalog.json
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Cart, Order, Password, Session, User};
pub use errors::{AppError, AppResult};
