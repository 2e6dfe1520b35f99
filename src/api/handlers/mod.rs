//! HTTP request handlers.

pub mod account_handler;
pub mod cart_handler;
pub mod catalog_handler;
pub mod order_handler;

pub use account_handler::{account_routes, profile_routes};
pub use cart_handler::cart_routes;
pub use catalog_handler::catalog_routes;
pub use order_handler::{checkout_routes, order_routes};
