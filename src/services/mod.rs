//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and reach repositories through the Unit of Work.

mod account_service;
mod catalog_service;
pub mod container;
mod order_service;
mod payment_service;
mod session_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService};
pub use catalog_service::{CatalogBrowser, CatalogPage, CatalogSeed, CatalogService, SeedReport};
pub use order_service::{Checkout, OrderPipeline, OrderService, PaymentReturn};
pub use payment_service::{PayPalStandard, PaymentGateway};
pub use session_service::{SessionClaims, SessionManager};
