//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod catalog_repository;
pub(crate) mod customer_repository;
pub(crate) mod entities;
pub(crate) mod order_repository;
pub(crate) mod user_repository;

pub use catalog_repository::{CatalogRepository, CatalogStore};
pub use customer_repository::{CustomerRepository, CustomerStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_repository::MockCatalogRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use customer_repository::MockCustomerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
