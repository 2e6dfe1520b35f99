//! Infrastructure layer - External systems integration
//!
//! - Database connections, migrations and repositories
//! - Session storage (Redis or in-process)
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod session_store;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    CatalogRepository, CatalogStore, CustomerRepository, CustomerStore, OrderRepository,
    OrderStore, UserRepository, UserStore,
};
pub use session_store::{MemorySessionStore, RedisSessionStore, SessionStore};
pub use unit_of_work::{
    Persistence, TransactionContext, TxCustomerRepository, TxFuture, TxOrderRepository,
    TxUserRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockCatalogRepository, MockCustomerRepository, MockOrderRepository, MockUserRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use session_store::MockSessionStore;
