//! Unit of Work over mock repositories for service tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::infra::{
    CatalogRepository, CustomerRepository, MockCatalogRepository, MockCustomerRepository,
    MockOrderRepository, MockUserRepository, OrderRepository, TransactionContext, TxFuture,
    UnitOfWork, UserRepository,
};

/// Repositories without expectations panic when called.
pub(crate) struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    customers: Arc<MockCustomerRepository>,
    catalog: Arc<MockCatalogRepository>,
    orders: Arc<MockOrderRepository>,
}

impl TestUnitOfWork {
    pub(crate) fn new() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            customers: Arc::new(MockCustomerRepository::new()),
            catalog: Arc::new(MockCatalogRepository::new()),
            orders: Arc::new(MockOrderRepository::new()),
        }
    }

    pub(crate) fn with_users(mut self, repo: MockUserRepository) -> Self {
        self.users = Arc::new(repo);
        self
    }

    pub(crate) fn with_customers(mut self, repo: MockCustomerRepository) -> Self {
        self.customers = Arc::new(repo);
        self
    }

    pub(crate) fn with_catalog(mut self, repo: MockCatalogRepository) -> Self {
        self.catalog = Arc::new(repo);
        self
    }

    pub(crate) fn with_orders(mut self, repo: MockOrderRepository) -> Self {
        self.orders = Arc::new(repo);
        self
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.customers.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        f(TransactionContext::new(
            self.users.as_ref(),
            self.customers.as_ref(),
            self.orders.as_ref(),
        ))
        .await
    }
}
