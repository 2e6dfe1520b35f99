//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-step writes inside one
//! database transaction (begin, commit, rollback).

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::customer_repository::{find_customer_by_user, upsert_customer};
use super::repositories::order_repository::{
    add_order_detail, assign_order_number, create_order, find_order, list_details,
    set_order_status,
};
use super::repositories::{
    CatalogRepository, CatalogStore, CustomerRepository, CustomerStore, OrderRepository,
    OrderStore, UserRepository, UserStore,
};
use super::repositories::user_repository::{
    find_user, find_user_by_username, insert_user, update_user_identity,
};
use crate::domain::{
    Customer, CustomerProfile, IdentityFields, NewOrderDetail, Order, OrderDetail, OrderStatus,
    User,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction method; tests
/// provide their own implementation over in-memory repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn customers(&self) -> Arc<dyn CustomerRepository>;

    fn catalog(&self) -> Arc<dyn CatalogRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access within a transaction.
///
/// Every write made through the context belongs to the same transaction.
pub struct TransactionContext<'a> {
    users: &'a (dyn UserRepository + 'a),
    customers: &'a (dyn CustomerRepository + 'a),
    orders: &'a (dyn OrderRepository + 'a),
}

impl<'a> TransactionContext<'a> {
    pub fn new(
        users: &'a (dyn UserRepository + 'a),
        customers: &'a (dyn CustomerRepository + 'a),
        orders: &'a (dyn OrderRepository + 'a),
    ) -> Self {
        Self {
            users,
            customers,
            orders,
        }
    }

    pub fn users(&self) -> &'a (dyn UserRepository + 'a) {
        self.users
    }

    pub fn customers(&self) -> &'a (dyn CustomerRepository + 'a) {
        self.customers
    }

    /// Order repository bound to this transaction
    pub fn orders(&self) -> &'a (dyn OrderRepository + 'a) {
        self.orders
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    customer_repo: Arc<CustomerStore>,
    catalog_repo: Arc<CatalogStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            customer_repo: Arc::new(CustomerStore::new(db.clone())),
            catalog_repo: Arc::new(CatalogStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.customer_repo.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let users = TxUserRepository::new(&txn);
        let customers = TxCustomerRepository::new(&txn);
        let orders = TxOrderRepository::new(&txn);
        let result = f(TransactionContext::new(&users, &customers, &orders)).await;

        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserRepository for TxUserRepository<'_> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_user(self.txn, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_user_by_username(self.txn, username).await
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<User> {
        insert_user(self.txn, username, password_hash).await
    }

    async fn update_identity(&self, id: Uuid, identity: IdentityFields) -> AppResult<User> {
        update_user_identity(self.txn, id, identity).await
    }
}

pub struct TxCustomerRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCustomerRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl CustomerRepository for TxCustomerRepository<'_> {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Customer>> {
        find_customer_by_user(self.txn, user_id).await
    }

    async fn upsert(&self, user_id: Uuid, profile: CustomerProfile) -> AppResult<Customer> {
        upsert_customer(self.txn, user_id, profile).await
    }
}

/// Order repository executing every statement inside a borrowed transaction.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl OrderRepository for TxOrderRepository<'_> {
    async fn create(&self, customer_id: i32, total_amount: Decimal) -> AppResult<Order> {
        create_order(self.txn, customer_id, total_amount).await
    }

    async fn add_detail(&self, detail: NewOrderDetail) -> AppResult<OrderDetail> {
        add_order_detail(self.txn, detail).await
    }

    async fn assign_number(&self, order_id: i32, order_number: String) -> AppResult<Order> {
        assign_order_number(self.txn, order_id, order_number).await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Order>> {
        find_order(self.txn, id).await
    }

    async fn details(&self, order_id: i32) -> AppResult<Vec<OrderDetail>> {
        list_details(self.txn, order_id).await
    }

    async fn update_status(&self, order_id: i32, status: OrderStatus) -> AppResult<Order> {
        set_order_status(self.txn, order_id, status).await
    }
}

/// Run a block inside `$uow.transaction`, boxing the future.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
