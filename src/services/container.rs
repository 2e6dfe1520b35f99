//! Service Container - Centralized service access.
//!
//! Holds every application service behind its trait so handlers and
//! commands depend on abstractions.

use std::future::Future;
use std::sync::Arc;

use super::{
    AccountManager, AccountService, CatalogBrowser, CatalogService, OrderPipeline, OrderService,
    PayPalStandard, SessionManager,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Persistence, SessionStore};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn accounts(&self) -> Arc<dyn AccountService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn sessions(&self) -> Arc<SessionManager>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    catalog_service: Arc<dyn CatalogService>,
    account_service: Arc<dyn AccountService>,
    order_service: Arc<dyn OrderService>,
    session_manager: Arc<SessionManager>,
}

impl Services {
    pub fn new(
        catalog_service: Arc<dyn CatalogService>,
        account_service: Arc<dyn AccountService>,
        order_service: Arc<dyn OrderService>,
        session_manager: Arc<SessionManager>,
    ) -> Self {
        Self {
            catalog_service,
            account_service,
            order_service,
            session_manager,
        }
    }

    /// Wire every service over one database connection and session store.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &Config,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let payments = Arc::new(PayPalStandard::new(config));

        Self {
            catalog_service: Arc::new(CatalogBrowser::new(uow.clone())),
            account_service: Arc::new(AccountManager::new(uow.clone())),
            order_service: Arc::new(OrderPipeline::new(uow, payments)),
            session_manager: Arc::new(SessionManager::new(session_store, config)),
        }
    }
}

impl ServiceContainer for Services {
    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn sessions(&self) -> Arc<SessionManager> {
        self.session_manager.clone()
    }
}

/// Helpers for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Run two independent operations concurrently, failing fast on the first error.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}
