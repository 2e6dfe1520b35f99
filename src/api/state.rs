//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, SessionStore};
use crate::services::{
    AccountService, CatalogService, OrderService, ServiceContainer, Services, SessionManager,
};

/// Services and infrastructure shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<dyn CatalogService>,
    pub account_service: Arc<dyn AccountService>,
    pub order_service: Arc<dyn OrderService>,
    pub sessions: Arc<SessionManager>,
    /// Database handle for health checks; absent when services run without one
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Wire services over the database connection and session store.
    pub fn from_config(
        database: Arc<Database>,
        session_store: Arc<dyn SessionStore>,
        config: &Config,
    ) -> Self {
        let container = Services::from_connection(database.get_connection(), config, session_store);
        Self::from_container(&container, Some(database))
    }

    /// Take services from an already built container.
    pub fn from_container(container: &dyn ServiceContainer, database: Option<Arc<Database>>) -> Self {
        Self {
            catalog_service: container.catalog(),
            account_service: container.accounts(),
            order_service: container.orders(),
            sessions: container.sessions(),
            database,
        }
    }
}
