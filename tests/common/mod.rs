//! In-memory persistence and an HTTP client that keeps the session cookie.
//!
//! Shared by the integration tests; no database or Redis is needed.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use storefront::api::{create_router, AppState};
use storefront::config::Config;
use storefront::domain::{
    Category, Customer, CustomerProfile, IdentityFields, NewOrderDetail, NewProduct, Order,
    OrderDetail, OrderStatus, Product, User,
};
use storefront::errors::{AppError, AppResult};
use storefront::infra::{
    CatalogRepository, CustomerRepository, MemorySessionStore, OrderRepository,
    TransactionContext, TxFuture, UnitOfWork, UserRepository,
};
use storefront::services::{
    AccountManager, CatalogBrowser, OrderPipeline, PayPalStandard, Services, SessionManager,
};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

pub fn test_config() -> Config {
    Config::builder(TEST_SECRET).unwrap()
}

#[derive(Clone, Default)]
struct Tables {
    users: Vec<User>,
    customers: Vec<Customer>,
    categories: Vec<Category>,
    products: Vec<Product>,
    orders: Vec<Order>,
    details: Vec<OrderDetail>,
}

/// Every table behind one lock
#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
    reject_customer_writes: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn orders(&self) -> Vec<Order> {
        self.tables.lock().unwrap().orders.clone()
    }

    pub fn details_of(&self, order_id: i32) -> Vec<OrderDetail> {
        self.tables
            .lock()
            .unwrap()
            .details
            .iter()
            .filter(|d| d.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Make every later customer upsert fail
    pub fn reject_customer_writes(&self) {
        self.reject_customer_writes.store(true, Ordering::SeqCst);
    }

    pub fn customer_count(&self) -> usize {
        self.tables.lock().unwrap().customers.len()
    }

    /// Insert a pending order directly, bypassing the pipeline
    pub fn insert_order(&self, customer_id: i32, total: Decimal) -> Order {
        let mut tables = self.tables.lock().unwrap();
        let order = Order {
            id: tables.orders.len() as i32 + 1,
            order_number: None,
            status: OrderStatus::Pending,
            total_amount: total,
            created_at: Utc::now(),
            customer_id,
        };
        tables.orders.push(order.clone());
        order
    }

    /// Create a product, creating its category on first use
    pub async fn product(&self, name: &str, price: Decimal, category: &str) -> Product {
        let category = match self.find_category_by_name(category).await.unwrap() {
            Some(existing) => existing,
            None => self.create_category(category.to_string()).await.unwrap(),
        };
        self.create_product(
            category.id,
            NewProduct {
                name: name.to_string(),
                description: String::new(),
                price,
                image: format!("products/{}.jpg", name.to_lowercase()),
                category: category.name.clone(),
            },
        )
        .await
        .unwrap()
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.username == username) {
            return Err(AppError::conflict("Username"));
        }
        let user = User {
            id: Uuid::new_v4(),
            username,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_identity(&self, id: Uuid, identity: IdentityFields) -> AppResult<User> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.first_name = identity.first_name;
        user.last_name = identity.last_name;
        user.email = identity.email;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl CustomerRepository for MemoryDb {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Customer>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .customers
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn upsert(&self, user_id: Uuid, profile: CustomerProfile) -> AppResult<Customer> {
        if self.reject_customer_writes.load(Ordering::SeqCst) {
            return Err(AppError::internal("customer table unavailable"));
        }
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables.customers.iter_mut().find(|c| c.user_id == user_id) {
            existing.profile = profile;
            return Ok(existing.clone());
        }
        let customer = Customer {
            id: tables.customers.len() as i32 + 1,
            user_id,
            profile,
        };
        tables.customers.push(customer.clone());
        Ok(customer)
    }
}

#[async_trait]
impl CatalogRepository for MemoryDb {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories = self.tables.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn create_category(&self, name: String) -> AppResult<Category> {
        let mut tables = self.tables.lock().unwrap();
        let category = Category {
            id: tables.categories.len() as i32 + 1,
            name,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_products(&self, name: Option<String>) -> AppResult<Vec<Product>> {
        let tables = self.tables.lock().unwrap();
        let needle = name.map(|n| n.to_lowercase());
        Ok(tables
            .products
            .iter()
            .filter(|p| {
                needle
                    .as_ref()
                    .map_or(true, |n| p.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect())
    }

    async fn list_products_in_category(&self, category_id: i32) -> AppResult<Vec<Product>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn find_product(&self, id: i32) -> AppResult<Option<Product>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, category_id: i32, product: NewProduct) -> AppResult<Product> {
        let mut tables = self.tables.lock().unwrap();
        let category = tables
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.name.clone())
            .ok_or(AppError::NotFound)?;
        let product = Product {
            id: tables.products.len() as i32 + 1,
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image,
            category_id,
            category,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.products.push(product.clone());
        Ok(product)
    }
}

#[async_trait]
impl OrderRepository for MemoryDb {
    async fn create(&self, customer_id: i32, total_amount: Decimal) -> AppResult<Order> {
        Ok(self.insert_order(customer_id, total_amount))
    }

    async fn add_detail(&self, detail: NewOrderDetail) -> AppResult<OrderDetail> {
        let mut tables = self.tables.lock().unwrap();
        let detail = OrderDetail {
            id: tables.details.len() as i32 + 1,
            quantity: detail.quantity,
            subtotal: detail.subtotal,
            order_id: detail.order_id,
            product_id: detail.product_id,
        };
        tables.details.push(detail.clone());
        Ok(detail)
    }

    async fn assign_number(&self, order_id: i32, order_number: String) -> AppResult<Order> {
        let mut tables = self.tables.lock().unwrap();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(AppError::NotFound)?;
        order.order_number = Some(order_number);
        Ok(order.clone())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Order>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn details(&self, order_id: i32) -> AppResult<Vec<OrderDetail>> {
        Ok(self.details_of(order_id))
    }

    async fn update_status(&self, order_id: i32, status: OrderStatus) -> AppResult<Order> {
        let mut tables = self.tables.lock().unwrap();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(AppError::NotFound)?;
        order.status = status;
        Ok(order.clone())
    }
}

/// Unit of Work over `MemoryDb`; a failed transaction restores the prior tables
pub struct InMemoryUnitOfWork {
    db: Arc<MemoryDb>,
}

impl InMemoryUnitOfWork {
    pub fn new(db: Arc<MemoryDb>) -> Arc<Self> {
        Arc::new(Self { db })
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.db.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerRepository> {
        self.db.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.db.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.db.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let snapshot = self.db.tables.lock().unwrap().clone();
        let db = self.db.as_ref();
        let result = f(TransactionContext::new(db, db, db)).await;
        if result.is_err() {
            *self.db.tables.lock().unwrap() = snapshot;
        }
        result
    }
}

/// Services wired over a fresh in-memory database
pub fn services(db: Arc<MemoryDb>) -> Services {
    let config = test_config();
    let uow = InMemoryUnitOfWork::new(db);
    Services::new(
        Arc::new(CatalogBrowser::new(uow.clone())),
        Arc::new(AccountManager::new(uow.clone())),
        Arc::new(OrderPipeline::new(
            uow,
            Arc::new(PayPalStandard::new(&config)),
        )),
        Arc::new(SessionManager::new(
            Arc::new(MemorySessionStore::new(config.session_ttl_seconds)),
            &config,
        )),
    )
}

/// Router over in-memory services, plus the database for assertions
pub fn test_app() -> (Router, Arc<MemoryDb>) {
    let db = MemoryDb::new();
    let state = AppState::from_container(&services(db.clone()), None);
    (create_router(state), db)
}

/// Issues requests against the router, carrying the session cookie like a browser
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// Router shared with a second client
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    /// Cookie header the client currently sends
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn use_cookie(&mut self, cookie: impl Into<String>) {
        self.cookie = Some(cookie.into());
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str) -> TestResponse {
        self.send(Method::POST, uri, None).await
    }

    pub async fn post_json(&mut self, uri: &str, body: Value) -> TestResponse {
        let payload = ("application/json", body.to_string());
        self.send(Method::POST, uri, Some(payload)).await
    }

    /// POST an `application/x-www-form-urlencoded` body
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let encoded = fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, value.replace(' ', "+")))
            .collect::<Vec<_>>()
            .join("&");
        let payload = ("application/x-www-form-urlencoded", encoded);
        self.send(Method::POST, uri, Some(payload)).await
    }

    async fn send(
        &mut self,
        method: Method,
        uri: &str,
        payload: Option<(&str, String)>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match payload {
            Some((content_type, body)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
