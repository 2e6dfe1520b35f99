//! Order repository.
//!
//! Queries are written once against `ConnectionTrait` and shared by the
//! pooled store and the transaction-bound repository.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_detail::{self, Entity as OrderDetailEntity};
use crate::domain::{NewOrderDetail, Order, OrderDetail, OrderStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a pending order with no order number yet
    async fn create(&self, customer_id: i32, total_amount: Decimal) -> AppResult<Order>;

    async fn add_detail(&self, detail: NewOrderDetail) -> AppResult<OrderDetail>;

    /// Write the order number onto an existing order
    async fn assign_number(&self, order_id: i32, order_number: String) -> AppResult<Order>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Order>>;

    /// Detail lines of an order in insertion order
    async fn details(&self, order_id: i32) -> AppResult<Vec<OrderDetail>>;

    async fn update_status(&self, order_id: i32, status: OrderStatus) -> AppResult<Order>;
}

pub(crate) async fn create_order<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
    total_amount: Decimal,
) -> AppResult<Order> {
    let model = order::ActiveModel {
        order_number: Set(None),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        total_amount: Set(total_amount),
        created_at: Set(chrono::Utc::now()),
        customer_id: Set(customer_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(AppError::from)?;

    Order::try_from(model)
}

pub(crate) async fn add_order_detail<C: ConnectionTrait>(
    db: &C,
    detail: NewOrderDetail,
) -> AppResult<OrderDetail> {
    let model = order_detail::ActiveModel {
        quantity: Set(detail.quantity),
        subtotal: Set(detail.subtotal),
        order_id: Set(detail.order_id),
        product_id: Set(detail.product_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(AppError::from)?;

    Ok(OrderDetail::from(model))
}

async fn find_model<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<order::Model> {
    OrderEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) async fn assign_order_number<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    order_number: String,
) -> AppResult<Order> {
    let mut active: order::ActiveModel = find_model(db, order_id).await?.into();
    active.order_number = Set(Some(order_number));

    let model = active.update(db).await.map_err(AppError::from)?;
    Order::try_from(model)
}

pub(crate) async fn find_order<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<Order>> {
    OrderEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(AppError::from)?
        .map(Order::try_from)
        .transpose()
}

pub(crate) async fn list_details<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
) -> AppResult<Vec<OrderDetail>> {
    let models = OrderDetailEntity::find()
        .filter(order_detail::Column::OrderId.eq(order_id))
        .order_by_asc(order_detail::Column::Id)
        .all(db)
        .await
        .map_err(AppError::from)?;

    Ok(models.into_iter().map(OrderDetail::from).collect())
}

pub(crate) async fn set_order_status<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    status: OrderStatus,
) -> AppResult<Order> {
    let mut active: order::ActiveModel = find_model(db, order_id).await?.into();
    active.status = Set(status.as_str().to_string());

    let model = active.update(db).await.map_err(AppError::from)?;
    Order::try_from(model)
}

/// Pooled implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn create(&self, customer_id: i32, total_amount: Decimal) -> AppResult<Order> {
        create_order(&self.db, customer_id, total_amount).await
    }

    async fn add_detail(&self, detail: NewOrderDetail) -> AppResult<OrderDetail> {
        add_order_detail(&self.db, detail).await
    }

    async fn assign_number(&self, order_id: i32, order_number: String) -> AppResult<Order> {
        assign_order_number(&self.db, order_id, order_number).await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Order>> {
        find_order(&self.db, id).await
    }

    async fn details(&self, order_id: i32) -> AppResult<Vec<OrderDetail>> {
        list_details(&self.db, order_id).await
    }

    async fn update_status(&self, order_id: i32, status: OrderStatus) -> AppResult<Order> {
        set_order_status(&self.db, order_id, status).await
    }
}
