//! Order service - Turns the session cart into an order and settles the
//! payment return.
//!
//! Order creation, its detail lines and the order-number backfill run in one
//! transaction, in that order.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::payment_service::PaymentGateway;
use crate::domain::{
    Cart, CartLine, NewOrderDetail, Order, OrderDetail, OrderStatus, PaymentRequest, Session,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// Result of registering an order
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Checkout {
    pub order: Order,
    pub details: Vec<OrderDetail>,
    /// Form the browser submits to reach the payment provider
    pub payment: PaymentRequest,
}

/// Outcome of the browser's return from the payment provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReturn {
    /// The stashed order was marked delivered
    Confirmed(Order),
    /// No payer confirmation; nothing changed
    NotConfirmed,
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Snapshot the cart into a pending order, stash its id in the session,
    /// clear the cart and build the payment handoff.
    async fn register_order(&self, session: &mut Session, user_id: Uuid) -> AppResult<Checkout>;

    /// Mark the stashed order delivered when the payer confirmed.
    async fn confirm_payment(
        &self,
        session: &Session,
        payer_id: Option<String>,
    ) -> AppResult<PaymentReturn>;
}

pub struct OrderPipeline<U: UnitOfWork> {
    uow: Arc<U>,
    payments: Arc<dyn PaymentGateway>,
}

impl<U: UnitOfWork> OrderPipeline<U> {
    pub fn new(uow: Arc<U>, payments: Arc<dyn PaymentGateway>) -> Self {
        Self { uow, payments }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderPipeline<U> {
    async fn register_order(&self, session: &mut Session, user_id: Uuid) -> AppResult<Checkout> {
        let (lines, total) = {
            let cart = Cart::new(session);
            (cart.lines().cloned().collect::<Vec<CartLine>>(), cart.total())
        };

        let customer = self
            .uow
            .customers()
            .find_by_user(user_id)
            .await?
            .ok_or_not_found()?;
        let customer_id = customer.id;
        let catalog = self.uow.catalog();

        let (order, details) = with_transaction!(self.uow, |ctx| {
            let orders = ctx.orders();
            let order = orders.create(customer_id, total).await?;

            let mut details = Vec::with_capacity(lines.len());
            for line in &lines {
                let product = catalog
                    .find_product(line.product_id)
                    .await?
                    .ok_or_not_found()?;
                let detail = orders
                    .add_detail(NewOrderDetail {
                        order_id: order.id,
                        product_id: product.id,
                        quantity: line.quantity,
                        subtotal: line.subtotal,
                    })
                    .await?;
                details.push(detail);
            }

            let order = orders
                .assign_number(order.id, order.derived_number())
                .await?;
            Ok((order, details))
        })?;

        session.stash_order(order.id);
        let payment = self.payments.initiation(&order)?;
        Cart::new(session).clear();

        tracing::info!(
            order_id = order.id,
            order_number = order.order_number.as_deref().unwrap_or_default(),
            total = %order.total_amount,
            details = details.len(),
            %user_id,
            "Order registered"
        );

        Ok(Checkout {
            order,
            details,
            payment,
        })
    }

    async fn confirm_payment(
        &self,
        session: &Session,
        payer_id: Option<String>,
    ) -> AppResult<PaymentReturn> {
        if !self.payments.is_confirmed(payer_id.as_deref()) {
            tracing::warn!(
                order_id = ?session.stashed_order(),
                "Payment return without payer confirmation"
            );
            return Ok(PaymentReturn::NotConfirmed);
        }

        let order_id = session.stashed_order().ok_or(AppError::NotFound)?;
        let orders = self.uow.orders();
        let order = orders.find_by_id(order_id).await?.ok_or_not_found()?;
        order.ensure_transition(OrderStatus::Delivered)?;

        let order = orders
            .update_status(order.id, OrderStatus::Delivered)
            .await?;
        tracing::info!(order_id = order.id, "Payment confirmed, order delivered");

        Ok(PaymentReturn::Confirmed(order))
    }
}
