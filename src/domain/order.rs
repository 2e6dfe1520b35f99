//! Order aggregate: orders, their detail lines and the order-number scheme.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{ORDER_NUMBER_DATE_FORMAT, ORDER_NUMBER_PREFIX};
use crate::errors::{AppError, AppResult};

/// Order lifecycle states.
///
/// `Pending` is the only initial state; the other three are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
    Canceled,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether an order in this state may move to `next`.
    ///
    /// Re-applying the current state is accepted so a repeated payment
    /// return for an already delivered order is harmless.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        *self == next || (*self == OrderStatus::Pending && next.is_terminal())
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Canceled" => Ok(OrderStatus::Canceled),
            "Rejected" => Ok(OrderStatus::Rejected),
            other => Err(AppError::internal(format!("Unknown order status '{}'", other))),
        }
    }
}

/// Human-readable order number: `PED-YYYYMMDD-<id>`.
pub fn order_number(created_at: DateTime<Utc>, id: i32) -> String {
    format!(
        "{}-{}-{}",
        ORDER_NUMBER_PREFIX,
        created_at.format(ORDER_NUMBER_DATE_FORMAT),
        id
    )
}

/// Order placed by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    #[schema(example = 42)]
    pub id: i32,
    /// Assigned after the order row and its details exist
    #[schema(example = "PED-20241120-42")]
    pub order_number: Option<String>,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "25.00")]
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub customer_id: i32,
}

impl Order {
    /// The number this order should carry, derived from its own id and creation date.
    pub fn derived_number(&self) -> String {
        order_number(self.created_at, self.id)
    }

    /// Check that the order may move to `next`.
    pub fn ensure_transition(&self, next: OrderStatus) -> AppResult<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Order {} is {} and cannot become {}",
                self.id, self.status, next
            )))
        }
    }
}

/// One purchased product line of an order; immutable once written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub id: i32,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(value_type = String, example = "20.00")]
    pub subtotal: Decimal,
    pub order_id: i32,
    pub product_id: i32,
}

/// Detail line to be written for a new order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderDetail {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub subtotal: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: 42,
            order_number: None,
            status,
            total_amount: dec!(25.00),
            created_at: Utc.with_ymd_and_hms(2024, 11, 20, 5, 2, 0).unwrap(),
            customer_id: 1,
        }
    }

    #[test]
    fn test_order_number_format() {
        let created = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 59).unwrap();
        assert_eq!(order_number(created, 9), "PED-20240307-9");
    }

    #[test]
    fn test_derived_number_uses_own_id_and_date() {
        assert_eq!(order(OrderStatus::Pending).derived_number(), "PED-20241120-42");
    }

    #[test]
    fn test_pending_reaches_every_terminal_state() {
        for next in [
            OrderStatus::Delivered,
            OrderStatus::Canceled,
            OrderStatus::Rejected,
        ] {
            assert!(OrderStatus::Pending.can_transition_to(next));
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert!(!OrderStatus::Canceled.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Delivered));
        assert!(order(OrderStatus::Rejected)
            .ensure_transition(OrderStatus::Delivered)
            .is_err());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Delivered,
            OrderStatus::Canceled,
            OrderStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }
}
