//! Payment gateway - Builds the provider handoff and reads its return.

use crate::config::{Config, PaymentSettings, PAYMENT_CANCEL_PATH, PAYMENT_NOTIFY_PATH, PAYMENT_RETURN_PATH};
use crate::domain::{Order, PaymentFields, PaymentRequest};
use crate::errors::{AppError, AppResult};

/// Redirect-based payment provider.
pub trait PaymentGateway: Send + Sync {
    /// Form that sends the browser to the provider to pay for `order`
    fn initiation(&self, order: &Order) -> AppResult<PaymentRequest>;

    /// Whether the provider's return carries the payer's confirmation
    fn is_confirmed(&self, payer_id: Option<&str>) -> bool {
        payer_id.is_some_and(|id| !id.trim().is_empty())
    }
}

/// PayPal Payments Standard (`_xclick` form posted to `webscr`)
pub struct PayPalStandard {
    settings: PaymentSettings,
    notify_url: String,
    return_url: String,
    cancel_url: String,
}

impl PayPalStandard {
    pub fn new(config: &Config) -> Self {
        Self {
            settings: config.payment.clone(),
            notify_url: config.site_link(PAYMENT_NOTIFY_PATH),
            return_url: config.site_link(PAYMENT_RETURN_PATH),
            cancel_url: config.site_link(PAYMENT_CANCEL_PATH),
        }
    }
}

impl PaymentGateway for PayPalStandard {
    fn initiation(&self, order: &Order) -> AppResult<PaymentRequest> {
        let invoice = order.order_number.clone().ok_or_else(|| {
            AppError::internal(format!("Order {} has no order number", order.id))
        })?;

        Ok(PaymentRequest {
            action: self.settings.action_url.clone(),
            fields: PaymentFields {
                business: self.settings.receiver_email.clone(),
                amount: order.total_amount,
                item_name: format!("Order {}", invoice),
                invoice,
                currency_code: self.settings.currency.clone(),
                notify_url: self.notify_url.clone(),
                return_url: self.return_url.clone(),
                cancel_return: self.cancel_url.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn gateway() -> PayPalStandard {
        let mut config = Config::builder("x".repeat(32)).unwrap();
        config.site_url = "https://shop.example.com".to_string();
        PayPalStandard::new(&config)
    }

    fn order(order_number: Option<&str>) -> Order {
        Order {
            id: 42,
            order_number: order_number.map(str::to_string),
            status: OrderStatus::Pending,
            total_amount: dec!(25.00),
            created_at: Utc::now(),
            customer_id: 1,
        }
    }

    #[test]
    fn test_initiation_payload() {
        let request = gateway()
            .initiation(&order(Some("PED-20241120-42")))
            .unwrap();

        assert_eq!(request.fields.invoice, "PED-20241120-42");
        assert_eq!(request.fields.item_name, "Order PED-20241120-42");
        assert_eq!(request.fields.amount, dec!(25.00));
        assert_eq!(request.fields.currency_code, "USD");
        assert_eq!(request.fields.notify_url, "https://shop.example.com/paypal/");
        assert_eq!(
            request.fields.return_url,
            "https://shop.example.com/order/confirm/"
        );
        assert_eq!(request.fields.cancel_return, "https://shop.example.com/");

        let json = serde_json::to_value(&request.fields).unwrap();
        assert_eq!(json["amount"], "25.00");
        assert_eq!(json["return"], "https://shop.example.com/order/confirm/");
    }

    #[test]
    fn test_initiation_requires_order_number() {
        assert!(gateway().initiation(&order(None)).is_err());
    }

    #[test]
    fn test_confirmation_needs_non_empty_payer_id() {
        let gateway = gateway();
        assert!(gateway.is_confirmed(Some("PAYER123")));
        assert!(!gateway.is_confirmed(Some("")));
        assert!(!gateway.is_confirmed(None));
    }
}
