//! Payment handoff payload.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Fields posted to the payment provider's standard checkout form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaymentFields {
    /// Business account receiving the payment
    pub business: String,
    #[schema(value_type = String, example = "25.00")]
    pub amount: Decimal,
    pub item_name: String,
    /// Our order number, echoed back by the provider
    pub invoice: String,
    pub currency_code: String,
    pub notify_url: String,
    #[serde(rename = "return")]
    pub return_url: String,
    pub cancel_return: String,
}

/// Self-submitting form the browser uses to reach the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaymentRequest {
    /// Form action URL
    pub action: String,
    pub fields: PaymentFields,
}
