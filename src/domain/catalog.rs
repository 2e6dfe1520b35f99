//! Catalog entities: categories and the products filed under them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[schema(example = 1)]
    pub id: i32,
    /// Unique category name
    #[schema(example = "Coffee")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Product as listed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Espresso beans 1kg")]
    pub name: String,
    pub description: String,
    /// Unit price, never negative
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
    /// Image reference relative to the media root; empty when the product has none
    #[schema(example = "products/espresso.jpg")]
    pub image: String,
    pub category_id: i32,
    /// Display label of the owning category
    #[schema(example = "Coffee")]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New category as supplied by the catalog seed file
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

/// New product as supplied by the catalog seed file
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    /// Name of the category the product belongs to
    pub category: String,
}

impl NewProduct {
    /// Prices are stored with two decimal places and may not be negative.
    pub fn validated_price(&self) -> Option<Decimal> {
        if self.price.is_sign_negative() {
            None
        } else {
            Some(self.price.round_dp(2))
        }
    }
}
