//! Session-backed shopping cart.
//!
//! Lines snapshot the product's display fields when first added. Monetary
//! values travel through the session as decimal strings.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::Product;
use super::session::Session;

/// One product's accumulated quantity within a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: i32,
    pub name: String,
    /// Unit price when the line was created
    #[schema(value_type = String, example = "10.00")]
    pub price: Decimal,
    pub image: String,
    pub quantity: i32,
    pub category: String,
    #[schema(value_type = String, example = "20.00")]
    pub subtotal: Decimal,
}

/// Cart view over a session
#[derive(Debug)]
pub struct Cart<'s> {
    session: &'s mut Session,
}

impl<'s> Cart<'s> {
    /// Open the cart stored in `session`, creating an empty one if there is none.
    pub fn new(session: &'s mut Session) -> Self {
        let data = session.data_mut();
        let missing = data.cart.as_ref().map_or(true, BTreeMap::is_empty);
        if missing {
            let created = data.cart.is_none();
            data.cart = Some(BTreeMap::new());
            data.cart_total_amount = Some(Decimal::ZERO);
            if created {
                session.mark_modified();
            }
        }
        Self { session }
    }

    /// Lines in product id order
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.session.data().cart.iter().flat_map(|lines| lines.values())
    }

    pub fn line(&self, product_id: i32) -> Option<&CartLine> {
        self.session
            .data()
            .cart
            .as_ref()
            .and_then(|lines| lines.get(&product_id.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.lines().next().is_none()
    }

    /// Total as last saved
    pub fn total(&self) -> Decimal {
        self.session
            .data()
            .cart_total_amount
            .unwrap_or(Decimal::ZERO)
    }

    /// Add `quantity` units of `product`.
    ///
    /// A new line snapshots the product's name, price, image and category.
    /// An existing line grows by `quantity` and its subtotal is recomputed from
    /// the product's current price; the stored price snapshot is left as is.
    pub fn add(&mut self, product: &Product, quantity: i32) {
        let lines = self.lines_mut();
        let key = product.id.to_string();
        match lines.get_mut(&key) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.subtotal = product.price * Decimal::from(line.quantity);
            }
            None => {
                lines.insert(
                    key,
                    CartLine {
                        product_id: product.id,
                        name: product.name.clone(),
                        price: product.price,
                        image: product.image.clone(),
                        quantity,
                        category: product.category.clone(),
                        subtotal: product.price * Decimal::from(quantity),
                    },
                );
            }
        }
        self.save();
    }

    /// Remove the product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: i32) -> bool {
        let removed = self.lines_mut().remove(&product_id.to_string()).is_some();
        if removed {
            self.save();
        }
        removed
    }

    /// Reset to no lines and a zero total.
    pub fn clear(&mut self) {
        let data = self.session.data_mut();
        data.cart = Some(BTreeMap::new());
        data.cart_total_amount = Some(Decimal::ZERO);
        self.session.mark_modified();
    }

    /// Recompute the total from the line subtotals and persist both.
    pub fn save(&mut self) {
        let total: Decimal = self.lines().map(|line| line.subtotal).sum();
        self.session.data_mut().cart_total_amount = Some(total);
        self.session.mark_modified();
    }

    fn lines_mut(&mut self) -> &mut BTreeMap<String, CartLine> {
        self.session
            .data_mut()
            .cart
            .get_or_insert_with(BTreeMap::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionData;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn product(id: i32, price: Decimal) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            description: String::new(),
            price,
            image: format!("products/{}.jpg", id),
            category_id: 1,
            category: "Coffee".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_cart_is_created_lazily() {
        let mut session = Session::fresh();
        let cart = Cart::new(&mut session);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert!(session.is_modified());
        assert_eq!(session.data().cart_total_amount, Some(Decimal::ZERO));
    }

    #[test]
    fn test_add_snapshots_product() {
        let mut session = Session::fresh();
        let mut cart = Cart::new(&mut session);
        cart.add(&product(1, dec!(10.00)), 2);

        let line = cart.line(1).unwrap();
        assert_eq!(line.name, "Product 1");
        assert_eq!(line.category, "Coffee");
        assert_eq!(line.image, "products/1.jpg");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.subtotal, dec!(20.00));
        assert_eq!(cart.total(), dec!(20.00));
    }

    #[test]
    fn test_repeated_add_accumulates_at_current_price() {
        let mut session = Session::fresh();
        let mut cart = Cart::new(&mut session);
        cart.add(&product(1, dec!(10.00)), 2);
        cart.add(&product(1, dec!(12.50)), 3);

        let line = cart.line(1).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.subtotal, dec!(62.50));
        // the unit price snapshot is not refreshed
        assert_eq!(line.price, dec!(10.00));
        assert_eq!(cart.total(), dec!(62.50));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut session = Session::fresh();
        let mut cart = Cart::new(&mut session);
        cart.add(&product(1, dec!(3.00)), 1);
        cart.add(&product(2, dec!(4.00)), 1);

        assert!(cart.remove(1));
        assert!(!cart.remove(1));
        assert_eq!(cart.total(), dec!(4.00));
    }

    #[test]
    fn test_remove_missing_line_does_not_save() {
        let mut session = Session::restore(
            "s",
            SessionData {
                cart: Some(BTreeMap::new()),
                cart_total_amount: Some(Decimal::ZERO),
                ..SessionData::default()
            },
        );
        let mut cart = Cart::new(&mut session);
        assert!(!cart.remove(9));
        assert!(!session.is_modified());
    }

    #[test]
    fn test_clear_resets_lines_and_total() {
        let mut session = Session::fresh();
        let mut cart = Cart::new(&mut session);
        cart.add(&product(1, dec!(10.00)), 2);
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        let json = serde_json::to_value(session.data()).unwrap();
        assert_eq!(json["cart_total_amount"], "0");
        assert_eq!(json["cart"], serde_json::json!({}));
    }

    #[test]
    fn test_total_matches_sum_of_subtotals() {
        let mut session = Session::fresh();
        let mut cart = Cart::new(&mut session);
        cart.add(&product(1, dec!(0.10)), 3);
        cart.add(&product(2, dec!(0.20)), 1);
        cart.add(&product(3, dec!(19.99)), 2);
        cart.remove(2);
        cart.add(&product(1, dec!(0.10)), 1);

        let sum: Decimal = cart.lines().map(|l| l.subtotal).sum();
        assert_eq!(cart.total(), sum);
        assert_eq!(cart.total(), dec!(40.38));
    }

    #[test]
    fn test_money_is_stored_as_strings() {
        let mut session = Session::fresh();
        Cart::new(&mut session).add(&product(5, dec!(5.00)), 1);
        let json = serde_json::to_value(session.data()).unwrap();
        assert_eq!(json["cart"]["5"]["price"], "5.00");
        assert_eq!(json["cart"]["5"]["subtotal"], "5.00");
        assert_eq!(json["cart_total_amount"], "5.00");
    }
}
