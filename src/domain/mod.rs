//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod password;
pub mod payment;
pub mod session;
pub mod user;

pub use account::{AccountForm, AccountView, IdentityFields};
pub use cart::{Cart, CartLine};
pub use catalog::{Category, NewCategory, NewProduct, Product};
pub use customer::{Customer, CustomerProfile, Gender};
pub use order::{order_number, NewOrderDetail, Order, OrderDetail, OrderStatus};
pub use password::Password;
pub use payment::{PaymentFields, PaymentRequest};
pub use session::{Session, SessionData};
pub use user::{User, UserResponse};
