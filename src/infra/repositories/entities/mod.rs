//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod category;
pub mod customer;
pub mod order;
pub mod order_detail;
pub mod product;
pub mod user;
