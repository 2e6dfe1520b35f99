//! OpenAPI documentation configuration.
//!
//! Served through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, cart_handler, catalog_handler, order_handler};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{
    AccountForm, CartLine, Category, CustomerProfile, Gender, IdentityFields, Order, OrderDetail,
    OrderStatus, PaymentFields, PaymentRequest, Product, UserResponse,
};
use crate::services::{CatalogPage, Checkout};
use crate::types::MessageResponse;

/// OpenAPI document for the storefront
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront",
        version = "0.1.0",
        description = "Catalog, session cart, accounts and checkout with a PayPal payment handoff"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Catalog
        catalog_handler::index,
        catalog_handler::products_by_category,
        catalog_handler::product_detail,
        // Cart
        cart_handler::view_cart,
        cart_handler::add_to_cart,
        cart_handler::remove_from_cart,
        cart_handler::clear_cart,
        // Accounts
        account_handler::login,
        account_handler::logout,
        account_handler::create_account,
        account_handler::get_account,
        account_handler::update_account,
        // Orders
        order_handler::register_order,
        order_handler::confirm_order,
        order_handler::payment_notification,
        order_handler::thanks,
    ),
    components(
        schemas(
            Category,
            Product,
            CatalogPage,
            CartLine,
            cart_handler::CartResponse,
            account_handler::CredentialsRequest,
            UserResponse,
            AccountForm,
            IdentityFields,
            CustomerProfile,
            Gender,
            Order,
            OrderStatus,
            OrderDetail,
            PaymentFields,
            PaymentRequest,
            Checkout,
            order_handler::PaymentNotification,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Catalog", description = "Browse categories and products"),
        (name = "Cart", description = "Session shopping cart"),
        (name = "Accounts", description = "Sign up, login and the customer profile"),
        (name = "Orders", description = "Checkout and payment return")
    )
)]
pub struct ApiDoc;

/// Session cookie security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Signed session token set by /users/login/ or /users/create/",
                ))),
            );
        }
    }
}
