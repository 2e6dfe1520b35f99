//! Cart handlers. The cart lives in the session, so every handler works on
//! the request's `SessionHandle`.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedQuery;
use crate::api::middleware::SessionHandle;
use crate::api::AppState;
use crate::domain::{Cart, CartLine};
use crate::errors::AppResult;

fn default_quantity() -> i32 {
    1
}

/// Add-to-cart options
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct AddToCartQuery {
    /// Units to add (defaults to 1)
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 32767, message = "Quantity must be between 1 and 32767"))]
    pub quantity: i32,
}

/// Cart contents
#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    #[schema(value_type = String, example = "25.00")]
    pub total: Decimal,
}

impl From<&Cart<'_>> for CartResponse {
    fn from(cart: &Cart<'_>) -> Self {
        Self {
            lines: cart.lines().cloned().collect(),
            total: cart.total(),
        }
    }
}

/// Create cart routes
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/", get(view_cart))
        .route("/cart/add/:product_id", post(add_to_cart))
        .route("/cart/remove/:product_id", post(remove_from_cart))
        .route("/cart/clear/", post(clear_cart))
}

/// Show the current cart
#[utoipa::path(
    get,
    path = "/cart/",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart lines and total", body = CartResponse)
    )
)]
pub async fn view_cart(Extension(session): Extension<SessionHandle>) -> Json<CartResponse> {
    let mut session = session.lock().await;
    let cart = Cart::new(&mut session);
    Json(CartResponse::from(&cart))
}

/// Add a product to the cart
#[utoipa::path(
    post,
    path = "/cart/add/{product_id}",
    tag = "Cart",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        AddToCartQuery
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(product_id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<AddToCartQuery>,
) -> AppResult<Json<CartResponse>> {
    let product = state.catalog_service.product(product_id).await?;

    let mut session = session.lock().await;
    let mut cart = Cart::new(&mut session);
    cart.add(&product, query.quantity);

    Ok(Json(CartResponse::from(&cart)))
}

/// Remove a product's line from the cart
#[utoipa::path(
    post,
    path = "/cart/remove/{product_id}",
    tag = "Cart",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse)
    )
)]
pub async fn remove_from_cart(
    Extension(session): Extension<SessionHandle>,
    Path(product_id): Path<i32>,
) -> Json<CartResponse> {
    let mut session = session.lock().await;
    let mut cart = Cart::new(&mut session);
    cart.remove(product_id);
    Json(CartResponse::from(&cart))
}

/// Empty the cart
#[utoipa::path(
    post,
    path = "/cart/clear/",
    tag = "Cart",
    responses(
        (status = 200, description = "Empty cart", body = CartResponse)
    )
)]
pub async fn clear_cart(Extension(session): Extension<SessionHandle>) -> Json<CartResponse> {
    let mut session = session.lock().await;
    let mut cart = Cart::new(&mut session);
    cart.clear();
    Json(CartResponse::from(&cart))
}
