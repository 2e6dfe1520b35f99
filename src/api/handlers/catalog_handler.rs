//! Catalog handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::AppState;
use crate::domain::Product;
use crate::errors::AppResult;
use crate::services::CatalogPage;

/// Catalog index filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the product name
    pub name: Option<String>,
}

/// Create catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/products/category/:category_id", get(products_by_category))
        .route("/products/:product_id", get(product_detail))
}

/// List products, optionally filtered by name
#[utoipa::path(
    get,
    path = "/",
    tag = "Catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Products and category navigation", body = CatalogPage)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<CatalogPage>> {
    let page = state.catalog_service.index(query.name).await?;
    Ok(Json(page))
}

/// List products of one category
#[utoipa::path(
    get,
    path = "/products/category/{category_id}",
    tag = "Catalog",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Products of the category", body = CatalogPage),
        (status = 404, description = "Category not found")
    )
)]
pub async fn products_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> AppResult<Json<CatalogPage>> {
    let page = state.catalog_service.by_category(category_id).await?;
    Ok(Json(page))
}

/// Get product details
#[utoipa::path(
    get,
    path = "/products/{product_id}",
    tag = "Catalog",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn product_detail(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> AppResult<Json<Product>> {
    let product = state.catalog_service.product(product_id).await?;
    Ok(Json(product))
}
