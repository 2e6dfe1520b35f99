//! Category and product repository.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::category::{self, Entity as CategoryEntity};
use super::entities::product::{self, into_product, Entity as ProductEntity};
use crate::domain::{Category, NewProduct, Product};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to the catalog, plus the writes used by catalog seeding.
///
/// Categories are listed by name, products by id.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>>;

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>>;

    async fn create_category(&self, name: String) -> AppResult<Category>;

    /// All products, or those whose name contains `name` ignoring case
    async fn list_products(&self, name: Option<String>) -> AppResult<Vec<Product>>;

    async fn list_products_in_category(&self, category_id: i32) -> AppResult<Vec<Product>>;

    async fn find_product(&self, id: i32) -> AppResult<Option<Product>>;

    /// Insert a product under an existing category; the price is stored as given
    async fn create_product(&self, category_id: i32, product: NewProduct) -> AppResult<Product>;
}

pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Lowercased `%term%` with LIKE wildcards in the term escaped by `\`
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl CatalogRepository for CatalogStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Category::from))
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Category::from))
    }

    async fn create_category(&self, name: String) -> AppResult<Category> {
        let now = chrono::Utc::now();
        let model = category::ActiveModel {
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(Category::from(model))
    }

    async fn list_products(&self, name: Option<String>) -> AppResult<Vec<Product>> {
        let mut query = ProductEntity::find();
        if let Some(name) = name {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    product::Entity,
                    product::Column::Name,
                ))))
                .like(LikeExpr::new(contains_pattern(&name)).escape('\\')),
            );
        }

        let rows = query
            .find_also_related(CategoryEntity)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|(model, category)| into_product(model, category))
            .collect())
    }

    async fn list_products_in_category(&self, category_id: i32) -> AppResult<Vec<Product>> {
        let rows = ProductEntity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .find_also_related(CategoryEntity)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|(model, category)| into_product(model, category))
            .collect())
    }

    async fn find_product(&self, id: i32) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id)
            .find_also_related(CategoryEntity)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(|(model, category)| into_product(model, category)))
    }

    async fn create_product(&self, category_id: i32, new: NewProduct) -> AppResult<Product> {
        let category = CategoryEntity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now();
        let model = product::ActiveModel {
            name: Set(new.name),
            description: Set(new.description),
            price: Set(new.price),
            image: Set(new.image),
            category_id: Set(category.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(into_product(model, Some(category)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_lowercases_term() {
        assert_eq!(contains_pattern("Coffee"), "%coffee%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
