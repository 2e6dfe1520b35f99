//! Catalog service - Browsing categories and products, and catalog seeding.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::container::parallel;
use crate::domain::{Category, NewCategory, NewProduct, Product};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Products to display together with the category navigation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Catalog content loaded by the `seed` command
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<NewCategory>,
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

/// Rows written by a seed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub categories_created: usize,
    pub products_created: usize,
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// All products, or those whose name contains `name` ignoring case
    async fn index(&self, name: Option<String>) -> AppResult<CatalogPage>;

    /// Products of one category
    async fn by_category(&self, category_id: i32) -> AppResult<CatalogPage>;

    async fn product(&self, product_id: i32) -> AppResult<Product>;

    /// Insert seed content. Categories are matched by name and reused.
    async fn seed(&self, seed: CatalogSeed) -> AppResult<SeedReport>;
}

pub struct CatalogBrowser<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogBrowser<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn category_by_name(&self, name: &str, report: &mut SeedReport) -> AppResult<Category> {
        let catalog = self.uow.catalog();
        if let Some(category) = catalog.find_category_by_name(name).await? {
            return Ok(category);
        }
        let category = catalog.create_category(name.to_string()).await?;
        report.categories_created += 1;
        Ok(category)
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogBrowser<U> {
    async fn index(&self, name: Option<String>) -> AppResult<CatalogPage> {
        let catalog = self.uow.catalog();
        let name = name.filter(|n| !n.is_empty());

        let (products, categories) =
            parallel::join2(catalog.list_products(name), catalog.list_categories()).await?;

        Ok(CatalogPage {
            products,
            categories,
        })
    }

    async fn by_category(&self, category_id: i32) -> AppResult<CatalogPage> {
        let catalog = self.uow.catalog();
        catalog.find_category(category_id).await?.ok_or_not_found()?;

        let (products, categories) = parallel::join2(
            catalog.list_products_in_category(category_id),
            catalog.list_categories(),
        )
        .await?;

        Ok(CatalogPage {
            products,
            categories,
        })
    }

    async fn product(&self, product_id: i32) -> AppResult<Product> {
        self.uow
            .catalog()
            .find_product(product_id)
            .await?
            .ok_or_not_found()
    }

    async fn seed(&self, seed: CatalogSeed) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();

        for category in &seed.categories {
            self.category_by_name(category.name.trim(), &mut report)
                .await?;
        }

        for mut product in seed.products {
            let price = product.validated_price().ok_or_else(|| {
                AppError::validation(format!("Product '{}' has a negative price", product.name))
            })?;
            product.price = price;

            let category = self
                .category_by_name(product.category.trim(), &mut report)
                .await?;
            self.uow
                .catalog()
                .create_product(category.id, product)
                .await?;
            report.products_created += 1;
        }

        tracing::info!(
            categories = report.categories_created,
            products = report.products_created,
            "Catalog seeded"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockCatalogRepository;
    use crate::services::test_support::TestUnitOfWork;
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn category(id: i32, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: i32, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: String::new(),
            price: dec!(3.50),
            image: String::new(),
            category_id: 1,
            category: "Tea".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn browser(catalog: MockCatalogRepository) -> CatalogBrowser<TestUnitOfWork> {
        CatalogBrowser::new(Arc::new(TestUnitOfWork::new().with_catalog(catalog)))
    }

    #[tokio::test]
    async fn test_index_passes_name_filter() {
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_list_products()
            .with(eq(Some("green".to_string())))
            .returning(|_| Ok(vec![product(2, "Green tea")]));
        catalog
            .expect_list_categories()
            .returning(|| Ok(vec![category(1, "Tea")]));

        let page = browser(catalog)
            .index(Some("green".to_string()))
            .await
            .unwrap();
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.categories.len(), 1);
    }

    #[tokio::test]
    async fn test_index_treats_empty_name_as_no_filter() {
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_list_products()
            .with(eq(None))
            .returning(|_| Ok(vec![product(1, "Black tea"), product(2, "Green tea")]));
        catalog.expect_list_categories().returning(|| Ok(vec![]));

        let page = browser(catalog).index(Some(String::new())).await.unwrap();
        assert_eq!(page.products.len(), 2);
    }

    #[tokio::test]
    async fn test_by_category_missing_is_not_found() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_category().returning(|_| Ok(None));
        catalog.expect_list_products_in_category().never();

        let result = browser(catalog).by_category(99).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_product_missing_is_not_found() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_product().returning(|_| Ok(None));

        let result = browser(catalog).product(5).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_seed_reuses_categories_by_name() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_category_by_name().returning(|name| {
            Ok((name == "Tea").then(|| category(1, "Tea")))
        });
        catalog
            .expect_create_category()
            .times(1)
            .returning(|name| Ok(category(2, &name)));
        catalog
            .expect_create_product()
            .times(2)
            .returning(|category_id, new| {
                let mut created = product(10, &new.name);
                created.category_id = category_id;
                created.price = new.price;
                Ok(created)
            });

        let seed: CatalogSeed = serde_json::from_value(serde_json::json!({
            "categories": [{"name": "Tea"}, {"name": "Coffee"}],
            "products": [
                {"name": "Sencha", "price": "4.999", "category": "Tea"},
                {"name": "Mocha", "price": "6.00", "category": "Tea"}
            ]
        }))
        .unwrap();

        let report = browser(catalog).seed(seed).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                categories_created: 1,
                products_created: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_seed_rejects_negative_price() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_create_product().never();

        let seed = CatalogSeed {
            categories: vec![],
            products: vec![NewProduct {
                name: "Broken".to_string(),
                description: String::new(),
                price: dec!(-1),
                image: String::new(),
                category: "Tea".to_string(),
            }],
        };

        let result = browser(catalog).seed(seed).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
