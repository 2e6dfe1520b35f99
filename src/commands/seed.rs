//! Seed command - Loads catalog content from a JSON file.

use std::sync::Arc;

use crate::cli::args::SeedArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, MemorySessionStore};
use crate::services::{CatalogSeed, ServiceContainer, Services};

/// Execute the seed command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let contents = tokio::fs::read_to_string(&args.file).await.map_err(|e| {
        AppError::internal(format!("Failed to read {}: {}", args.file.display(), e))
    })?;
    let seed = parse_seed(&contents)?;

    let db = Database::connect(&config).await?;
    // Seeding never touches sessions
    let services = Services::from_connection(
        db.get_connection(),
        &config,
        Arc::new(MemorySessionStore::new(config.session_ttl_seconds)),
    );

    let report = services.catalog().seed(seed).await?;
    tracing::info!(
        categories = report.categories_created,
        products = report.products_created,
        "Catalog seeded"
    );

    Ok(())
}

fn parse_seed(contents: &str) -> AppResult<CatalogSeed> {
    serde_json::from_str(contents)
        .map_err(|e| AppError::validation(format!("Invalid seed file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_seed_file() {
        let seed = parse_seed(
            r#"{
                "categories": [{"name": "Coffee"}],
                "products": [{"name": "Beans", "price": "10.00", "category": "Coffee"}]
            }"#,
        )
        .unwrap();
        assert_eq!(seed.categories.len(), 1);
        assert_eq!(seed.products[0].price, dec!(10.00));
        assert!(seed.products[0].image.is_empty());
    }

    #[test]
    fn test_parse_seed_rejects_garbage() {
        assert!(matches!(parse_seed("[1, 2]"), Err(AppError::Validation(_))));
    }
}
