//! Seed the product catalog from YAML.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - name: Linen Shirt
//!   description: Relaxed fit, washed linen.
//!   price: "590.00"
//!   image_url: https://images.example.com/linen-shirt.jpg
//!   category: shirts
//! ```
//!
//! `description` and `image_url` are optional. Prices are strings so they
//! are parsed as exact decimals.

use std::path::Path;

use tracing::{error, info};

use aoeyaeng_storefront::db::{self, ProductRepository};
use aoeyaeng_storefront::models::NewProduct;

/// Insert products from `file_path`, optionally clearing the catalog first.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or if a database
/// operation fails.
pub async fn products(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_products(&content)?;

    let errors = validate(&products);
    if !errors.is_empty() {
        error!("Product file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!(products = products.len(), "Parsed product file");

    let pool = db::create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    if clear_existing {
        let removed = repo.clear().await?;
        info!(removed, "Cleared existing products");
    }

    for product in &products {
        let id = repo.create(product).await?;
        info!(product_id = %id, name = %product.name, "Inserted product");
    }

    info!("Seeding complete! {} products inserted", products.len());
    Ok(())
}

fn parse_products(content: &str) -> Result<Vec<NewProduct>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Collect every problem in the file rather than stopping at the first.
fn validate(products: &[NewProduct]) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, product) in products.iter().enumerate() {
        let entry = index + 1;
        if product.name.trim().is_empty() {
            errors.push(format!("entry {entry}: name is empty"));
        }
        if product.category.trim().is_empty() {
            errors.push(format!("entry {entry}: category is empty"));
        }
        if product.price.is_negative() {
            errors.push(format!("entry {entry}: price {} is negative", product.price));
        }
    }
    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_products_with_optional_fields() {
        let products = parse_products(
            r#"
- name: Linen Shirt
  description: Relaxed fit.
  price: "590.00"
  image_url: https://images.example.com/linen.jpg
  category: shirts
- name: Canvas Tote
  price: "249.50"
  category: bags
"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price.amount(), Decimal::new(59000, 2));
        assert_eq!(products[1].description, "");
        assert!(products[1].image_url.is_none());
        assert!(validate(&products).is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let products = parse_products(
            r#"
- name: ""
  price: "-1.00"
  category: " "
"#,
        )
        .unwrap();

        let errors = validate(&products);
        assert_eq!(errors.len(), 3);
        assert!(errors[2].contains("negative"));
    }
}
