//! Catalog types.

use serde::Deserialize;

use aoeyaeng_core::{Price, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub category: String,
}

/// A product to insert (used by the catalog seeder).
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category: String,
}

/// Which slice of the catalog `/products` shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every product.
    #[default]
    All,
    /// Products whose category matches exactly.
    Named(String),
}

impl CategoryFilter {
    /// Query-string value meaning "no filter".
    pub const ALL: &'static str = "all";

    /// Build a filter from the `?category=` query parameter.
    ///
    /// Missing, empty and exactly `all` select every product; anything else
    /// is matched verbatim, so a category literally named `All` stays
    /// selectable.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            None | Some("" | Self::ALL) => Self::All,
            Some(v) => Self::Named(v.to_string()),
        }
    }

    /// Whether `category` is the one currently selected.
    #[must_use]
    pub fn selects(&self, category: &str) -> bool {
        matches!(self, Self::Named(name) if name == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_empty_and_all_mean_everything() {
        assert_eq!(CategoryFilter::from_query(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_query(Some("")), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_query(Some("all")), CategoryFilter::All);
    }

    #[test]
    fn other_values_match_verbatim() {
        assert_eq!(
            CategoryFilter::from_query(Some("All")),
            CategoryFilter::Named("All".to_string())
        );
        assert_eq!(
            CategoryFilter::from_query(Some(" shirts")),
            CategoryFilter::Named(" shirts".to_string())
        );

        let filter = CategoryFilter::from_query(Some("Dresses"));
        assert!(filter.selects("Dresses"));
        assert!(!filter.selects("Shirts"));
        assert!(!CategoryFilter::All.selects("Dresses"));
    }
}
