//! Product catalog handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CategoryFilter, Product};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub category: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            price: product.price.to_string(),
            image_url: product.image_url,
            category: product.category,
        }
    }
}

/// One entry in the category selector.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub selected: bool,
}

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub is_logged_in: bool,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    pub all_selected: bool,
}

/// Display the product listing, optionally filtered by category.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_member): RequireAuth,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse> {
    let filter = CategoryFilter::from_query(query.category.as_deref());
    let repo = ProductRepository::new(state.pool());

    let products = repo.list(&filter).await?;
    let categories = repo.categories().await?;

    Ok(ProductsIndexTemplate {
        is_logged_in: true,
        products: products.into_iter().map(ProductView::from).collect(),
        categories: categories
            .into_iter()
            .map(|name| CategoryView {
                selected: filter.selects(&name),
                name,
            })
            .collect(),
        all_selected: filter == CategoryFilter::All,
    })
}
