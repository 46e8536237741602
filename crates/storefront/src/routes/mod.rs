//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Home page
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (database)
//!
//! # Auth
//! GET  /login              - Login page (?success=true after registering)
//! POST /login              - Login action
//! GET  /register           - Register page
//! POST /register           - Register action
//! GET  /logout             - Destroy session
//! GET  /forgot-password    - Forgot password page
//! POST /forgot-password    - Email a temporary password
//!
//! # Account (requires login)
//! GET  /dashboard          - Member dashboard
//! POST /change-password    - Change password
//!
//! # Catalog and cart
//! GET  /products           - Product listing (?category=)
//! GET  /cart               - Cart page
//! POST /add-to-cart        - Add item (JSON)
//! POST /remove-from-cart   - Remove line (JSON)
//! POST /checkout           - Confirm order (JSON)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Create all page and form routes for the storefront.
pub fn routes() -> Router<AppState> {
    let auth_limit = auth_rate_limiter();
    let cart_limit = cart_rate_limiter();

    Router::new()
        .route("/", get(home::home))
        // Auth
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(auth_limit.clone())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(auth_limit.clone())),
        )
        .route("/logout", get(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page)
                .merge(post(auth::forgot_password).layer(auth_limit.clone())),
        )
        // Account
        .route("/dashboard", get(account::dashboard))
        .route(
            "/change-password",
            post(account::change_password).layer(auth_limit),
        )
        // Catalog and cart
        .route("/products", get(products::index))
        .route("/cart", get(cart::show))
        .route("/add-to-cart", post(cart::add).layer(cart_limit.clone()))
        .route(
            "/remove-from-cart",
            post(cart::remove).layer(cart_limit.clone()),
        )
        .route("/checkout", post(cart::checkout).layer(cart_limit))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
