//! Router assembly.
//!
//! [`app`] builds the complete storefront router minus the Sentry layers,
//! which `main` adds on the outside once the client is initialised.

use axum::{Router, http::Request, middleware as axum_mw, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::routes;
use crate::state::AppState;

/// Build the storefront router over any session store.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::readiness))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .fallback(routes::not_found)
        .layer(session_layer)
        .layer(axum_mw::from_fn(security_headers_middleware))
        .layer(axum_mw::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Method, StatusCode, header},
        response::Response,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::tests::test_config;
    use crate::middleware::session_layer;

    /// Router with an in-memory session store and a pool that never connects
    /// (requests reaching the database fail fast).
    fn test_app() -> Router {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/aoeyaeng_test")
            .unwrap();
        let layer = session_layer(MemoryStore::default(), &config);
        let state = AppState::new(config, pool).unwrap();
        app(state, layer)
    }

    async fn get(uri: &str) -> Response {
        test_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(uri: &str, body: &'static str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "203.0.113.10")
            .body(Body::from(body))
            .unwrap();
        test_app().oneshot(request).await.unwrap()
    }

    async fn post_with_type(uri: &str, content_type: &str, body: &'static str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-forwarded-for", "203.0.113.11")
            .body(Body::from(body))
            .unwrap();
        test_app().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_readiness_without_database() {
        let response = get("/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_home_page_for_guest() {
        let response = get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("href=\"/login\""));
        assert!(!html.contains("href=\"/logout\""));
    }

    #[tokio::test]
    async fn test_login_page_success_banner() {
        let html = body_text(get("/login").await).await;
        assert!(!html.contains("Registration successful. Please log in."));

        let html = body_text(get("/login?success=true").await).await;
        assert!(html.contains("Registration successful. Please log in."));
    }

    #[tokio::test]
    async fn test_public_forms_render() {
        for path in ["/register", "/forgot-password"] {
            let response = get(path).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_member_pages_redirect_to_login() {
        for path in ["/dashboard", "/products", "/products?category=shirts", "/cart"] {
            let response = get(path).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(location(&response), "/login", "{path}");
        }
    }

    #[tokio::test]
    async fn test_change_password_requires_login() {
        let response = post_form("/change-password", "oldPassword=a&newPassword=b").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_logout_redirects_home() {
        let response = get("/logout").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_add_to_cart_requires_login() {
        let json = body_json(post_form("/add-to-cart", "product_id=1").await).await;
        assert_eq!(json["success"], false);
        assert_eq!(
            json["message"],
            "Please log in before adding items to the cart."
        );
    }

    #[tokio::test]
    async fn test_remove_and_checkout_require_login() {
        let json = body_json(post_form("/remove-from-cart", "cart_id=1").await).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unauthorized");

        let json = body_json(post_form("/checkout", "").await).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_cart_endpoints_accept_json_bodies() {
        let response =
            post_with_type("/add-to-cart", "application/json", r#"{"product_id":1}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(
            json["message"],
            "Please log in before adding items to the cart."
        );

        let response =
            post_with_type("/remove-from-cart", "application/json", r#"{"cart_id":"3"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_cart_endpoints_answer_json_for_unreadable_bodies() {
        for (content_type, body) in [
            ("text/plain", "product_id=1"),
            ("application/json", "{not json"),
        ] {
            let response = post_with_type("/add-to-cart", content_type, body).await;
            assert_eq!(response.status(), StatusCode::OK, "{content_type}");
            let json = body_json(response).await;
            assert_eq!(json["success"], false, "{content_type}");
        }
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email() {
        let response = post_form("/forgot-password", "email=nobody").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Email not found in the system."));
        assert!(!html.contains("Temporary password sent to your email."));
    }

    #[tokio::test]
    async fn test_forgot_password_database_failure_is_generic() {
        let response = post_form("/forgot-password", "email=aey%40example.com").await;
        let html = body_text(response).await;
        assert!(html.contains("An error occurred while sending the email."));
    }

    #[tokio::test]
    async fn test_login_with_malformed_email() {
        let response = post_form("/login", "email=nobody&password=whatever").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Email not found. Please register."));
    }

    #[tokio::test]
    async fn test_register_validation_rerenders_form() {
        let response = post_form(
            "/register",
            "fullname=Aey&email=aey%40example.com&password=short&phone=&dob=&address=",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Password must be at least 8 characters."));
        assert!(html.contains("aey@example.com"));
    }

    #[tokio::test]
    async fn test_login_database_failure_is_generic() {
        let response =
            post_form("/login", "email=aey%40example.com&password=whatever").await;
        let html = body_text(response).await;
        assert!(html.contains("An error occurred during login."));
    }

    #[tokio::test]
    async fn test_security_headers() {
        let response = get("/").await;
        let headers = response.headers();
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert!(headers.get("content-security-policy").is_some());
        assert_eq!(headers.get("cache-control").unwrap(), "no-store, max-age=0");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let request = Request::get("/health")
            .header("x-request-id", "req-abc-123")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-abc-123");

        let response = get("/health").await;
        assert!(response.headers().get("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = get("/no-such-page").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not found: /no-such-page");
    }
}
