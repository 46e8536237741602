//! Integration tests for the Aoeyaeng Clothing storefront.
//!
//! These drive a running storefront over HTTP with a cookie-keeping client,
//! so they are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p aoeyaeng-cli -- migrate
//! cargo run -p aoeyaeng-storefront &
//! cargo test -p aoeyaeng-integration-tests -- --ignored --test-threads=1
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - Server under test (default: `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` - Same database the server uses, for fixtures
//!
//! Tests that need control over the server's configuration start their own
//! in-process storefront with [`spawn_storefront`] instead.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use aoeyaeng_storefront::config::{EmailConfig, StorefrontConfig};
use aoeyaeng_storefront::db::{self, ProductRepository};
use aoeyaeng_storefront::middleware::session_layer;
use aoeyaeng_storefront::models::NewProduct;
use aoeyaeng_storefront::state::AppState;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, redirect};
use secrecy::SecretString;
use sqlx::PgPool;
use tower_sessions::MemoryStore;

/// Password used for every account the tests register.
pub const TEST_PASSWORD: &str = "integration-pass";

/// One simulated shopper: an HTTP client with its own cookie jar.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// A fresh shopper with no session, against `STOREFRONT_TEST_URL`.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("STOREFRONT_TEST_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self::with_base_url(&base_url)
    }

    /// A fresh shopper against a specific server.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        // Each shopper gets its own client IP so rate limits don't span tests
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_str(&random_client_ip()).unwrap(),
        );

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Post to a cart endpoint and return its JSON reply.
    pub async fn post_json_action(&self, path: &str, form: &[(&str, &str)]) -> serde_json::Value {
        self.post_form(path, form).await.json().await.unwrap()
    }

    /// Register a new member and return their email.
    pub async fn register(&self) -> String {
        let email = unique_email();
        let response = self
            .post_form(
                "/register",
                &[
                    ("fullname", "Integration Shopper"),
                    ("dob", "2000-01-31"),
                    ("phone", "0800000000"),
                    ("email", email.as_str()),
                    ("password", TEST_PASSWORD),
                    ("address", "1 Test Road, Bangkok"),
                ],
            )
            .await;
        assert_eq!(location(&response), "/login?success=true");
        email
    }

    /// Log in, asserting success.
    pub async fn login(&self, email: &str, password: &str) {
        let response = self
            .post_form("/login", &[("email", email), ("password", password)])
            .await;
        assert_eq!(location(&response), "/dashboard");
    }

    /// Register and log in a brand-new member.
    pub async fn logged_in_member(&self) -> String {
        let email = self.register().await;
        self.login(&email, TEST_PASSWORD).await;
        email
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("shopper-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// A random address in 10.0.0.0/8.
fn random_client_ip() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    format!("10.{}.{}.{}", bytes[0], bytes[1], bytes[2])
}

/// The `Location` header of a redirect, or `""`.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Every value of `attr="..."` in an HTML page, in order.
#[must_use]
pub fn attribute_values(html: &str, attr: &str) -> Vec<String> {
    let needle = format!("{attr}=\"");
    html.split(needle.as_str())
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

fn database_url() -> SecretString {
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .unwrap()
}

/// Connect to the storefront database for fixtures.
pub async fn pool() -> PgPool {
    db::create_pool(&database_url()).await.unwrap()
}

/// A localhost port with nothing listening on it.
#[must_use]
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

/// Serve the storefront in-process on an ephemeral port, with its SMTP relay
/// at `127.0.0.1:smtp_port`, and return its base URL.
///
/// Sessions are kept in memory; everything else uses the test database.
pub async fn spawn_storefront(smtp_port: u16) -> String {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let config = StorefrontConfig {
        database_url: database_url(),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: addr.port(),
        base_url: base_url.clone(),
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static")),
        email: EmailConfig {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port,
            smtp_username: "shop@example.com".to_string(),
            smtp_password: SecretString::from("unused"),
            from_address: "Aoeyaeng Clothing <shop@example.com>".to_string(),
            smtp_timeout: Duration::from_secs(2),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    };

    let pool = pool().await;
    let layer = session_layer(MemoryStore::default(), &config);
    let state = AppState::new(config, pool).unwrap();
    let router = aoeyaeng_storefront::app::app(state, layer);

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    base_url
}

/// Insert a product in its own category and return the category name.
pub async fn seed_product(pool: &PgPool, price: &str) -> String {
    let category = format!("test-{}", uuid::Uuid::new_v4().simple());
    let product: NewProduct = serde_json::from_value(serde_json::json!({
        "name": "Integration Tee",
        "description": "Fixture product",
        "price": price,
        "category": category,
    }))
    .unwrap();
    ProductRepository::new(pool).create(&product).await.unwrap();
    category
}
