//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub is_logged_in: bool,
}

/// Display the home page.
pub async fn home(OptionalAuth(member): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        is_logged_in: member.is_some(),
    }
}
