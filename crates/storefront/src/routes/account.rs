//! Account route handlers.
//!
//! These routes require a logged-in member.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentMember;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

const CURRENT_PASSWORD_INCORRECT: &str = "Current password is incorrect.";
const PASSWORD_CHANGED: &str = "Password successfully changed.";
const PASSWORD_CHANGE_FAILED: &str = "An error occurred while changing the password.";

/// Change password form data. Field names match the dashboard form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordForm {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub is_logged_in: bool,
    pub fullname: String,
    pub email: String,
    pub change_error: Option<String>,
    pub change_success: Option<&'static str>,
}

impl DashboardTemplate {
    fn for_member(member: CurrentMember) -> Self {
        Self {
            is_logged_in: true,
            fullname: member.fullname,
            email: member.email.into_inner(),
            change_error: None,
            change_success: None,
        }
    }
}

/// Display the member dashboard.
pub async fn dashboard(RequireAuth(member): RequireAuth) -> impl IntoResponse {
    DashboardTemplate::for_member(member)
}

/// Handle the change password form.
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(member): RequireAuth,
    Form(form): Form<ChangePasswordForm>,
) -> impl IntoResponse {
    let auth = AuthService::new(state.pool());
    let result = auth
        .change_password(member.id, &form.old_password, &form.new_password)
        .await;

    let mut page = DashboardTemplate::for_member(member);
    match result {
        Ok(()) => page.change_success = Some(PASSWORD_CHANGED),
        Err(AuthError::IncorrectPassword) => {
            page.change_error = Some(CURRENT_PASSWORD_INCORRECT.to_string());
        }
        Err(AuthError::WeakPassword(msg)) => page.change_error = Some(msg),
        Err(e) => {
            tracing::error!(error = %e, "Change password failed");
            page.change_error = Some(PASSWORD_CHANGE_FAILED.to_string());
        }
    }
    page
}
