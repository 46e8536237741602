//! Authentication route handlers.
//!
//! Login, registration, logout and the emailed temporary password flow.
//! Failed submissions re-render the form with a message; nothing is
//! carried across redirects except `/login?success=true`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_member, set_current_member};
use crate::models::CurrentMember;
use crate::services::{AuthError, AuthService, Registration};
use crate::state::AppState;

const REGISTRATION_SUCCESS: &str = "Registration successful. Please log in.";
const LOGIN_EMAIL_NOT_FOUND: &str = "Email not found. Please register.";
const LOGIN_INCORRECT_PASSWORD: &str = "Incorrect password.";
const LOGIN_FAILED: &str = "An error occurred during login.";
const REGISTER_EMAIL_IN_USE: &str = "This email is already in use. Please use another email.";
const REGISTER_INVALID_EMAIL: &str = "Please enter a valid email address.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const RESET_EMAIL_NOT_FOUND: &str = "Email not found in the system.";
const RESET_SEND_FAILED: &str = "An error occurred while sending the email.";
const RESET_SENT: &str = "Temporary password sent to your email.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub fullname: String,
    pub dob: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

/// Forgot password form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub is_logged_in: bool,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
    pub email: String,
}

/// Values echoed back into the registration form after a failed submit.
#[derive(Debug, Default)]
pub struct RegisterValues {
    pub fullname: String,
    pub dob: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub is_logged_in: bool,
    pub error: Option<String>,
    pub values: RegisterValues,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub is_logged_in: bool,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(member): OptionalAuth,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        is_logged_in: member.is_some(),
        error: None,
        success: (query.success.as_deref() == Some("true")).then_some(REGISTRATION_SUCCESS),
        email: String::new(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    let error = match auth.login(&form.email, &form.password).await {
        Ok(member) => {
            let current = CurrentMember::from(&member);
            match set_current_member(&session, &current).await {
                Ok(()) => {
                    set_sentry_user(&member.id, Some(member.email.as_str()));
                    tracing::info!(member_id = %member.id, "Member logged in");
                    return Redirect::to("/dashboard").into_response();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to store session");
                    LOGIN_FAILED
                }
            }
        }
        Err(AuthError::EmailNotFound) => LOGIN_EMAIL_NOT_FOUND,
        Err(AuthError::IncorrectPassword) => {
            tracing::warn!("Login failed: incorrect password");
            LOGIN_INCORRECT_PASSWORD
        }
        Err(e) => {
            tracing::error!(error = %e, "Login error");
            LOGIN_FAILED
        }
    };

    LoginTemplate {
        is_logged_in: false,
        error: Some(error),
        success: None,
        email: form.email,
    }
    .into_response()
}

/// Log out and return to the home page.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_member(&session).await {
        tracing::error!(error = %e, "Failed to destroy session");
    }
    clear_sentry_user();
    Redirect::to("/").into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(member): OptionalAuth) -> impl IntoResponse {
    RegisterTemplate {
        is_logged_in: member.is_some(),
        error: None,
        values: RegisterValues::default(),
    }
}

/// Handle registration form submission.
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let registration = Registration {
        fullname: form.fullname,
        dob: form.dob,
        phone: form.phone,
        email: form.email,
        password: SecretString::from(form.password),
        address: form.address,
    };

    let auth = AuthService::new(state.pool());
    let error = match auth.register(&registration).await {
        Ok(member) => {
            tracing::info!(member_id = %member.id, "Member registered");
            return Redirect::to("/login?success=true").into_response();
        }
        Err(AuthError::EmailInUse) => REGISTER_EMAIL_IN_USE.to_string(),
        Err(AuthError::InvalidEmail(_)) => REGISTER_INVALID_EMAIL.to_string(),
        Err(AuthError::WeakPassword(msg) | AuthError::InvalidField(msg)) => msg,
        Err(e) => {
            tracing::error!(error = %e, "Registration error");
            REGISTER_FAILED.to_string()
        }
    };

    RegisterTemplate {
        is_logged_in: false,
        error: Some(error),
        values: RegisterValues {
            fullname: registration.fullname,
            dob: registration.dob,
            phone: registration.phone,
            email: registration.email,
            address: registration.address,
        },
    }
    .into_response()
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(OptionalAuth(member): OptionalAuth) -> impl IntoResponse {
    ForgotPasswordTemplate {
        is_logged_in: member.is_some(),
        error: None,
        success: None,
    }
}

/// Email the member a temporary password.
pub async fn forgot_password(
    State(state): State<AppState>,
    OptionalAuth(member): OptionalAuth,
    Form(form): Form<ForgotPasswordForm>,
) -> impl IntoResponse {
    let auth = AuthService::new(state.pool());

    let (error, success) = match auth.reset_password(&form.email, state.email()).await {
        Ok(()) => (None, Some(RESET_SENT)),
        Err(AuthError::EmailNotFound) => (Some(RESET_EMAIL_NOT_FOUND), None),
        Err(e) => {
            tracing::error!(error = %e, "Password reset failed");
            (Some(RESET_SEND_FAILED), None)
        }
    };

    ForgotPasswordTemplate {
        is_logged_in: member.is_some(),
        error,
        success,
    }
}
