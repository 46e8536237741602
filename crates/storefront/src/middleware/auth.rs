//! Authentication extractors.
//!
//! The logged-in member is stored in the session under
//! [`session_keys::CURRENT_MEMBER`](crate::models::session_keys::CURRENT_MEMBER).

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentMember, session_keys};

/// Extractor that requires a logged-in member.
///
/// If nobody is logged in, the request is redirected to `/login`.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAuth(member): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", member.fullname)
/// }
/// ```
pub struct RequireAuth(pub CurrentMember);

/// Rejection returned when a page needs a logged-in member.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(member) = match OptionalAuth::from_request_parts(parts, state).await {
            Ok(auth) => auth,
            Err(never) => match never {},
        };
        member.map(Self).ok_or(AuthRejection)
    }
}

/// Extractor that optionally gets the current member.
///
/// Unlike `RequireAuth`, this never rejects. JSON endpoints use it so they
/// can answer with their own failure message instead of a redirect.
pub struct OptionalAuth(pub Option<CurrentMember>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentMember>(session_keys::CURRENT_MEMBER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(member))
    }
}

/// Log a member in: rotate the session ID, then store the member.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_member(
    session: &Session,
    member: &CurrentMember,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_MEMBER, member).await
}

/// Log the member out by destroying the whole session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_current_member(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
