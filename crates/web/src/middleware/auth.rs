//! Authentication extractors.
//!
//! The session stores only the signed-in email. Every extraction re-reads
//! the allowlist, so a user removed by an admin loses access on their next
//! request and admin rights follow the store rather than the session.

use aula_core::Email;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{AuthorizedUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in, allowlisted user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Ciao, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub AuthorizedUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub AuthorizedUser);

/// Extractor that optionally gets the signed-in user.
pub struct OptionalUser(pub Option<AuthorizedUser>);

/// Rejection for the authentication extractors.
pub enum AuthRejection {
    /// Back to the auth screen (page requests).
    RedirectToLogin,
    /// Unauthorized response (HTMX fragment requests).
    Unauthorized,
    /// Signed in, but not an admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// HTMX fragment requests cannot follow a redirect to a full page.
fn is_fragment_request(parts: &Parts) -> bool {
    parts.headers.contains_key("hx-request")
}

async fn session_user(parts: &Parts, state: &AppState) -> Option<AuthorizedUser> {
    let session = parts.extensions.get::<Session>()?;
    let email: Email = session
        .get(session_keys::CURRENT_USER_EMAIL)
        .await
        .ok()
        .flatten()?;
    state.data().find_user(&email).await
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Some(user) => Ok(Self(user)),
            None if is_fragment_request(parts) => Err(AuthRejection::Unauthorized),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        if user.is_admin {
            Ok(Self(user))
        } else {
            tracing::warn!(email = %user.email, path = %parts.uri.path(), "Admin route denied");
            Err(AuthRejection::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts, state).await))
    }
}

/// Store the signed-in user's email in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &AuthorizedUser,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_USER_EMAIL, &user.email)
        .await
}

/// Sign out: drop the email and the UI state.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<Email>(session_keys::CURRENT_USER_EMAIL)
        .await?;
    session
        .remove::<serde_json::Value>(session_keys::UI_STATE)
        .await?;
    Ok(())
}
