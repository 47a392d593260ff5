//! Authentication route handlers.
//!
//! Users sign in with an allowlisted email alone; there are no passwords.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::app::{self, AuthOutcome, Notice, RegistrationInput};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::AuthorizedUser;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub company: String,
    pub role: String,
}

async fn start_session(session: &Session, user: &AuthorizedUser) -> bool {
    if let Err(e) = set_current_user(session, user).await {
        tracing::error!("Failed to set session: {}", e);
        return false;
    }
    set_sentry_user(user.email.as_str(), &user.name);
    true
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match app::login(state.data(), &form.email).await {
        AuthOutcome::LoggedIn(user) => {
            if !start_session(&session, &user).await {
                return Redirect::to(&Notice::LoginFailed.redirect_path("/")).into_response();
            }
            tracing::info!(email = %user.email, "User logged in");
            Redirect::to("/").into_response()
        }
        AuthOutcome::Rejected(notice) => Redirect::to(&notice.redirect_path("/")).into_response(),
        AuthOutcome::Incomplete => Redirect::to("/").into_response(),
    }
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let input = RegistrationInput {
        email: form.email,
        name: form.name,
        company: form.company,
        role: form.role,
    };

    match app::register(state.data(), input).await {
        AuthOutcome::LoggedIn(user) => {
            if !start_session(&session, &user).await {
                return Redirect::to(&Notice::LoginFailed.redirect_path("/")).into_response();
            }
            tracing::info!(email = %user.email, "User registered");
            Redirect::to(&Notice::Registered.redirect_path("/")).into_response()
        }
        AuthOutcome::Rejected(notice) => {
            Redirect::to(&format!("/?mode=register&notice={}", notice.code())).into_response()
        }
        AuthOutcome::Incomplete => Redirect::to("/?mode=register").into_response(),
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/").into_response()
}
