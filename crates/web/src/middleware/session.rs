//! Session middleware configuration.
//!
//! Sessions live in process memory; the cookie only carries the session id.
//! Besides the signed-in email, the session holds the [`UiState`] that the
//! course screens read and update.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::AulaConfig;
use crate::models::{UiState, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "aula_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AulaConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Read the UI state, defaulting when the session has none.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn load_ui_state(session: &Session) -> Result<UiState, tower_sessions::session::Error> {
    Ok(session
        .get::<UiState>(session_keys::UI_STATE)
        .await?
        .unwrap_or_default())
}

/// Store the UI state.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_ui_state(
    session: &Session,
    ui: &UiState,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::UI_STATE, ui).await
}
