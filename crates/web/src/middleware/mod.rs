//! HTTP middleware for the web app.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, added by the binary)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, OptionalUser, RequireAdmin, RequireUser, clear_current_user, set_current_user,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, load_ui_state, save_ui_state};
