//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Auth screen or course list
//!
//! # Auth
//! POST /auth/login                        - Login by allowlisted email
//! POST /auth/register                     - Self-registration
//! POST /auth/logout                       - Logout
//!
//! # Courses
//! POST /courses/archive                   - Toggle the archive view
//! GET  /courses/new                       - Add course form (admin)
//! POST /courses                           - Create course (admin, multipart)
//! GET  /courses/{id}                      - Course detail
//! GET  /courses/{id}/edit                 - Edit course form (admin)
//! POST /courses/{id}                      - Update course (admin, multipart)
//! POST /courses/{id}/delete               - Delete course (admin)
//! POST /courses/{id}/terminate            - Mark completed (admin)
//! POST /courses/{id}/restore              - Mark active (admin)
//! POST /courses/{id}/enroll               - Enroll
//! POST /courses/{id}/unenroll             - Unenroll
//! POST /courses/{id}/participants/remove  - Remove a participant (admin)
//!
//! # Chat (HTMX fragments)
//! GET  /courses/{id}/chat                 - Message list
//! GET  /courses/{id}/chat/poll            - Polling tick (286 stops polling)
//! POST /courses/{id}/chat                 - Send a message
//! POST /courses/{id}/chat/clear           - Delete all messages (admin)
//!
//! # Users (admin)
//! GET  /users                             - Allowlist management
//! POST /users                             - Add an email
//! POST /users/delete                      - Remove an email
//! ```

pub mod auth;
pub mod chat;
pub mod courses;
pub mod home;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Deserialize;

use crate::app::Notice;
use crate::image::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for the text fields next to an image upload.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

// =============================================================================
// Shared Page Data
// =============================================================================

/// Query parameters shared by full pages.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub notice: Option<String>,
    pub mode: Option<String>,
}

impl PageQuery {
    /// The flash for the notice code, if it is a known one.
    #[must_use]
    pub fn flash(&self) -> Option<Flash> {
        self.notice
            .as_deref()
            .and_then(Notice::from_code)
            .map(Flash::from)
    }
}

/// A notice rendered on the page after a redirect.
#[derive(Debug, Clone)]
pub struct Flash {
    pub message: Option<&'static str>,
    pub css_class: &'static str,
    /// Cue JSON for the page script.
    pub cue: Option<String>,
}

impl From<Notice> for Flash {
    fn from(notice: Notice) -> Self {
        Self {
            message: notice.message(),
            css_class: notice.level().css_class(),
            cue: notice.cue().map(|cue| cue.to_json()),
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the course routes router.
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(courses::create))
        .route("/archive", post(courses::toggle_archive))
        .route("/new", get(courses::new_form))
        .route("/{id}", get(courses::show).post(courses::update))
        .route("/{id}/edit", get(courses::edit_form))
        .route("/{id}/delete", post(courses::delete))
        .route("/{id}/terminate", post(courses::terminate))
        .route("/{id}/restore", post(courses::restore))
        .route("/{id}/enroll", post(courses::enroll))
        .route("/{id}/unenroll", post(courses::unenroll))
        .route("/{id}/participants/remove", post(courses::remove_participant))
        .route("/{id}/chat", get(chat::messages).post(chat::send))
        .route("/{id}/chat/poll", get(chat::poll))
        .route("/{id}/chat/clear", post(chat::clear))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES))
}

/// Create the allowlist management router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::add))
        .route("/delete", post(users::delete))
}

/// Create all routes for the app.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auth", auth_routes())
        .nest("/courses", course_routes())
        .nest("/users", user_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_from_query() {
        let query = PageQuery {
            notice: Some("course_full".to_string()),
            mode: None,
        };
        let flash = query.flash().unwrap_or_else(|| panic!("expected a flash"));
        assert_eq!(
            flash.message,
            Some("Spiacente, il corso ha raggiunto il numero massimo di partecipanti.")
        );
        assert_eq!(flash.css_class, "notice-error");
        assert!(flash.cue.is_none());
    }

    #[test]
    fn test_flash_carries_cue() {
        let flash = Flash::from(Notice::Enrolled);
        assert!(flash.message.is_none());
        assert!(flash.cue.unwrap_or_default().contains("\"enroll\""));
    }

    #[test]
    fn test_unknown_notice_is_ignored() {
        let query = PageQuery {
            notice: Some("<script>".to_string()),
            mode: None,
        };
        assert!(query.flash().is_none());
    }
}
