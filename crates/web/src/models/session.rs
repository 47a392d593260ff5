//! Session-stored state.
//!
//! The session holds the logged-in user's email (the user itself is
//! re-read from the allowlist on every request) and the per-browser UI
//! state the course screens depend on.

use aula_core::CourseId;
use serde::{Deserialize, Serialize};

use crate::app::ChatWatch;

/// Per-browser UI state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Whether the course list shows the archive (terminated courses).
    pub showing_archive: bool,
    /// Chat currently being polled, if a course detail page is open.
    pub chat: Option<ChatWatch>,
}

impl UiState {
    /// Start watching a course chat, keeping the count if it is already watched.
    pub fn watch_chat(&mut self, course_id: CourseId) -> &mut ChatWatch {
        let watch = match self.chat.take() {
            Some(watch) if watch.course_id == course_id => watch,
            _ => ChatWatch::new(course_id),
        };
        self.chat.insert(watch)
    }

    /// The watch for `course_id`, if that chat is the one being polled.
    pub fn chat_for(&mut self, course_id: CourseId) -> Option<&mut ChatWatch> {
        self.chat
            .as_mut()
            .filter(|watch| watch.course_id == course_id)
    }

    /// Stop polling any chat.
    pub const fn stop_chat(&mut self) {
        self.chat = None;
    }
}

/// Session keys for authentication and UI data.
pub mod keys {
    /// Key for the logged-in user's email.
    pub const CURRENT_USER_EMAIL: &str = "current_user_email";

    /// Key for the [`UiState`](super::UiState).
    pub const UI_STATE: &str = "ui_state";
}
