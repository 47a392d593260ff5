//! Course chat messages.

use aula_core::{CourseId, Email};
use chrono::{DateTime, Utc};

use super::AuthorizedUser;

/// A message in a course chat. Messages are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub course_id: CourseId,
    pub user_email: Email,
    pub user_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A message from `author` sent now.
    #[must_use]
    pub fn from_user(course_id: CourseId, author: &AuthorizedUser, message: String) -> Self {
        Self {
            course_id,
            user_email: author.email.clone(),
            user_name: author.name.clone(),
            message,
            timestamp: Utc::now(),
        }
    }
}
