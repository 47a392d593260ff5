//! Chat polling state.
//!
//! While a course detail page shows the chat, the browser polls for new
//! messages. [`ChatWatch`] remembers how many messages the viewer has seen so
//! a poll can tell whether someone else has written since.

use aula_core::{CourseId, Email};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::cues::Cue;
use crate::models::ChatMessage;

/// The chat being polled and the message count last seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatWatch {
    pub course_id: CourseId,
    pub last_count: usize,
}

impl ChatWatch {
    #[must_use]
    pub const fn new(course_id: CourseId) -> Self {
        Self {
            course_id,
            last_count: 0,
        }
    }

    /// Record a poll result, returning the message to notify about.
    ///
    /// A notification fires only when the count grew from a non-zero
    /// baseline and the newest message is not the viewer's own.
    pub fn observe<'m>(
        &mut self,
        messages: &'m [ChatMessage],
        viewer: &Email,
    ) -> Option<&'m ChatMessage> {
        let previous = self.last_count;
        self.last_count = messages.len();

        if messages.len() > previous && previous > 0 {
            messages
                .last()
                .filter(|newest| &newest.user_email != viewer)
        } else {
            None
        }
    }

    /// Record that `count` messages were rendered.
    pub const fn record_loaded(&mut self, count: usize) {
        if count == 0 || self.last_count == 0 {
            self.last_count = count;
        }
    }

    /// Record a message sent by the viewer.
    pub const fn record_sent(&mut self) {
        self.last_count += 1;
    }

    /// Forget the count, after the chat was cleared.
    pub const fn reset(&mut self) {
        self.last_count = 0;
    }
}

/// Notification for a message from someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNotification {
    pub title: &'static str,
    pub body: String,
    pub toast: String,
    pub message: String,
    pub cue: Cue,
}

impl MessageNotification {
    #[must_use]
    pub fn for_message(message: &ChatMessage) -> Self {
        Self {
            title: "Nuovo messaggio nel corso",
            body: format!("{}: {}", message.user_name, message.message),
            toast: format!("💬 Nuovo messaggio da {}", message.user_name),
            message: message.message.clone(),
            cue: Cue::Message,
        }
    }

    /// JSON payload for the page script, including the cue's tone sheet.
    #[must_use]
    pub fn to_json(&self) -> String {
        json!({
            "title": self.title,
            "body": self.body,
            "toast": self.toast,
            "message": self.message,
            "cue": self.cue.payload(),
        })
        .to_string()
    }
}
