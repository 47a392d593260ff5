//! Domain models.
//!
//! These use domain field names; the store's column names live in
//! [`crate::data`].

mod chat;
mod course;
mod session;
mod user;

pub use chat::ChatMessage;
pub use course::{
    Course, CourseDetails, DEFAULT_MAX_PARTICIPANTS, DEFAULT_START_TIME, Enrollment, NewCourse,
};
pub use session::{UiState, keys as session_keys};
pub use user::{AuthorizedUser, NOT_AVAILABLE, Registration};
