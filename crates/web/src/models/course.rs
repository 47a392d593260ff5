//! Courses and enrollments.

use aula_core::{CourseId, CourseStatus, Email};
use chrono::{DateTime, NaiveDate, Utc};

/// Capacity used when a course has no explicit maximum.
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 20;

/// Start time shown when a course has none.
pub const DEFAULT_START_TIME: &str = "09:00";

/// Editable course fields, shared by creation and full edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDetails {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub location: String,
    pub date: Option<NaiveDate>,
    /// `HH:MM`
    pub start_time: Option<String>,
    /// Hours, as typed by the admin.
    pub duration: Option<String>,
    pub max_participants: Option<u32>,
    /// `data:<mime>;base64,...`
    pub image: Option<String>,
}

/// A course as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub details: CourseDetails,
    pub status: CourseStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Effective capacity; unset or zero means the default.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.details
            .max_participants
            .filter(|&max| max > 0)
            .unwrap_or(DEFAULT_MAX_PARTICIPANTS)
    }

    /// Effective start time.
    #[must_use]
    pub fn start_time(&self) -> &str {
        self.details
            .start_time
            .as_deref()
            .filter(|time| !time.is_empty())
            .unwrap_or(DEFAULT_START_TIME)
    }
}

/// A course about to be created; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub details: CourseDetails,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
}

impl NewCourse {
    /// An active course created now.
    #[must_use]
    pub fn active(details: CourseDetails) -> Self {
        Self {
            details,
            status: CourseStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// A user's registration into a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub user_id: Email,
    pub enrolled_at: Option<DateTime<Utc>>,
}
