//! Store rows and their conversions to and from domain models.
//!
//! The hosted schema uses lowercase, concatenated column names
//! (`isadmin`, `maxparticipants`, `createdat`, ...). Each row type mirrors
//! one table with serde renames, and `From` impls translate between rows and
//! the domain models so the rename lives in exactly one place.

use aula_core::{CourseId, CourseStatus, Email};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{
    AuthorizedUser, ChatMessage, Course, CourseDetails, Enrollment, NOT_AVAILABLE, NewCourse,
    Registration,
};
use crate::store::{Row, StoreError};

/// Table names.
pub mod tables {
    pub const AUTHORIZED_EMAILS: &str = "authorized_emails";
    pub const COURSES: &str = "courses";
    pub const ENROLLMENTS: &str = "enrollments";
    pub const COURSE_MESSAGES: &str = "course_messages";
}

/// Column names used in filters and ordering.
pub mod columns {
    pub const EMAIL: &str = "email";
    pub const IS_ADMIN: &str = "isadmin";
    pub const ID: &str = "id";
    pub const CREATED_AT: &str = "createdat";
    pub const COURSE_ID: &str = "courseid";
    pub const USER_ID: &str = "userid";
    pub const TIMESTAMP: &str = "timestamp";
}

const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Row Types
// =============================================================================

/// `authorized_emails` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedEmailRow {
    pub email: Email,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "isadmin", default)]
    pub is_admin: Option<bool>,
    #[serde(rename = "addedat", default, deserialize_with = "lenient_timestamp")]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `courses` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CourseId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "starttime", default)]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub duration: Option<String>,
    #[serde(rename = "maxparticipants", default, deserialize_with = "lenient_count")]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "createdat", default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `enrollments` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRow {
    #[serde(rename = "courseid")]
    pub course_id: CourseId,
    #[serde(rename = "userid")]
    pub user_id: Email,
    #[serde(
        rename = "enrolledat",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// `course_messages` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMessageRow {
    #[serde(rename = "courseid")]
    pub course_id: CourseId,
    #[serde(rename = "useremail")]
    pub user_email: Email,
    #[serde(rename = "username", default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(deserialize_with = "required_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Partial `courses` update; only present fields are written.
///
/// Nested options distinguish "leave unchanged" (`None`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<String>>,
    #[serde(rename = "starttime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Option<String>>,
    #[serde(rename = "maxparticipants", skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
}

impl CourseUpdate {
    /// Change only the status.
    #[must_use]
    pub fn status(status: CourseStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Overwrite every editable field. The image is kept unless a new one is given.
    #[must_use]
    pub fn details(details: &CourseDetails) -> Self {
        Self {
            title: Some(details.title.clone()),
            description: Some(details.description.clone()),
            instructor: Some(details.instructor.clone()),
            location: Some(details.location.clone()),
            date: Some(details.date.map(format_date)),
            start_time: Some(details.start_time.clone()),
            duration: Some(details.duration.clone()),
            max_participants: Some(details.max_participants),
            image: details.image.clone().map(Some),
            status: None,
        }
    }

    /// Whether the update writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<AuthorizedEmailRow> for AuthorizedUser {
    fn from(row: AuthorizedEmailRow) -> Self {
        Self {
            email: row.email,
            name: row.name.unwrap_or_default(),
            company: or_not_available(row.company),
            role: or_not_available(row.role),
            is_admin: row.is_admin.unwrap_or(false),
            added_at: row.added_at,
            notes: row.notes,
        }
    }
}

impl From<&AuthorizedUser> for AuthorizedEmailRow {
    fn from(user: &AuthorizedUser) -> Self {
        Self {
            email: user.email.clone(),
            name: Some(user.name.clone()),
            company: Some(user.company.clone()),
            role: Some(user.role.clone()),
            is_admin: Some(user.is_admin),
            added_at: user.added_at,
            notes: user.notes.clone(),
        }
    }
}

impl From<&Registration> for AuthorizedEmailRow {
    fn from(registration: &Registration) -> Self {
        Self {
            email: registration.email.clone(),
            name: Some(registration.name.clone()),
            company: Some(registration.company.clone()),
            role: Some(registration.role.clone()),
            is_admin: Some(false),
            added_at: Some(Utc::now()),
            notes: None,
        }
    }
}

impl CourseRow {
    /// Convert to a domain course; rows without an id are not addressable.
    #[must_use]
    pub fn into_course(self) -> Option<Course> {
        let id = self.id?;
        let status = match self.status.as_deref() {
            None | Some("") => CourseStatus::Active,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(course_id = %id, status = raw, "Unknown course status, treating as active");
                CourseStatus::Active
            }),
        };

        Some(Course {
            id,
            details: CourseDetails {
                title: self.title.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                instructor: self.instructor.unwrap_or_default(),
                location: self.location.unwrap_or_default(),
                date: self.date.as_deref().and_then(parse_date),
                start_time: self.start_time.filter(|time| !time.is_empty()),
                duration: self.duration.filter(|duration| !duration.is_empty()),
                max_participants: self.max_participants,
                image: self.image.filter(|image| !image.is_empty()),
            },
            status,
            created_at: self.created_at,
        })
    }

    fn from_details(
        id: Option<CourseId>,
        details: &CourseDetails,
        status: CourseStatus,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            title: Some(details.title.clone()),
            description: Some(details.description.clone()),
            instructor: Some(details.instructor.clone()),
            location: Some(details.location.clone()),
            date: details.date.map(format_date),
            start_time: details.start_time.clone(),
            duration: details.duration.clone(),
            max_participants: details.max_participants,
            image: details.image.clone(),
            status: Some(status.as_str().to_string()),
            created_at,
        }
    }
}

impl From<&Course> for CourseRow {
    fn from(course: &Course) -> Self {
        Self::from_details(
            Some(course.id),
            &course.details,
            course.status,
            course.created_at,
        )
    }
}

impl From<&NewCourse> for CourseRow {
    fn from(course: &NewCourse) -> Self {
        Self::from_details(
            None,
            &course.details,
            course.status,
            Some(course.created_at),
        )
    }
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            course_id: row.course_id,
            user_id: row.user_id,
            enrolled_at: row.enrolled_at,
        }
    }
}

impl From<&Enrollment> for EnrollmentRow {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            course_id: enrollment.course_id,
            user_id: enrollment.user_id.clone(),
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

impl From<CourseMessageRow> for ChatMessage {
    fn from(row: CourseMessageRow) -> Self {
        Self {
            course_id: row.course_id,
            user_email: row.user_email,
            user_name: row.user_name.unwrap_or_default(),
            message: row.message.unwrap_or_default(),
            timestamp: row.timestamp,
        }
    }
}

impl From<&ChatMessage> for CourseMessageRow {
    fn from(message: &ChatMessage) -> Self {
        Self {
            course_id: message.course_id,
            user_email: message.user_email.clone(),
            user_name: Some(message.user_name.clone()),
            message: Some(message.message.clone()),
            timestamp: message.timestamp,
        }
    }
}

// =============================================================================
// Row Encoding
// =============================================================================

/// Encode a row type as a store row.
///
/// # Errors
///
/// Returns an error if the value does not serialize to a JSON object.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

/// Decode store rows, logging and skipping the ones that do not fit.
pub fn from_rows<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(Value::Object(row)) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::error!(table, error = %e, "Skipping undecodable row");
                None
            }
        })
        .collect()
}

// =============================================================================
// Field Helpers
// =============================================================================

fn or_not_available(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), DATE_FORMAT).ok()
}

/// Parse the timestamp formats the store emits (`timestamptz` and `timestamp`).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z")
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .ok()
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .ok()
        })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn required_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    fn decode<T: DeserializeOwned>(value: &Value) -> T {
        serde_json::from_value(value.clone()).unwrap()
    }

    #[test]
    fn test_authorized_user_round_trip() {
        let user = AuthorizedUser {
            email: email("anna@example.com"),
            name: "Anna Verdi".to_string(),
            company: "Acme".to_string(),
            role: "Tecnico".to_string(),
            is_admin: true,
            added_at: Some(Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap()),
            notes: Some("referente".to_string()),
        };

        let row = to_row(&AuthorizedEmailRow::from(&user)).unwrap();
        assert_eq!(row["isadmin"], json!(true));
        assert!(row.contains_key("addedat"));
        assert!(!row.contains_key("is_admin"));

        let back: AuthorizedEmailRow = from_rows("authorized_emails", vec![row])
            .into_iter()
            .next()
            .unwrap();
        assert_eq!(AuthorizedUser::from(back), user);
    }

    #[test]
    fn test_authorized_user_missing_profile_reads_not_available() {
        let row: AuthorizedEmailRow = decode(&json!({
            "email": "luca@example.com",
            "name": "Luca",
            "company": "",
            "role": null
        }));
        let user = AuthorizedUser::from(row);

        assert_eq!(user.company, "N/A");
        assert_eq!(user.role, "N/A");
        assert!(!user.is_admin);
        assert!(user.added_at.is_none());
    }

    #[test]
    fn test_registration_row_is_never_admin() {
        let registration = Registration {
            email: email("nuovo@example.com"),
            name: "Nuovo".to_string(),
            company: "Beta".to_string(),
            role: "Analista".to_string(),
        };
        let row = AuthorizedEmailRow::from(&registration);
        assert_eq!(row.is_admin, Some(false));
        assert!(row.added_at.is_some());
    }

    #[test]
    fn test_course_round_trip() {
        let course = Course {
            id: CourseId::new(12),
            details: CourseDetails {
                title: "SICUREZZA".to_string(),
                description: "CORSO BASE".to_string(),
                instructor: "ROSSI".to_string(),
                location: "AULA 2".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 6, 3),
                start_time: Some("14:00".to_string()),
                duration: Some("4".to_string()),
                max_participants: Some(12),
                image: Some("data:image/png;base64,AAAA".to_string()),
            },
            status: CourseStatus::Completed,
            created_at: Some(Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap()),
        };

        let row = to_row(&CourseRow::from(&course)).unwrap();
        assert_eq!(row["starttime"], json!("14:00"));
        assert_eq!(row["maxparticipants"], json!(12));
        assert_eq!(row["date"], json!("2025-06-03"));
        assert_eq!(row["status"], json!("completed"));
        assert!(row.contains_key("createdat"));

        let back: Vec<CourseRow> = from_rows("courses", vec![row]);
        let back = back.into_iter().next().unwrap().into_course().unwrap();
        assert_eq!(back, course);
    }

    #[test]
    fn test_new_course_row_omits_id() {
        let course = NewCourse::active(CourseDetails::default());
        let row = to_row(&CourseRow::from(&course)).unwrap();
        assert!(!row.contains_key("id"));
        assert_eq!(row["status"], json!("active"));
    }

    #[test]
    fn test_course_row_tolerates_hosted_shapes() {
        let row: CourseRow = decode(&json!({
            "id": 3,
            "title": "Primo soccorso",
            "duration": 8,
            "maxparticipants": "15",
            "date": "",
            "starttime": null,
            "createdat": "2025-02-01T10:00:00.123456+00:00"
        }));
        let course = row.into_course().unwrap();

        assert_eq!(course.status, CourseStatus::Active);
        assert_eq!(course.details.duration.as_deref(), Some("8"));
        assert_eq!(course.details.max_participants, Some(15));
        assert!(course.details.date.is_none());
        assert_eq!(course.start_time(), "09:00");
        assert!(course.created_at.is_some());
    }

    #[test]
    fn test_course_row_without_id_is_skipped() {
        let row: CourseRow = decode(&json!({"title": "Orfano"}));
        assert!(row.into_course().is_none());
    }

    #[test]
    fn test_enrollment_round_trip_and_default_timestamp() {
        let enrollment = Enrollment {
            course_id: CourseId::new(2),
            user_id: email("anna@example.com"),
            enrolled_at: None,
        };
        let row = to_row(&EnrollmentRow::from(&enrollment)).unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row["courseid"], json!(2));
        assert_eq!(row["userid"], json!("anna@example.com"));

        let back: Vec<EnrollmentRow> = from_rows("enrollments", vec![row]);
        assert_eq!(Enrollment::from(back.into_iter().next().unwrap()), enrollment);
    }

    #[test]
    fn test_chat_message_round_trip() {
        let message = ChatMessage {
            course_id: CourseId::new(5),
            user_email: email("anna@example.com"),
            user_name: "Anna".to_string(),
            message: "Ciao a tutti".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        };
        let row = to_row(&CourseMessageRow::from(&message)).unwrap();
        assert_eq!(row["useremail"], json!("anna@example.com"));
        assert_eq!(row["username"], json!("Anna"));

        let back: Vec<CourseMessageRow> = from_rows("course_messages", vec![row]);
        assert_eq!(ChatMessage::from(back.into_iter().next().unwrap()), message);
    }

    #[test]
    fn test_from_rows_skips_bad_rows() {
        let rows = vec![
            json!({"courseid": 1, "useremail": "a@b.c", "timestamp": "not a time"}),
            json!({"courseid": 1, "useremail": "a@b.c", "timestamp": "2025-03-01T10:00:00Z"}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let decoded: Vec<CourseMessageRow> = from_rows("course_messages", rows);
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T11:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 10:00:00+00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_course_update_status_only() {
        let row = to_row(&CourseUpdate::status(CourseStatus::Completed)).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row["status"], json!("completed"));
    }

    #[test]
    fn test_course_update_details_keeps_image_and_status() {
        let details = CourseDetails {
            title: "NUOVO".to_string(),
            date: None,
            max_participants: None,
            ..CourseDetails::default()
        };
        let row = to_row(&CourseUpdate::details(&details)).unwrap();

        assert_eq!(row["title"], json!("NUOVO"));
        assert_eq!(row["date"], Value::Null);
        assert_eq!(row["maxparticipants"], Value::Null);
        assert!(!row.contains_key("image"));
        assert!(!row.contains_key("status"));
        assert!(CourseUpdate::default().is_empty());
    }
}
