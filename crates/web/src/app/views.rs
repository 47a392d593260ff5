//! Display data for templates.
//!
//! Views carry ready-to-print strings and flags so templates stay free of
//! business rules.

use aula_core::{CourseId, CourseStatus, Email};
use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::models::{AuthorizedUser, ChatMessage, Course, Enrollment};

/// Fallback title for untitled courses.
pub const UNTITLED_COURSE: &str = "Corso senza titolo";

/// Fallback for missing instructor or location.
pub const NOT_SPECIFIED: &str = "Non specificato";

/// Shown for participants missing from the allowlist.
pub const UNKNOWN_USER: &str = "Utente sconosciuto";

/// Shown when a course has no date.
pub const DATE_TBD: &str = "Data da definire";

/// `dd/mm/yyyy`, or "Data da definire".
#[must_use]
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(
        || DATE_TBD.to_string(),
        |date| date.format("%d/%m/%Y").to_string(),
    )
}

/// `dd/mm/yy, HH:MM` in the server's local time.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%d/%m/%y, %H:%M")
        .to_string()
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn spots_class(has_spots: bool) -> &'static str {
    if has_spots {
        "spots-available"
    } else {
        "spots-full"
    }
}

// =============================================================================
// Course List
// =============================================================================

/// A course card in the list.
#[derive(Debug, Clone)]
pub struct CourseCard {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub location: String,
    pub date: String,
    pub start_time: String,
    pub image: Option<String>,
    pub enrolled: usize,
    pub capacity: u32,
    pub has_spots: bool,
}

impl CourseCard {
    #[must_use]
    pub fn new(course: &Course, enrolled: usize) -> Self {
        let capacity = course.capacity();
        Self {
            id: course.id,
            title: or_default(&course.details.title, UNTITLED_COURSE),
            description: course.details.description.clone(),
            instructor: or_default(&course.details.instructor, NOT_SPECIFIED),
            location: or_default(&course.details.location, NOT_SPECIFIED),
            date: format_date(course.details.date),
            start_time: course.start_time().to_string(),
            image: course.details.image.clone(),
            enrolled,
            capacity,
            has_spots: enrolled < capacity as usize,
        }
    }

    #[must_use]
    pub fn spots_class(&self) -> &'static str {
        spots_class(self.has_spots)
    }
}

/// The course list, either active courses or the archive.
#[derive(Debug, Clone)]
pub struct CourseListView {
    pub cards: Vec<CourseCard>,
    pub showing_archive: bool,
}

impl CourseListView {
    /// Cards for the courses on the selected side of the archive toggle.
    #[must_use]
    pub fn new(courses: &[Course], enrollments: &[Enrollment], showing_archive: bool) -> Self {
        let cards = courses
            .iter()
            .filter(|course| course.status.is_archived() == showing_archive)
            .map(|course| CourseCard::new(course, count_enrolled(enrollments, course.id)))
            .collect();

        Self {
            cards,
            showing_archive,
        }
    }

    #[must_use]
    pub const fn toggle_label(&self) -> &'static str {
        if self.showing_archive {
            "❌ Chiudi Archivio"
        } else {
            "📂 Archivio Corsi Terminati"
        }
    }

    #[must_use]
    pub const fn empty_message(&self) -> &'static str {
        if self.showing_archive {
            "Nessun corso terminato"
        } else {
            "Nessun corso disponibile"
        }
    }
}

fn count_enrolled(enrollments: &[Enrollment], course_id: CourseId) -> usize {
    enrollments
        .iter()
        .filter(|enrollment| enrollment.course_id == course_id)
        .count()
}

// =============================================================================
// Course Detail
// =============================================================================

/// An enrolled participant.
#[derive(Debug, Clone)]
pub struct ParticipantView {
    pub email: String,
    pub name: String,
}

/// The course detail page.
#[derive(Debug, Clone)]
pub struct CourseDetailView {
    pub card: CourseCard,
    pub duration: String,
    pub status: CourseStatus,
    pub participants: Vec<ParticipantView>,
    pub is_admin: bool,
    pub is_enrolled: bool,
    pub chat: Option<ChatView>,
}

impl CourseDetailView {
    /// Build the page for `viewer`; `users` resolves participant names.
    #[must_use]
    pub fn new(
        course: &Course,
        enrollments: &[Enrollment],
        users: &[AuthorizedUser],
        viewer: &AuthorizedUser,
    ) -> Self {
        let participants: Vec<ParticipantView> = enrollments
            .iter()
            .map(|enrollment| ParticipantView {
                email: enrollment.user_id.to_string(),
                name: users
                    .iter()
                    .find(|user| user.email == enrollment.user_id)
                    .map_or_else(|| UNKNOWN_USER.to_string(), |user| user.name.clone()),
            })
            .collect();

        Self {
            card: CourseCard::new(course, participants.len()),
            duration: course
                .details
                .duration
                .as_deref()
                .map_or_else(|| NOT_SPECIFIED.to_string(), |hours| format!("{hours} ore")),
            status: course.status,
            is_enrolled: enrollments
                .iter()
                .any(|enrollment| enrollment.user_id == viewer.email),
            participants,
            is_admin: viewer.is_admin,
            chat: None,
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.status.is_archived()
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        !self.card.has_spots
    }

    /// Enrolled users and admins see the chat.
    #[must_use]
    pub const fn can_chat(&self) -> bool {
        self.is_enrolled || self.is_admin
    }

    /// `n/max posti occupati (k disponibili)` or `(Completo)`.
    #[must_use]
    pub fn availability(&self) -> String {
        let card = &self.card;
        let occupied = format!("{}/{} posti occupati", card.enrolled, card.capacity);
        if card.has_spots {
            let available = (card.capacity as usize).saturating_sub(card.enrolled);
            format!("{occupied} ({available} disponibili)")
        } else {
            format!("{occupied} (Completo)")
        }
    }
}

// =============================================================================
// Chat
// =============================================================================

/// One rendered chat message.
#[derive(Debug, Clone)]
pub struct ChatMessageView {
    pub user_name: String,
    pub message: String,
    pub time: String,
    pub own: bool,
}

/// The chat message list, optionally with a notification to raise.
#[derive(Debug, Clone)]
pub struct ChatView {
    pub course_id: CourseId,
    pub messages: Vec<ChatMessageView>,
    pub can_clear: bool,
    /// JSON payload for the page script.
    pub notification: Option<String>,
}

impl ChatView {
    #[must_use]
    pub fn new(course_id: CourseId, messages: &[ChatMessage], viewer: &AuthorizedUser) -> Self {
        Self {
            course_id,
            messages: messages
                .iter()
                .map(|message| ChatMessageView {
                    user_name: message.user_name.clone(),
                    message: message.message.clone(),
                    time: format_timestamp(message.timestamp),
                    own: message.user_email == viewer.email,
                })
                .collect(),
            can_clear: viewer.is_admin,
            notification: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// =============================================================================
// Course Form
// =============================================================================

/// The add/edit course form.
#[derive(Debug, Clone)]
pub struct CourseFormView {
    pub course_id: Option<CourseId>,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub location: String,
    /// `YYYY-MM-DD` for the date input.
    pub date: String,
    pub start_time: String,
    pub duration: String,
    pub max_participants: String,
    pub image: Option<String>,
}

impl CourseFormView {
    /// An empty form for a new course.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            course_id: None,
            title: String::new(),
            description: String::new(),
            instructor: String::new(),
            location: String::new(),
            date: String::new(),
            start_time: crate::models::DEFAULT_START_TIME.to_string(),
            duration: String::new(),
            max_participants: String::new(),
            image: None,
        }
    }

    /// A form prefilled from `course`.
    #[must_use]
    pub fn edit(course: &Course) -> Self {
        let details = &course.details;
        Self {
            course_id: Some(course.id),
            title: details.title.clone(),
            description: details.description.clone(),
            instructor: details.instructor.clone(),
            location: details.location.clone(),
            date: details
                .date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            start_time: course.start_time().to_string(),
            duration: details.duration.clone().unwrap_or_default(),
            max_participants: details
                .max_participants
                .map(|max| max.to_string())
                .unwrap_or_default(),
            image: details.image.clone(),
        }
    }

    #[must_use]
    pub const fn heading(&self) -> &'static str {
        if self.course_id.is_some() {
            "Modifica Corso"
        } else {
            "Aggiungi Corso"
        }
    }

    /// Where the form posts.
    #[must_use]
    pub fn action(&self) -> String {
        self.course_id
            .map_or_else(|| "/courses".to_string(), |id| format!("/courses/{id}"))
    }
}

// =============================================================================
// Users
// =============================================================================

/// An allowlist entry on the management page.
#[derive(Debug, Clone)]
pub struct UserView {
    pub email: Email,
    pub name: String,
    pub company: String,
    pub role: String,
    pub notes: Option<String>,
    pub is_admin: bool,
}

impl From<&AuthorizedUser> for UserView {
    fn from(user: &AuthorizedUser) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            company: user.company.clone(),
            role: user.role.clone(),
            notes: user.notes.clone().filter(|notes| !notes.trim().is_empty()),
            is_admin: user.is_admin,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CourseDetails;

    fn user(address: &str, name: &str, is_admin: bool) -> AuthorizedUser {
        let mut user = AuthorizedUser::new(
            Email::parse(address).unwrap(),
            name.to_string(),
            "Acme".to_string(),
            "Tecnico".to_string(),
        );
        user.is_admin = is_admin;
        user
    }

    fn course(id: i64, status: CourseStatus, max: Option<u32>) -> Course {
        Course {
            id: CourseId::new(id),
            details: CourseDetails {
                title: format!("CORSO {id}"),
                max_participants: max,
                ..CourseDetails::default()
            },
            status,
            created_at: None,
        }
    }

    fn enrollment(course_id: i64, address: &str) -> Enrollment {
        Enrollment {
            course_id: CourseId::new(course_id),
            user_id: Email::parse(address).unwrap(),
            enrolled_at: None,
        }
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(None), "Data da definire");
        assert_eq!(
            format_date(NaiveDate::from_ymd_opt(2025, 3, 7)),
            "07/03/2025"
        );
    }

    #[test]
    fn test_archive_toggle_partitions_courses() {
        let courses = vec![
            course(1, CourseStatus::Active, None),
            course(2, CourseStatus::Completed, None),
            course(3, CourseStatus::Active, None),
        ];

        let active = CourseListView::new(&courses, &[], false);
        let archive = CourseListView::new(&courses, &[], true);

        let active_ids: Vec<_> = active.cards.iter().map(|c| c.id.as_i64()).collect();
        let archive_ids: Vec<_> = archive.cards.iter().map(|c| c.id.as_i64()).collect();
        assert_eq!(active_ids, [1, 3]);
        assert_eq!(archive_ids, [2]);

        assert_eq!(active.toggle_label(), "📂 Archivio Corsi Terminati");
        assert_eq!(archive.toggle_label(), "❌ Chiudi Archivio");
        assert_eq!(
            CourseListView::new(&[], &[], true).empty_message(),
            "Nessun corso terminato"
        );
    }

    #[test]
    fn test_card_defaults_and_spots() {
        let mut untitled = course(4, CourseStatus::Active, Some(1));
        untitled.details.title = String::new();
        let card = CourseCard::new(&untitled, 1);

        assert_eq!(card.title, "Corso senza titolo");
        assert_eq!(card.instructor, "Non specificato");
        assert_eq!(card.date, "Data da definire");
        assert_eq!(card.start_time, "09:00");
        assert_eq!(card.spots_class(), "spots-full");
        assert_eq!(CourseCard::new(&untitled, 0).spots_class(), "spots-available");
    }

    #[test]
    fn test_detail_participants_and_availability() {
        let anna = user("anna@example.com", "Anna", false);
        let enrollments = vec![
            enrollment(1, "anna@example.com"),
            enrollment(1, "ghost@example.com"),
        ];

        let detail = CourseDetailView::new(
            &course(1, CourseStatus::Active, Some(5)),
            &enrollments,
            std::slice::from_ref(&anna),
            &anna,
        );

        let names: Vec<_> = detail.participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Anna", "Utente sconosciuto"]);
        assert!(detail.is_enrolled);
        assert!(detail.can_chat());
        assert_eq!(detail.availability(), "2/5 posti occupati (3 disponibili)");
        assert_eq!(detail.duration, "Non specificato");
    }

    #[test]
    fn test_detail_full_course() {
        let luca = user("luca@example.com", "Luca", false);
        let detail = CourseDetailView::new(
            &course(1, CourseStatus::Active, Some(1)),
            &[enrollment(1, "anna@example.com")],
            &[],
            &luca,
        );

        assert!(detail.is_full());
        assert!(!detail.is_enrolled);
        assert!(!detail.can_chat());
        assert_eq!(detail.availability(), "1/1 posti occupati (Completo)");
    }

    #[test]
    fn test_chat_view_flags_own_messages() {
        let anna = user("anna@example.com", "Anna", true);
        let messages = vec![ChatMessage::from_user(
            CourseId::new(1),
            &anna,
            "<b>ciao</b>".to_string(),
        )];

        let chat = ChatView::new(CourseId::new(1), &messages, &anna);
        assert!(chat.messages[0].own);
        assert!(chat.can_clear);
        assert_eq!(chat.messages[0].message, "<b>ciao</b>");
    }

    #[test]
    fn test_course_form_views() {
        let blank = CourseFormView::blank();
        assert_eq!(blank.heading(), "Aggiungi Corso");
        assert_eq!(blank.start_time, "09:00");
        assert_eq!(blank.action(), "/courses");

        let mut existing = course(9, CourseStatus::Active, Some(12));
        existing.details.date = NaiveDate::from_ymd_opt(2025, 10, 1);
        let edit = CourseFormView::edit(&existing);
        assert_eq!(edit.heading(), "Modifica Corso");
        assert_eq!(edit.date, "2025-10-01");
        assert_eq!(edit.max_participants, "12");
        assert_eq!(edit.action(), "/courses/9");
    }
}
