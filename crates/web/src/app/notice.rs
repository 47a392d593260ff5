//! User-facing notices.
//!
//! Every outcome the UI reports after a redirect is a [`Notice`]. Its code
//! travels in the `notice` query parameter and is resolved back into the
//! localized message (and optional cue) on the next page.

use super::cues::Cue;

/// How a notice is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notice-success",
            Self::Error => "notice-error",
        }
    }
}

/// Outcome reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Registered,
    AccountNotFound,
    LoginFailed,
    AlreadyRegistered,
    RegistrationFailed,
    InvalidEmail,
    CourseFull,
    Enrolled,
    AlreadyEnrolled,
    Unenrolled,
    CourseTerminated,
    CourseRestored,
    TerminateFailed,
    RestoreFailed,
    CourseSaved,
    CourseSaveFailed,
    ChatCleared,
    EmailAlreadyRegistered,
}

impl Notice {
    const ALL: [Self; 18] = [
        Self::Registered,
        Self::AccountNotFound,
        Self::LoginFailed,
        Self::AlreadyRegistered,
        Self::RegistrationFailed,
        Self::InvalidEmail,
        Self::CourseFull,
        Self::Enrolled,
        Self::AlreadyEnrolled,
        Self::Unenrolled,
        Self::CourseTerminated,
        Self::CourseRestored,
        Self::TerminateFailed,
        Self::RestoreFailed,
        Self::CourseSaved,
        Self::CourseSaveFailed,
        Self::ChatCleared,
        Self::EmailAlreadyRegistered,
    ];

    /// Stable code used in redirects.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::AccountNotFound => "account_not_found",
            Self::LoginFailed => "login_failed",
            Self::AlreadyRegistered => "already_registered",
            Self::RegistrationFailed => "registration_failed",
            Self::InvalidEmail => "invalid_email",
            Self::CourseFull => "course_full",
            Self::Enrolled => "enrolled",
            Self::AlreadyEnrolled => "already_enrolled",
            Self::Unenrolled => "unenrolled",
            Self::CourseTerminated => "course_terminated",
            Self::CourseRestored => "course_restored",
            Self::TerminateFailed => "terminate_failed",
            Self::RestoreFailed => "restore_failed",
            Self::CourseSaved => "course_saved",
            Self::CourseSaveFailed => "course_save_failed",
            Self::ChatCleared => "chat_cleared",
            Self::EmailAlreadyRegistered => "email_already_registered",
        }
    }

    /// Resolve a code; unknown codes are ignored.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code)
    }

    /// Message shown to the user. Enroll and unenroll only play a cue.
    #[must_use]
    pub const fn message(self) -> Option<&'static str> {
        Some(match self {
            Self::Registered => "Registrazione completata con successo!",
            Self::AccountNotFound => "Account non trovato. Per favore registrati.",
            Self::LoginFailed => "Errore durante l'accesso. Riprova.",
            Self::AlreadyRegistered => "Questa email è già registrata. Accedi.",
            Self::RegistrationFailed => "Errore durante la registrazione. Riprova.",
            Self::InvalidEmail => "Indirizzo email non valido.",
            Self::CourseFull => {
                "Spiacente, il corso ha raggiunto il numero massimo di partecipanti."
            }
            Self::Enrolled | Self::AlreadyEnrolled | Self::Unenrolled => return None,
            Self::CourseTerminated => "Corso terminato con successo.",
            Self::CourseRestored => "Corso ripristinato con successo.",
            Self::TerminateFailed => "Errore durante la terminazione del corso.",
            Self::RestoreFailed => "Errore durante il ripristino del corso.",
            Self::CourseSaved => "Corso salvato con successo.",
            Self::CourseSaveFailed => "Errore durante il salvataggio del corso.",
            Self::ChatCleared => "Chat pulita con successo.",
            Self::EmailAlreadyRegistered => "Questa email è già registrata",
        })
    }

    #[must_use]
    pub const fn level(self) -> NoticeLevel {
        match self {
            Self::AccountNotFound
            | Self::LoginFailed
            | Self::AlreadyRegistered
            | Self::RegistrationFailed
            | Self::InvalidEmail
            | Self::CourseFull
            | Self::TerminateFailed
            | Self::RestoreFailed
            | Self::CourseSaveFailed
            | Self::EmailAlreadyRegistered => NoticeLevel::Error,
            Self::Registered
            | Self::Enrolled
            | Self::AlreadyEnrolled
            | Self::Unenrolled
            | Self::CourseTerminated
            | Self::CourseRestored
            | Self::CourseSaved
            | Self::ChatCleared => NoticeLevel::Success,
        }
    }

    /// Cue played alongside the notice.
    #[must_use]
    pub const fn cue(self) -> Option<Cue> {
        match self {
            Self::Enrolled | Self::CourseRestored => Some(Cue::Enroll),
            Self::Unenrolled | Self::CourseTerminated => Some(Cue::Unenroll),
            _ => None,
        }
    }

    /// `path?notice=code`
    #[must_use]
    pub fn redirect_path(self, path: &str) -> String {
        format!("{path}?notice={}", self.code())
    }
}
