//! Allowlisted users.

use aula_core::Email;
use chrono::{DateTime, Utc};

/// Placeholder shown for profile fields left empty in the store.
pub const NOT_AVAILABLE: &str = "N/A";

/// A user on the email allowlist.
///
/// The allowlist doubles as the profile store: every field shown next to a
/// participant or chat message comes from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedUser {
    pub email: Email,
    pub name: String,
    pub company: String,
    pub role: String,
    pub is_admin: bool,
    pub added_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl AuthorizedUser {
    /// A regular (non-admin) user added now.
    #[must_use]
    pub fn new(email: Email, name: String, company: String, role: String) -> Self {
        Self {
            email,
            name,
            company,
            role,
            is_admin: false,
            added_at: Some(Utc::now()),
            notes: None,
        }
    }
}

/// Self-registration data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: Email,
    pub name: String,
    pub company: String,
    pub role: String,
}
