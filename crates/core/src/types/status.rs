//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a course.
///
/// Courses start `Active`; terminating one moves it to `Completed`, where it
/// only shows up in the archive view. A course stored without a status is
/// treated as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Active,
    Completed,
}

impl CourseStatus {
    /// Whether the course belongs to the archive (terminated courses).
    #[must_use]
    pub const fn is_archived(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The store's textual representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid course status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_active() {
        assert_eq!(CourseStatus::default(), CourseStatus::Active);
        assert!(!CourseStatus::Active.is_archived());
        assert!(CourseStatus::Completed.is_archived());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&CourseStatus::Completed).unwrap(),
            "\"completed\""
        );
        let parsed: CourseStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(parsed, CourseStatus::Active);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "completed".parse::<CourseStatus>().unwrap(),
            CourseStatus::Completed
        );
        assert!("archived".parse::<CourseStatus>().is_err());
    }
}
