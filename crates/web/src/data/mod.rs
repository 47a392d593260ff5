//! Data access for the allowlist, courses, enrollments and chat.
//!
//! `DataManager` translates between domain models and store rows and applies
//! each operation's failure policy. Reads that fail are logged and yield an
//! empty collection so a page still renders; writes whose outcome the UI
//! reports return their error instead.

mod rows;

use aula_core::{CourseId, Email};
use tracing::instrument;

pub use rows::{
    AuthorizedEmailRow, CourseMessageRow, CourseRow, CourseUpdate, EnrollmentRow, columns,
    from_rows, tables, to_row,
};

use crate::models::{AuthorizedUser, ChatMessage, Course, Enrollment, Registration};
use crate::store::{Order, Query, RemoteStore, Row, StoreError};

/// Domain-level access to the remote store.
#[derive(Debug, Clone)]
pub struct DataManager {
    store: RemoteStore,
}

impl DataManager {
    #[must_use]
    pub const fn new(store: RemoteStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &RemoteStore {
        &self.store
    }

    // =========================================================================
    // Allowlist
    // =========================================================================

    /// All allowlisted users.
    #[instrument(skip(self))]
    pub async fn authorized_users(&self) -> Vec<AuthorizedUser> {
        self.select::<AuthorizedEmailRow>(&Query::table(tables::AUTHORIZED_EMAILS))
            .await
            .into_iter()
            .map(AuthorizedUser::from)
            .collect()
    }

    /// Look up one allowlisted user.
    pub async fn find_user(&self, email: &Email) -> Option<AuthorizedUser> {
        self.authorized_users()
            .await
            .into_iter()
            .find(|user| &user.email == email)
    }

    /// Resolve the session's email to an allowlisted user.
    pub async fn current_user(&self, session_email: Option<&Email>) -> Option<AuthorizedUser> {
        match session_email {
            Some(email) => self.find_user(email).await,
            None => None,
        }
    }

    /// Upsert allowlist entries by email.
    #[instrument(skip(self, users), fields(count = users.len()))]
    pub async fn save_authorized_users(&self, users: &[AuthorizedUser]) {
        let result = encode(users.iter().map(AuthorizedEmailRow::from));
        let result = match result {
            Ok(rows) => self.store.upsert(tables::AUTHORIZED_EMAILS, rows).await,
            Err(e) => Err(e),
        };
        log_failure("save authorized users", result);
    }

    /// Add a self-registered, non-admin user.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including when the email
    /// already exists.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register_user(&self, registration: &Registration) -> Result<(), StoreError> {
        let row = to_row(&AuthorizedEmailRow::from(registration))?;
        self.store.insert(tables::AUTHORIZED_EMAILS, vec![row]).await
    }

    /// Grant or revoke the admin flag of one allowlisted user.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn set_admin(&self, email: &Email, is_admin: bool) -> Result<(), StoreError> {
        let query = Query::table(tables::AUTHORIZED_EMAILS).eq(columns::EMAIL, email.as_str());
        let mut patch = Row::new();
        patch.insert(columns::IS_ADMIN.to_string(), is_admin.into());
        self.store.update(&query, patch).await
    }

    /// Remove an email from the allowlist.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn delete_authorized_user(&self, email: &Email) {
        let query = Query::table(tables::AUTHORIZED_EMAILS).eq(columns::EMAIL, email.as_str());
        log_failure("delete authorized user", self.store.delete(&query).await);
    }

    // =========================================================================
    // Courses
    // =========================================================================

    /// All courses, newest first.
    #[instrument(skip(self))]
    pub async fn courses(&self) -> Vec<Course> {
        let query =
            Query::table(tables::COURSES).order(columns::CREATED_AT, Order::Descending);
        self.select::<CourseRow>(&query)
            .await
            .into_iter()
            .filter_map(CourseRow::into_course)
            .collect()
    }

    /// One course by id.
    pub async fn course(&self, id: CourseId) -> Option<Course> {
        self.courses().await.into_iter().find(|course| course.id == id)
    }

    /// Upsert courses. New courses (without an id) get one from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    #[instrument(skip(self, courses), fields(count = courses.len()))]
    pub async fn save_courses<C>(&self, courses: &[C]) -> Result<(), StoreError>
    where
        for<'a> CourseRow: From<&'a C>,
    {
        let rows = encode(courses.iter().map(CourseRow::from))?;
        self.store.upsert(tables::COURSES, rows).await
    }

    /// Apply a partial update to one course.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    #[instrument(skip(self, update), fields(course_id = %id))]
    pub async fn update_course(&self, id: CourseId, update: &CourseUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }
        let query = Query::table(tables::COURSES).eq(columns::ID, id.as_i64());
        self.store.update(&query, to_row(update)?).await
    }

    /// Delete one course.
    #[instrument(skip(self), fields(course_id = %id))]
    pub async fn delete_course(&self, id: CourseId) {
        let query = Query::table(tables::COURSES).eq(columns::ID, id.as_i64());
        log_failure("delete course", self.store.delete(&query).await);
    }

    // =========================================================================
    // Enrollments
    // =========================================================================

    /// All enrollments.
    #[instrument(skip(self))]
    pub async fn enrollments(&self) -> Vec<Enrollment> {
        self.select::<EnrollmentRow>(&Query::table(tables::ENROLLMENTS))
            .await
            .into_iter()
            .map(Enrollment::from)
            .collect()
    }

    /// Enrollments for one course.
    pub async fn course_enrollments(&self, course_id: CourseId) -> Vec<Enrollment> {
        let mut enrollments = self.enrollments().await;
        enrollments.retain(|enrollment| enrollment.course_id == course_id);
        enrollments
    }

    /// Upsert enrollments by `(courseid, userid)`.
    #[instrument(skip(self, enrollments), fields(count = enrollments.len()))]
    pub async fn save_enrollments(&self, enrollments: &[Enrollment]) {
        let result = match encode(enrollments.iter().map(EnrollmentRow::from)) {
            Ok(rows) => self.store.upsert(tables::ENROLLMENTS, rows).await,
            Err(e) => Err(e),
        };
        log_failure("save enrollments", result);
    }

    /// Enroll a user; the store stamps `enrolledat`.
    #[instrument(skip(self), fields(course_id = %course_id, user = %user))]
    pub async fn enroll_user(&self, course_id: CourseId, user: &Email) {
        let row = EnrollmentRow {
            course_id,
            user_id: user.clone(),
            enrolled_at: None,
        };
        let result = match to_row(&row) {
            Ok(row) => self.store.insert(tables::ENROLLMENTS, vec![row]).await,
            Err(e) => Err(e),
        };
        log_failure("enroll user", result);
    }

    /// Remove a user's enrollment.
    #[instrument(skip(self), fields(course_id = %course_id, user = %user))]
    pub async fn unenroll_user(&self, course_id: CourseId, user: &Email) {
        let query = Query::table(tables::ENROLLMENTS)
            .eq(columns::COURSE_ID, course_id.as_i64())
            .eq(columns::USER_ID, user.as_str());
        log_failure("unenroll user", self.store.delete(&query).await);
    }

    // =========================================================================
    // Chat
    // =========================================================================

    /// Messages for one course, oldest first.
    #[instrument(skip(self), fields(course_id = %course_id))]
    pub async fn course_messages(&self, course_id: CourseId) -> Vec<ChatMessage> {
        let query = Query::table(tables::COURSE_MESSAGES)
            .eq(columns::COURSE_ID, course_id.as_i64())
            .order(columns::TIMESTAMP, Order::Ascending);
        self.select::<CourseMessageRow>(&query)
            .await
            .into_iter()
            .map(ChatMessage::from)
            .collect()
    }

    /// Append a chat message.
    #[instrument(skip(self, message), fields(course_id = %message.course_id))]
    pub async fn save_course_message(&self, message: &ChatMessage) {
        let result = match to_row(&CourseMessageRow::from(message)) {
            Ok(row) => self.store.insert(tables::COURSE_MESSAGES, vec![row]).await,
            Err(e) => Err(e),
        };
        log_failure("save course message", result);
    }

    /// Delete every message of one course.
    #[instrument(skip(self), fields(course_id = %course_id))]
    pub async fn delete_all_course_messages(&self, course_id: CourseId) {
        let query =
            Query::table(tables::COURSE_MESSAGES).eq(columns::COURSE_ID, course_id.as_i64());
        log_failure("delete course messages", self.store.delete(&query).await);
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn select<T: serde::de::DeserializeOwned>(&self, query: &Query) -> Vec<T> {
        match self.store.select(query).await {
            Ok(rows) => from_rows(query.table_name(), rows),
            Err(e) => {
                tracing::error!(table = query.table_name(), error = %e, "Failed to load rows");
                Vec::new()
            }
        }
    }
}

fn encode<T: serde::Serialize>(rows: impl Iterator<Item = T>) -> Result<Vec<Row>, StoreError> {
    rows.map(|row| to_row(&row)).collect()
}

fn log_failure(operation: &str, result: Result<(), StoreError>) {
    if let Err(e) = result {
        tracing::error!(operation, error = %e, "Store write failed");
    }
}
