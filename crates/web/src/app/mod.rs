//! Course enrollment and chat behaviour.
//!
//! [`CourseApp`] is built per request from the data manager, the signed-in
//! user and the session's [`UiState`]. Its operations read fresh data on every
//! call (there is no cache) and return views or [`Notice`]s for the route
//! handlers to render.

mod chat;
mod cues;
mod notice;
mod views;

use aula_core::{CourseId, CourseStatus, Email};
use tracing::instrument;

pub use chat::{ChatWatch, MessageNotification};
pub use cues::{Cue, TONE_FLOOR, TONE_GAIN, Tone};
pub use notice::{Notice, NoticeLevel};
pub use views::{
    ChatMessageView, ChatView, CourseCard, CourseDetailView, CourseFormView, CourseListView,
    ParticipantView, UserView, format_date, format_timestamp,
};

use crate::data::{CourseUpdate, DataManager};
use crate::models::{AuthorizedUser, ChatMessage, CourseDetails, NewCourse, Registration, UiState};

/// Result of a login or registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The user may be stored in the session.
    LoggedIn(AuthorizedUser),
    /// Re-show the form with this notice.
    Rejected(Notice),
    /// Required fields were blank; re-show the form.
    Incomplete,
}

/// Raw registration fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub email: String,
    pub name: String,
    pub company: String,
    pub role: String,
}

/// Raw allowlist entry as submitted by an admin.
#[derive(Debug, Clone, Default)]
pub struct NewUserInput {
    pub email: String,
    pub name: String,
    pub company: String,
    pub role: String,
    pub notes: String,
}

/// Result of a chat poll tick.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The course is not the chat being watched; the client should stop polling.
    Stopped,
    /// Current messages, possibly with a notification.
    Updated(ChatView),
}

/// Trim and lowercase an email as typed.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Log a user in by allowlisted email.
#[instrument(skip(data))]
pub async fn login(data: &DataManager, raw_email: &str) -> AuthOutcome {
    let normalized = normalize_email(raw_email);
    if normalized.is_empty() {
        return AuthOutcome::Incomplete;
    }

    let Ok(email) = Email::parse(&normalized) else {
        return AuthOutcome::Rejected(Notice::AccountNotFound);
    };

    match data.find_user(&email).await {
        Some(user) => AuthOutcome::LoggedIn(user),
        None => {
            tracing::info!(email = %email, "Login for email not on the allowlist");
            AuthOutcome::Rejected(Notice::AccountNotFound)
        }
    }
}

/// Self-register a new, non-admin user and log them in.
#[instrument(skip(data, input), fields(email = %input.email))]
pub async fn register(data: &DataManager, input: RegistrationInput) -> AuthOutcome {
    let email = normalize_email(&input.email);
    let name = input.name.trim().to_string();
    let company = input.company.trim().to_string();
    let role = input.role.trim().to_string();

    if email.is_empty() || name.is_empty() || company.is_empty() || role.is_empty() {
        return AuthOutcome::Incomplete;
    }

    let Ok(email) = Email::parse(&email) else {
        return AuthOutcome::Rejected(Notice::InvalidEmail);
    };

    if data.find_user(&email).await.is_some() {
        return AuthOutcome::Rejected(Notice::AlreadyRegistered);
    }

    let registration = Registration {
        email,
        name,
        company,
        role,
    };
    if let Err(e) = data.register_user(&registration).await {
        tracing::error!(error = %e, "Registration failed");
        return AuthOutcome::Rejected(Notice::RegistrationFailed);
    }

    match data.find_user(&registration.email).await {
        Some(user) => AuthOutcome::LoggedIn(user),
        None => {
            tracing::error!("Registered user missing from the allowlist");
            AuthOutcome::Rejected(Notice::RegistrationFailed)
        }
    }
}

/// Per-request application facade for a signed-in user.
pub struct CourseApp<'a> {
    data: &'a DataManager,
    user: AuthorizedUser,
    ui: &'a mut UiState,
}

impl<'a> CourseApp<'a> {
    pub const fn new(data: &'a DataManager, user: AuthorizedUser, ui: &'a mut UiState) -> Self {
        Self { data, user, ui }
    }

    #[must_use]
    pub const fn user(&self) -> &AuthorizedUser {
        &self.user
    }

    // =========================================================================
    // Course List
    // =========================================================================

    /// The course list; leaving a detail page stops chat polling.
    #[instrument(skip(self), fields(user = %self.user.email))]
    pub async fn course_list(&mut self) -> CourseListView {
        self.ui.stop_chat();
        let courses = self.data.courses().await;
        let enrollments = self.data.enrollments().await;
        CourseListView::new(&courses, &enrollments, self.ui.showing_archive)
    }

    /// Switch between active courses and the archive.
    pub const fn toggle_archive(&mut self) {
        self.ui.showing_archive = !self.ui.showing_archive;
    }

    // =========================================================================
    // Course Detail
    // =========================================================================

    /// The detail page, or `None` for an unknown course.
    ///
    /// Showing the chat starts watching it for polls.
    #[instrument(skip(self), fields(user = %self.user.email))]
    pub async fn course_detail(&mut self, id: CourseId) -> Option<CourseDetailView> {
        let Some(course) = self.data.course(id).await else {
            tracing::warn!(course_id = %id, "Course not found");
            return None;
        };
        let enrollments = self.data.course_enrollments(id).await;
        let users = self.data.authorized_users().await;

        let mut view = CourseDetailView::new(&course, &enrollments, &users, &self.user);
        if view.can_chat() {
            self.ui.watch_chat(id);
            view.chat = Some(self.load_chat(id).await);
        } else {
            self.ui.stop_chat();
        }
        Some(view)
    }

    async fn can_chat(&self, id: CourseId) -> bool {
        self.user.is_admin
            || self
                .data
                .course_enrollments(id)
                .await
                .iter()
                .any(|enrollment| enrollment.user_id == self.user.email)
    }

    // =========================================================================
    // Chat
    // =========================================================================

    async fn load_chat(&mut self, id: CourseId) -> ChatView {
        let messages = self.data.course_messages(id).await;
        if let Some(watch) = self.ui.chat_for(id) {
            watch.record_loaded(messages.len());
        }
        ChatView::new(id, &messages, &self.user)
    }

    /// The chat messages, or `None` if the user may not see this chat.
    #[instrument(skip(self), fields(user = %self.user.email))]
    pub async fn chat_messages(&mut self, id: CourseId) -> Option<ChatView> {
        if !self.can_chat(id).await {
            return None;
        }
        Some(self.load_chat(id).await)
    }

    /// One polling tick for the watched chat.
    #[instrument(skip(self), fields(user = %self.user.email))]
    pub async fn poll_chat(&mut self, id: CourseId) -> PollOutcome {
        if self.ui.chat_for(id).is_none() {
            return PollOutcome::Stopped;
        }
        if !self.can_chat(id).await {
            self.ui.stop_chat();
            return PollOutcome::Stopped;
        }

        let messages = self.data.course_messages(id).await;
        let viewer = &self.user.email;
        let notification = self.ui.chat_for(id).and_then(|watch| {
            let notification = watch
                .observe(&messages, viewer)
                .map(MessageNotification::for_message);
            watch.record_loaded(messages.len());
            notification
        });

        let mut view = ChatView::new(id, &messages, &self.user);
        view.notification = notification.map(|notification| notification.to_json());
        PollOutcome::Updated(view)
    }

    /// Post a message; blank text only re-renders.
    #[instrument(skip(self, text), fields(user = %self.user.email))]
    pub async fn send_message(&mut self, id: CourseId, text: &str) -> Option<ChatView> {
        if !self.can_chat(id).await {
            return None;
        }

        let text = text.trim();
        if !text.is_empty() {
            let message = ChatMessage::from_user(id, &self.user, text.to_string());
            self.data.save_course_message(&message).await;
            if let Some(watch) = self.ui.chat_for(id) {
                watch.record_sent();
            }
        }
        Some(self.load_chat(id).await)
    }

    /// Delete every message of a course (admin).
    #[instrument(skip(self), fields(user = %self.user.email))]
    pub async fn clear_chat(&mut self, id: CourseId) -> Notice {
        self.data.delete_all_course_messages(id).await;
        if let Some(watch) = self.ui.chat_for(id) {
            watch.reset();
        }
        Notice::ChatCleared
    }

    // =========================================================================
    // Enrollment
    // =========================================================================

    /// Remove another user from a course (admin).
    pub async fn remove_participant(&self, id: CourseId, participant: &Email) {
        self.data.unenroll_user(id, participant).await;
    }

    /// Enroll the current user if the course has room.
    ///
    /// The capacity check and the insert are separate store calls.
    #[instrument(skip(self), fields(user = %self.user.email))]
    pub async fn enroll(&self, id: CourseId) -> Option<Notice> {
        let course = self.data.course(id).await?;
        let enrollments = self.data.course_enrollments(id).await;

        if enrollments
            .iter()
            .any(|enrollment| enrollment.user_id == self.user.email)
        {
            return Some(Notice::AlreadyEnrolled);
        }
        if enrollments.len() >= course.capacity() as usize {
            return Some(Notice::CourseFull);
        }

        self.data.enroll_user(id, &self.user.email).await;
        Some(Notice::Enrolled)
    }

    /// Unenroll the current user.
    pub async fn unenroll(&self, id: CourseId) -> Notice {
        self.data.unenroll_user(id, &self.user.email).await;
        Notice::Unenrolled
    }

    // =========================================================================
    // Course Administration
    // =========================================================================

    /// Mark a course completed (admin).
    #[instrument(skip(self))]
    pub async fn terminate_course(&self, id: CourseId) -> Notice {
        match self
            .data
            .update_course(id, &CourseUpdate::status(CourseStatus::Completed))
            .await
        {
            Ok(()) => Notice::CourseTerminated,
            Err(e) => {
                tracing::error!(error = %e, "Failed to terminate course");
                Notice::TerminateFailed
            }
        }
    }

    /// Mark a course active again and leave the archive (admin).
    #[instrument(skip(self))]
    pub async fn restore_course(&mut self, id: CourseId) -> Notice {
        match self
            .data
            .update_course(id, &CourseUpdate::status(CourseStatus::Active))
            .await
        {
            Ok(()) => {
                self.ui.showing_archive = false;
                Notice::CourseRestored
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to restore course");
                Notice::RestoreFailed
            }
        }
    }

    /// The add form, or the edit form for an existing course.
    pub async fn course_form(&self, id: Option<CourseId>) -> Option<CourseFormView> {
        match id {
            None => Some(CourseFormView::blank()),
            Some(id) => self
                .data
                .course(id)
                .await
                .map(|course| CourseFormView::edit(&course)),
        }
    }

    /// Create or edit a course (admin).
    ///
    /// Text fields are stored uppercase. Edits leave status and creation time
    /// alone; new courses start active and switch the list out of the archive.
    #[instrument(skip(self, details))]
    pub async fn save_course(&mut self, id: Option<CourseId>, details: CourseDetails) -> Notice {
        let details = CourseDetails {
            title: details.title.to_uppercase(),
            description: details.description.to_uppercase(),
            instructor: details.instructor.to_uppercase(),
            location: details.location.to_uppercase(),
            ..details
        };

        let result = match id {
            Some(id) => {
                self.data
                    .update_course(id, &CourseUpdate::details(&details))
                    .await
            }
            None => {
                let saved = self.data.save_courses(&[NewCourse::active(details)]).await;
                if saved.is_ok() {
                    self.ui.showing_archive = false;
                }
                saved
            }
        };

        match result {
            Ok(()) => Notice::CourseSaved,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save course");
                Notice::CourseSaveFailed
            }
        }
    }

    /// Delete a course (admin).
    pub async fn delete_course(&mut self, id: CourseId) {
        self.data.delete_course(id).await;
        if self.ui.chat_for(id).is_some() {
            self.ui.stop_chat();
        }
    }

    // =========================================================================
    // Allowlist Administration
    // =========================================================================

    /// Every allowlisted user (admin).
    pub async fn users(&self) -> Vec<UserView> {
        self.data
            .authorized_users()
            .await
            .iter()
            .map(UserView::from)
            .collect()
    }

    /// Allowlist a new email (admin). Returns a notice when rejected.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn add_email(&self, input: NewUserInput) -> Option<Notice> {
        let Ok(email) = Email::parse(&normalize_email(&input.email)) else {
            return Some(Notice::InvalidEmail);
        };

        if self.data.find_user(&email).await.is_some() {
            return Some(Notice::EmailAlreadyRegistered);
        }

        let mut user = AuthorizedUser::new(
            email,
            input.name.trim().to_string(),
            input.company.trim().to_string(),
            input.role.trim().to_string(),
        );
        user.notes = Some(input.notes.trim().to_string());
        self.data.save_authorized_users(&[user]).await;
        None
    }

    /// Remove an email from the allowlist (admin). Admins cannot be removed here.
    #[instrument(skip(self))]
    pub async fn delete_email(&self, email: &Email) {
        match self.data.find_user(email).await {
            Some(user) if user.is_admin => {
                tracing::warn!(email = %email, "Refusing to delete an admin from the allowlist");
            }
            _ => self.data.delete_authorized_user(email).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RemoteStore};

    fn manager() -> DataManager {
        DataManager::new(RemoteStore::Memory(MemoryStore::new()))
    }

    fn registration(address: &str, name: &str) -> RegistrationInput {
        RegistrationInput {
            email: address.to_string(),
            name: name.to_string(),
            company: "Acme".to_string(),
            role: "Tecnico".to_string(),
        }
    }

    async fn signed_up(data: &DataManager, address: &str, name: &str) -> AuthorizedUser {
        match register(data, registration(address, name)).await {
            AuthOutcome::LoggedIn(user) => user,
            other => panic!("registration failed: {other:?}"),
        }
    }

    async fn admin(data: &DataManager) -> AuthorizedUser {
        let mut user = signed_up(data, "admin@example.com", "Admin").await;
        user.is_admin = true;
        data.save_authorized_users(std::slice::from_ref(&user)).await;
        user
    }

    async fn create_course(data: &DataManager, title: &str, max: Option<u32>) -> CourseId {
        let details = CourseDetails {
            title: title.to_string(),
            max_participants: max,
            ..CourseDetails::default()
        };
        data.save_courses(&[NewCourse::active(details)]).await.unwrap();
        data.courses()
            .await
            .into_iter()
            .find(|course| course.details.title == title)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_login_normalizes_email() {
        let data = manager();
        signed_up(&data, "anna@example.com", "Anna").await;

        assert!(matches!(
            login(&data, "  ANNA@Example.com ").await,
            AuthOutcome::LoggedIn(user) if user.name == "Anna"
        ));
        assert_eq!(login(&data, "   ").await, AuthOutcome::Incomplete);
        assert_eq!(
            login(&data, "nessuno@example.com").await,
            AuthOutcome::Rejected(Notice::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_register_rules() {
        let data = manager();
        signed_up(&data, "anna@example.com", "Anna").await;

        assert_eq!(
            register(&data, registration("ANNA@example.com", "Anna")).await,
            AuthOutcome::Rejected(Notice::AlreadyRegistered)
        );
        assert_eq!(
            register(&data, registration("luca@example.com", " ")).await,
            AuthOutcome::Incomplete
        );
        assert_eq!(
            register(&data, registration("not-an-email", "Luca")).await,
            AuthOutcome::Rejected(Notice::InvalidEmail)
        );

        let user = signed_up(&data, "luca@example.com", "Luca").await;
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_course_list_stops_chat_and_toggles_archive() {
        let data = manager();
        let user = signed_up(&data, "anna@example.com", "Anna").await;
        let active = create_course(&data, "ATTIVO", None).await;
        let done = create_course(&data, "FINITO", None).await;
        data.update_course(done, &CourseUpdate::status(CourseStatus::Completed))
            .await
            .unwrap();

        let mut ui = UiState::default();
        ui.watch_chat(active);
        let mut app = CourseApp::new(&data, user, &mut ui);

        let list = app.course_list().await;
        assert_eq!(list.cards.len(), 1);
        assert_eq!(list.cards[0].id, active);

        app.toggle_archive();
        let archive = app.course_list().await;
        assert_eq!(archive.cards.len(), 1);
        assert_eq!(archive.cards[0].id, done);

        assert!(ui.chat.is_none());
        assert!(ui.showing_archive);
    }

    #[tokio::test]
    async fn test_enroll_respects_capacity() {
        let data = manager();
        let anna = signed_up(&data, "anna@example.com", "Anna").await;
        let luca = signed_up(&data, "luca@example.com", "Luca").await;
        let course = create_course(&data, "PICCOLO", Some(1)).await;

        let mut ui = UiState::default();
        let app = CourseApp::new(&data, anna, &mut ui);
        assert_eq!(app.enroll(course).await, Some(Notice::Enrolled));

        let mut other_ui = UiState::default();
        let other = CourseApp::new(&data, luca, &mut other_ui);
        assert_eq!(other.enroll(course).await, Some(Notice::CourseFull));
        assert_eq!(other.enroll(CourseId::new(999)).await, None);

        assert_eq!(data.course_enrollments(course).await.len(), 1);
    }

    #[tokio::test]
    async fn test_enroll_with_zero_capacity_uses_default() {
        let data = manager();
        let anna = signed_up(&data, "anna@example.com", "Anna").await;
        let course = create_course(&data, "SENZA LIMITE", Some(0)).await;

        let mut ui = UiState::default();
        let app = CourseApp::new(&data, anna, &mut ui);
        assert_eq!(app.enroll(course).await, Some(Notice::Enrolled));
        assert_eq!(data.course_enrollments(course).await.len(), 1);
    }

    #[tokio::test]
    async fn test_enroll_twice_reports_already_enrolled() {
        let data = manager();
        let anna = signed_up(&data, "anna@example.com", "Anna").await;
        let course = create_course(&data, "RIPETUTO", Some(1)).await;

        let mut ui = UiState::default();
        let app = CourseApp::new(&data, anna, &mut ui);
        assert_eq!(app.enroll(course).await, Some(Notice::Enrolled));
        assert_eq!(app.enroll(course).await, Some(Notice::AlreadyEnrolled));
        assert_eq!(data.course_enrollments(course).await.len(), 1);
    }

    #[tokio::test]
    async fn test_detail_watches_chat_only_for_members() {
        let data = manager();
        let anna = signed_up(&data, "anna@example.com", "Anna").await;
        let course = create_course(&data, "CHAT", None).await;

        let mut ui = UiState::default();
        let mut app = CourseApp::new(&data, anna.clone(), &mut ui);
        let detail = app.course_detail(course).await.unwrap();
        assert!(detail.chat.is_none());
        assert!(app.chat_messages(course).await.is_none());
        assert!(app.course_detail(CourseId::new(404)).await.is_none());
        assert!(ui.chat.is_none());

        data.enroll_user(course, &anna.email).await;
        let mut app = CourseApp::new(&data, anna, &mut ui);
        let detail = app.course_detail(course).await.unwrap();
        assert!(detail.chat.unwrap().is_empty());
        assert_eq!(ui.chat, Some(ChatWatch::new(course)));
    }

    #[tokio::test]
    async fn test_poll_notifies_about_others_messages() {
        let data = manager();
        let anna = signed_up(&data, "anna@example.com", "Anna").await;
        let luca = signed_up(&data, "luca@example.com", "Luca").await;
        let course = create_course(&data, "CHAT", None).await;
        data.enroll_user(course, &anna.email).await;
        data.enroll_user(course, &luca.email).await;

        let mut anna_ui = UiState::default();
        let mut anna_app = CourseApp::new(&data, anna, &mut anna_ui);
        anna_app.course_detail(course).await.unwrap();
        anna_app.send_message(course, "  primo  ").await.unwrap();

        let mut luca_ui = UiState::default();
        let mut luca_app = CourseApp::new(&data, luca, &mut luca_ui);
        luca_app.send_message(course, "risposta").await.unwrap();

        let PollOutcome::Updated(view) = anna_app.poll_chat(course).await else {
            panic!("poll stopped");
        };
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.messages[0].message, "primo");
        let notification = view.notification.unwrap();
        assert!(notification.contains("Nuovo messaggio da Luca"));

        let PollOutcome::Updated(view) = anna_app.poll_chat(course).await else {
            panic!("poll stopped");
        };
        assert!(view.notification.is_none());

        assert!(matches!(
            anna_app.poll_chat(CourseId::new(77)).await,
            PollOutcome::Stopped
        ));
    }

    #[tokio::test]
    async fn test_blank_message_is_not_saved() {
        let data = manager();
        let admin = admin(&data).await;
        let course = create_course(&data, "CHAT", None).await;

        let mut ui = UiState::default();
        let mut app = CourseApp::new(&data, admin, &mut ui);
        let chat = app.send_message(course, "   ").await.unwrap();
        assert!(chat.is_empty());
        assert!(data.course_messages(course).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_chat_resets_watch() {
        let data = manager();
        let admin = admin(&data).await;
        let course = create_course(&data, "CHAT", None).await;

        let mut ui = UiState::default();
        let mut app = CourseApp::new(&data, admin, &mut ui);
        app.course_detail(course).await.unwrap();
        app.send_message(course, "ciao").await.unwrap();

        assert_eq!(app.clear_chat(course).await, Notice::ChatCleared);
        assert!(data.course_messages(course).await.is_empty());
        assert_eq!(ui.chat.map(|watch| watch.last_count), Some(0));
    }

    #[tokio::test]
    async fn test_terminate_and_restore() {
        let data = manager();
        let admin = admin(&data).await;
        let course = create_course(&data, "CICLO", None).await;

        let mut ui = UiState {
            showing_archive: true,
            chat: None,
        };
        let mut app = CourseApp::new(&data, admin, &mut ui);

        assert_eq!(app.terminate_course(course).await, Notice::CourseTerminated);
        assert_eq!(
            data.course(course).await.unwrap().status,
            CourseStatus::Completed
        );

        assert_eq!(app.restore_course(course).await, Notice::CourseRestored);
        assert_eq!(data.course(course).await.unwrap().status, CourseStatus::Active);
        assert!(!ui.showing_archive);
    }

    #[tokio::test]
    async fn test_save_course_uppercases_and_keeps_status() {
        let data = manager();
        let admin = admin(&data).await;

        let mut ui = UiState {
            showing_archive: true,
            chat: None,
        };
        let mut app = CourseApp::new(&data, admin, &mut ui);

        let details = CourseDetails {
            title: "Sicurezza".to_string(),
            description: "base".to_string(),
            instructor: "rossi".to_string(),
            location: "aula 1".to_string(),
            ..CourseDetails::default()
        };
        assert_eq!(app.save_course(None, details).await, Notice::CourseSaved);

        let course = data.courses().await.remove(0);
        assert_eq!(course.details.title, "SICUREZZA");
        assert_eq!(course.details.location, "AULA 1");
        assert_eq!(course.status, CourseStatus::Active);

        data.update_course(course.id, &CourseUpdate::status(CourseStatus::Completed))
            .await
            .unwrap();
        let edit = CourseDetails {
            title: "avanzato".to_string(),
            ..CourseDetails::default()
        };
        assert_eq!(app.save_course(Some(course.id), edit).await, Notice::CourseSaved);

        let edited = data.course(course.id).await.unwrap();
        assert_eq!(edited.details.title, "AVANZATO");
        assert_eq!(edited.status, CourseStatus::Completed);
        assert!(!ui.showing_archive);
    }

    #[tokio::test]
    async fn test_add_and_delete_email() {
        let data = manager();
        let admin = admin(&data).await;

        let mut ui = UiState::default();
        let app = CourseApp::new(&data, admin.clone(), &mut ui);

        let input = NewUserInput {
            email: " Nuovo@Example.com ".to_string(),
            name: "Nuovo".to_string(),
            ..NewUserInput::default()
        };
        assert_eq!(app.add_email(input.clone()).await, None);
        assert_eq!(
            app.add_email(input).await,
            Some(Notice::EmailAlreadyRegistered)
        );
        assert_eq!(
            app.add_email(NewUserInput {
                email: "sbagliato".to_string(),
                ..NewUserInput::default()
            })
            .await,
            Some(Notice::InvalidEmail)
        );

        let users = app.users().await;
        let added = users
            .iter()
            .find(|user| user.email.as_str() == "nuovo@example.com")
            .unwrap();
        assert!(!added.is_admin);

        app.delete_email(&admin.email).await;
        app.delete_email(&added.email).await;
        let remaining = app.users().await;
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].is_admin);
    }
}
