//! Integration tests for Aula.
//!
//! Each test boots the real router on an ephemeral port, backed by the
//! in-memory store, and drives it over HTTP with a cookie-enabled client.
//!
//! ```bash
//! cargo test -p aula-integration-tests
//! ```

use aula_core::{CourseId, Email};
use aula_web::config::AulaConfig;
use aula_web::data::DataManager;
use aula_web::models::{CourseDetails, NewCourse, Registration};
use aula_web::state::AppState;
use aula_web::store::{MemoryStore, RemoteStore};
use reqwest::{Client, Response};
use tokio::net::TcpListener;

/// A running server plus direct access to its store for seeding.
pub struct TestContext {
    pub base_url: String,
    pub data: DataManager,
}

impl TestContext {
    /// Start a server on `127.0.0.1` with an empty memory store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let config = AulaConfig::from_lookup(|key| match key {
            "AULA_STORE" => Some("memory".to_string()),
            "AULA_CHAT_POLL_SECONDS" => Some("1".to_string()),
            _ => None,
        })
        .unwrap_or_else(|e| panic!("test configuration: {e}"));

        let store = RemoteStore::Memory(MemoryStore::new());
        let state = AppState::with_store(config, store);
        let data = state.data().clone();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind test listener: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("listener address: {e}"));

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, aula_web::app(state)).await {
                panic!("test server stopped: {e}");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            data,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh browser: own cookie jar, follows redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn browser() -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_else(|e| panic!("build client: {e}"))
    }

    /// Allowlist a user directly in the store.
    ///
    /// # Panics
    ///
    /// Panics if the email is invalid or the write fails.
    pub async fn seed_user(&self, email: &str, name: &str, admin: bool) -> Email {
        let email = Email::parse(email).unwrap_or_else(|e| panic!("seed email: {e}"));
        let registration = Registration {
            email: email.clone(),
            name: name.to_string(),
            company: "Acme".to_string(),
            role: "Tecnico".to_string(),
        };
        self.data
            .register_user(&registration)
            .await
            .unwrap_or_else(|e| panic!("seed user: {e}"));
        if admin {
            self.data
                .set_admin(&email, true)
                .await
                .unwrap_or_else(|e| panic!("seed admin: {e}"));
        }
        email
    }

    /// Create an active course and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the write fails.
    pub async fn seed_course(&self, title: &str, max_participants: Option<u32>) -> CourseId {
        let course = NewCourse::active(CourseDetails {
            title: title.to_string(),
            max_participants,
            ..CourseDetails::default()
        });
        self.data
            .save_courses(&[course])
            .await
            .unwrap_or_else(|e| panic!("seed course: {e}"));

        self.data
            .courses()
            .await
            .into_iter()
            .find(|course| course.details.title == title)
            .map(|course| course.id)
            .unwrap_or_else(|| panic!("seeded course {title} not found"))
    }

    /// Sign `client` in and return the landing page.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn login(&self, client: &Client, email: &str) -> Response {
        client
            .post(self.url("/auth/login"))
            .form(&[("email", email)])
            .send()
            .await
            .unwrap_or_else(|e| panic!("login request: {e}"))
    }

    /// GET `path` and return the body text.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn page(&self, client: &Client, path: &str) -> String {
        client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path}: {e}"))
            .text()
            .await
            .unwrap_or_else(|e| panic!("read {path}: {e}"))
    }

    /// POST an empty form to `path` and return the final body text.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post(&self, client: &Client, path: &str) -> String {
        client
            .post(self.url(path))
            .form(&[("_", "")])
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path}: {e}"))
            .text()
            .await
            .unwrap_or_else(|e| panic!("read {path}: {e}"))
    }
}
