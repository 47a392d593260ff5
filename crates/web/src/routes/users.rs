//! Allowlist management (admin).

use askama::Template;
use askama_web::WebTemplate;
use aula_core::Email;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{Flash, PageQuery};
use crate::app::{CourseApp, NewUserInput, UserView};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, load_ui_state};
use crate::models::AuthorizedUser;
use crate::state::AppState;

/// Allowlist page.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub user: AuthorizedUser,
    pub flash: Option<Flash>,
    pub users: Vec<UserView>,
}

/// New allowlist entry form data.
#[derive(Debug, Deserialize)]
pub struct AddUserForm {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub notes: String,
}

/// Allowlist removal form data.
#[derive(Debug, Deserialize)]
pub struct DeleteUserForm {
    pub email: String,
}

/// Display the allowlist.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> Result<UsersTemplate> {
    let mut ui = load_ui_state(&session).await?;
    let users = CourseApp::new(state.data(), admin.clone(), &mut ui)
        .users()
        .await;

    Ok(UsersTemplate {
        user: admin,
        flash: query.flash(),
        users,
    })
}

/// Add an email to the allowlist.
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<AddUserForm>,
) -> Result<Redirect> {
    let input = NewUserInput {
        email: form.email,
        name: form.name,
        company: form.company,
        role: form.role,
        notes: form.notes,
    };

    let mut ui = load_ui_state(&session).await?;
    let rejected = CourseApp::new(state.data(), admin, &mut ui)
        .add_email(input)
        .await;

    Ok(match rejected {
        Some(notice) => Redirect::to(&notice.redirect_path("/users")),
        None => Redirect::to("/users"),
    })
}

/// Remove an email from the allowlist.
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<DeleteUserForm>,
) -> Result<Redirect> {
    let email = Email::parse(&form.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let mut ui = load_ui_state(&session).await?;
    CourseApp::new(state.data(), admin, &mut ui)
        .delete_email(&email)
        .await;
    tracing::info!(email = %email, "Allowlist entry removed");
    Ok(Redirect::to("/users"))
}
