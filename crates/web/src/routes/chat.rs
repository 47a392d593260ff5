//! Course chat handlers (HTMX fragments).

use askama::Template;
use askama_web::WebTemplate;
use aula_core::CourseId;
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::app::{ChatView, CourseApp, PollOutcome};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, RequireUser, load_ui_state, save_ui_state};
use crate::state::AppState;

/// htmx stops a polling trigger when it receives this status.
const STOP_POLLING: u16 = 286;

/// Message list fragment.
#[derive(Template, WebTemplate)]
#[template(path = "chat/messages.html")]
pub struct ChatTemplate {
    pub chat: ChatView,
}

/// Message form data.
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub message: String,
}

fn stop_polling() -> Response {
    StatusCode::from_u16(STOP_POLLING)
        .unwrap_or(StatusCode::NO_CONTENT)
        .into_response()
}

fn forbidden(id: CourseId) -> AppError {
    AppError::Forbidden(format!("chat of course {id}"))
}

/// Render the message list.
pub async fn messages(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<CourseId>,
) -> Result<ChatTemplate> {
    let mut ui = load_ui_state(&session).await?;
    let chat = CourseApp::new(state.data(), user, &mut ui)
        .chat_messages(id)
        .await
        .ok_or_else(|| forbidden(id))?;
    save_ui_state(&session, &ui).await?;
    Ok(ChatTemplate { chat })
}

/// One polling tick.
#[tracing::instrument(skip_all, fields(course_id = %id))]
pub async fn poll(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<CourseId>,
) -> Result<Response> {
    let mut ui = load_ui_state(&session).await?;
    let outcome = CourseApp::new(state.data(), user, &mut ui)
        .poll_chat(id)
        .await;
    save_ui_state(&session, &ui).await?;

    Ok(match outcome {
        PollOutcome::Stopped => stop_polling(),
        PollOutcome::Updated(chat) => ChatTemplate { chat }.into_response(),
    })
}

/// Post a message and re-render the list.
///
/// Plain form posts (no htmx) are redirected back to the course.
pub async fn send(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<CourseId>,
    headers: HeaderMap,
    Form(form): Form<MessageForm>,
) -> Result<Response> {
    let mut ui = load_ui_state(&session).await?;
    let chat = CourseApp::new(state.data(), user, &mut ui)
        .send_message(id, &form.message)
        .await
        .ok_or_else(|| forbidden(id))?;
    save_ui_state(&session, &ui).await?;

    if headers.contains_key("hx-request") {
        Ok(ChatTemplate { chat }.into_response())
    } else {
        Ok(Redirect::to(&format!("/courses/{id}")).into_response())
    }
}

/// Delete every message of the course.
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CourseId>,
) -> Result<Redirect> {
    let mut ui = load_ui_state(&session).await?;
    let notice = CourseApp::new(state.data(), admin, &mut ui)
        .clear_chat(id)
        .await;
    save_ui_state(&session, &ui).await?;
    Ok(Redirect::to(
        &notice.redirect_path(&format!("/courses/{id}")),
    ))
}
