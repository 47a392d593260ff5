//! Course route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aula_core::{CourseId, Email};
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_sessions::Session;

use super::{Flash, PageQuery};
use crate::app::{CourseApp, CourseDetailView, CourseFormView, Notice};
use crate::error::{AppError, Result};
use crate::filters;
use crate::image;
use crate::middleware::{RequireAdmin, RequireUser, load_ui_state, save_ui_state};
use crate::models::{AuthorizedUser, CourseDetails};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Course detail page.
#[derive(Template, WebTemplate)]
#[template(path = "courses/detail.html")]
pub struct CourseDetailTemplate {
    pub user: AuthorizedUser,
    pub flash: Option<Flash>,
    pub course: CourseDetailView,
    pub poll_seconds: u64,
}

/// Add/edit course page.
#[derive(Template, WebTemplate)]
#[template(path = "courses/form.html")]
pub struct CourseFormTemplate {
    pub user: AuthorizedUser,
    pub flash: Option<Flash>,
    pub form: CourseFormView,
}

// =============================================================================
// Form Types
// =============================================================================

/// Participant removal form data.
#[derive(Debug, Deserialize)]
pub struct ParticipantForm {
    pub email: String,
}

/// Apply one multipart text field to the course being edited.
fn apply_field(details: &mut CourseDetails, name: &str, value: &str) {
    let value = value.trim();
    let non_empty = || (!value.is_empty()).then(|| value.to_string());

    match name {
        "title" => details.title = value.to_string(),
        "description" => details.description = value.to_string(),
        "instructor" => details.instructor = value.to_string(),
        "location" => details.location = value.to_string(),
        "date" => details.date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
        "start_time" => details.start_time = non_empty(),
        "duration" => details.duration = non_empty(),
        "max_participants" => details.max_participants = value.parse().ok(),
        other => tracing::debug!(field = other, "Ignoring unknown course form field"),
    }
}

/// Read the multipart course form, encoding an uploaded image as a data URL.
async fn read_course_form(mut multipart: Multipart) -> Result<CourseDetails> {
    let mut details = CourseDetails::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            details.image = image::data_url(&content_type, &bytes);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            apply_field(&mut details, &name, &value);
        }
    }

    Ok(details)
}

fn detail_path(id: CourseId) -> String {
    format!("/courses/{id}")
}

// =============================================================================
// List & Detail
// =============================================================================

/// Switch between the active list and the archive.
pub async fn toggle_archive(
    session: Session,
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Redirect> {
    let mut ui = load_ui_state(&session).await?;
    CourseApp::new(state.data(), user, &mut ui).toggle_archive();
    save_ui_state(&session, &ui).await?;
    Ok(Redirect::to("/"))
}

/// Display a course. Unknown courses fall back to the list.
#[tracing::instrument(skip_all, fields(course_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<CourseId>,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let mut ui = load_ui_state(&session).await?;
    let course = CourseApp::new(state.data(), user.clone(), &mut ui)
        .course_detail(id)
        .await;
    save_ui_state(&session, &ui).await?;

    let Some(course) = course else {
        return Ok(Redirect::to("/").into_response());
    };

    Ok(CourseDetailTemplate {
        user,
        flash: query.flash(),
        course,
        poll_seconds: state.config().chat_poll_interval.as_secs().max(1),
    }
    .into_response())
}

// =============================================================================
// Enrollment
// =============================================================================

/// Enroll the current user.
pub async fn enroll(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<CourseId>,
) -> Result<Redirect> {
    let mut ui = load_ui_state(&session).await?;
    let notice = CourseApp::new(state.data(), user, &mut ui)
        .enroll(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("course {id}")))?;
    Ok(Redirect::to(&notice.redirect_path(&detail_path(id))))
}

/// Unenroll the current user.
pub async fn unenroll(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<CourseId>,
) -> Result<Redirect> {
    let mut ui = load_ui_state(&session).await?;
    let notice = CourseApp::new(state.data(), user, &mut ui)
        .unenroll(id)
        .await;
    Ok(Redirect::to(&notice.redirect_path(&detail_path(id))))
}

/// Remove another user from the course.
pub async fn remove_participant(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CourseId>,
    Form(form): Form<ParticipantForm>,
) -> Result<Redirect> {
    let participant =
        Email::parse(&form.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let mut ui = load_ui_state(&session).await?;
    CourseApp::new(state.data(), admin, &mut ui)
        .remove_participant(id, &participant)
        .await;
    Ok(Redirect::to(&detail_path(id)))
}

// =============================================================================
// Administration
// =============================================================================

/// Mark a course completed.
pub async fn terminate(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CourseId>,
) -> Result<Redirect> {
    let mut ui = load_ui_state(&session).await?;
    let notice = CourseApp::new(state.data(), admin, &mut ui)
        .terminate_course(id)
        .await;
    if notice == Notice::TerminateFailed {
        return Ok(Redirect::to(&notice.redirect_path(&detail_path(id))));
    }
    Ok(Redirect::to(&notice.redirect_path("/")))
}

/// Mark a course active again and show the active list.
pub async fn restore(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CourseId>,
) -> Result<Redirect> {
    let mut ui = load_ui_state(&session).await?;
    let notice = CourseApp::new(state.data(), admin, &mut ui)
        .restore_course(id)
        .await;
    save_ui_state(&session, &ui).await?;
    if notice == Notice::RestoreFailed {
        return Ok(Redirect::to(&notice.redirect_path(&detail_path(id))));
    }
    Ok(Redirect::to(&notice.redirect_path("/")))
}

/// Delete a course.
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CourseId>,
) -> Result<Redirect> {
    let mut ui = load_ui_state(&session).await?;
    CourseApp::new(state.data(), admin, &mut ui)
        .delete_course(id)
        .await;
    save_ui_state(&session, &ui).await?;
    tracing::info!(course_id = %id, "Course deleted");
    Ok(Redirect::to("/"))
}

/// Display the add course form.
pub async fn new_form(
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    CourseFormTemplate {
        user: admin,
        flash: query.flash(),
        form: CourseFormView::blank(),
    }
}

/// Display the edit course form.
pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CourseId>,
    Query(query): Query<PageQuery>,
) -> Result<CourseFormTemplate> {
    let mut ui = load_ui_state(&session).await?;
    let form = CourseApp::new(state.data(), admin.clone(), &mut ui)
        .course_form(Some(id))
        .await
        .ok_or_else(|| AppError::NotFound(format!("course {id}")))?;

    Ok(CourseFormTemplate {
        user: admin,
        flash: query.flash(),
        form,
    })
}

/// Create a course.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Redirect> {
    let details = read_course_form(multipart).await?;
    let mut ui = load_ui_state(&session).await?;
    let notice = CourseApp::new(state.data(), admin, &mut ui)
        .save_course(None, details)
        .await;
    save_ui_state(&session, &ui).await?;

    let target = if notice == Notice::CourseSaved {
        "/"
    } else {
        "/courses/new"
    };
    Ok(Redirect::to(&notice.redirect_path(target)))
}

/// Update a course. Without a new upload the current image is kept.
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CourseId>,
    multipart: Multipart,
) -> Result<Redirect> {
    let details = read_course_form(multipart).await?;
    let mut ui = load_ui_state(&session).await?;
    let notice = CourseApp::new(state.data(), admin, &mut ui)
        .save_course(Some(id), details)
        .await;

    let target = if notice == Notice::CourseSaved {
        detail_path(id)
    } else {
        format!("{}/edit", detail_path(id))
    };
    Ok(Redirect::to(&notice.redirect_path(&target)))
}
