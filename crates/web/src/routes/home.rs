//! Home page: the auth screen for visitors, the course list for users.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::{Flash, PageQuery};
use crate::app::{CourseApp, CourseListView};
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalUser, load_ui_state, save_ui_state};
use crate::models::AuthorizedUser;
use crate::state::AppState;

/// Login and registration screen.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub register_mode: bool,
    pub flash: Option<Flash>,
}

/// Course list page.
#[derive(Template, WebTemplate)]
#[template(path = "courses/list.html")]
pub struct CourseListTemplate {
    pub user: AuthorizedUser,
    pub flash: Option<Flash>,
    pub list: CourseListView,
}

/// Show the course list, or the auth screen when nobody is signed in.
#[tracing::instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let Some(user) = user else {
        return Ok(AuthTemplate {
            register_mode: query.mode.as_deref() == Some("register"),
            flash: query.flash(),
        }
        .into_response());
    };

    let mut ui = load_ui_state(&session).await?;
    let list = CourseApp::new(state.data(), user.clone(), &mut ui)
        .course_list()
        .await;
    save_ui_state(&session, &ui).await?;

    Ok(CourseListTemplate {
        user,
        flash: query.flash(),
        list,
    }
    .into_response())
}
