use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::SemesterForm;
use crate::handlers::{self, RecordId};
use crate::render;
use crate::AppState;

/// GET /semester/ - full list, unpaginated.
pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let semester_list = state.store.semesters().await?;
    let mut ctx = Context::new();
    ctx.insert("semester_list", &semester_list);
    Ok(render::page("semester_list.html", &ctx)?.into_response())
}

/// GET /semester/:id/ - detail with owned sections.
pub async fn detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    let semester = state.store.semester(id).await?.ok_or(AppError::NotFound)?;
    let section_list = state.store.sections_for_semester(id).await?;

    let mut ctx = Context::new();
    ctx.insert("semester", &semester);
    ctx.insert("section_list", &section_list);
    Ok(render::page("semester_detail.html", &ctx)?.into_response())
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    handlers::create_form_page::<SemesterForm>(&state).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<SemesterForm>,
) -> Result<Response, AppError> {
    handlers::handle_create(&state, form).await
}

pub async fn update_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    handlers::update_form_page::<SemesterForm>(&state, id).await
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(form): Form<SemesterForm>,
) -> Result<Response, AppError> {
    handlers::handle_update(&state, id, form).await
}
