use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::CourseForm;
use crate::handlers::{self, RecordId};
use crate::render;
use crate::AppState;

/// GET /course/ - full list, unpaginated.
pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let course_list = state.store.courses().await?;
    let mut ctx = Context::new();
    ctx.insert("course_list", &course_list);
    Ok(render::page("course_list.html", &ctx)?.into_response())
}

/// GET /course/:id/ - detail with owned sections.
pub async fn detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    let course = state.store.course(id).await?.ok_or(AppError::NotFound)?;
    let section_list = state.store.sections_for_course(id).await?;

    let mut ctx = Context::new();
    ctx.insert("course", &course);
    ctx.insert("section_list", &section_list);
    Ok(render::page("course_detail.html", &ctx)?.into_response())
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    handlers::create_form_page::<CourseForm>(&state).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<CourseForm>,
) -> Result<Response, AppError> {
    handlers::handle_create(&state, form).await
}

pub async fn update_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    handlers::update_form_page::<CourseForm>(&state, id).await
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(form): Form<CourseForm>,
) -> Result<Response, AppError> {
    handlers::handle_update(&state, id, form).await
}
