use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::SectionForm;
use crate::handlers::{self, RecordId};
use crate::render;
use crate::AppState;

/// GET /section/ - full list, unpaginated.
pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let section_list = state.store.sections().await?;
    let mut ctx = Context::new();
    ctx.insert("section_list", &section_list);
    Ok(render::page("section_list.html", &ctx)?.into_response())
}

/// GET /section/:id/ - detail with the section's course, semester,
/// instructor, and registrations, each an explicit fetch.
pub async fn detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    let section = state.store.section(id).await?.ok_or(AppError::NotFound)?;

    // required references; absence would be an integrity violation
    let course = state
        .store
        .course(section.course_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("section {} references missing course", id)))?;
    let semester = state
        .store
        .semester(section.semester_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("section {} references missing semester", id)))?;
    let instructor = state.store.instructor(section.instructor_id).await?.ok_or_else(|| {
        AppError::Internal(format!("section {} references missing instructor", id))
    })?;
    let registration_list = state.store.registrations_for_section(id).await?;

    let mut ctx = Context::new();
    ctx.insert("section", &section);
    ctx.insert("course", &course);
    ctx.insert("semester", &semester);
    ctx.insert("instructor", &instructor);
    ctx.insert("registration_list", &registration_list);
    Ok(render::page("section_detail.html", &ctx)?.into_response())
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    handlers::create_form_page::<SectionForm>(&state).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<SectionForm>,
) -> Result<Response, AppError> {
    handlers::handle_create(&state, form).await
}

pub async fn update_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    handlers::update_form_page::<SectionForm>(&state, id).await
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(form): Form<SectionForm>,
) -> Result<Response, AppError> {
    handlers::handle_update(&state, id, form).await
}
