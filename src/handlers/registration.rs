use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::RegistrationForm;
use crate::handlers::{self, RecordId};
use crate::render;
use crate::AppState;

/// GET /registration/ - full list with joined display names.
pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let registration_list = state.store.registrations().await?;
    let mut ctx = Context::new();
    ctx.insert("registration_list", &registration_list);
    Ok(render::page("registration_list.html", &ctx)?.into_response())
}

/// GET /registration/:id/ - detail with its student and section.
pub async fn detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    let registration = state.store.registration(id).await?.ok_or(AppError::NotFound)?;
    let student = state.store.student(registration.student_id).await?.ok_or_else(|| {
        AppError::Internal(format!("registration {} references missing student", id))
    })?;
    let section = state.store.section(registration.section_id).await?.ok_or_else(|| {
        AppError::Internal(format!("registration {} references missing section", id))
    })?;

    let mut ctx = Context::new();
    ctx.insert("registration", &registration);
    ctx.insert("student", &student);
    ctx.insert("section", &section);
    Ok(render::page("registration_detail.html", &ctx)?.into_response())
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    handlers::create_form_page::<RegistrationForm>(&state).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, AppError> {
    handlers::handle_create(&state, form).await
}

pub async fn update_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    handlers::update_form_page::<RegistrationForm>(&state, id).await
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, AppError> {
    handlers::handle_update(&state, id, form).await
}
