use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Form,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::StudentForm;
use crate::handlers::{self, RecordId};
use crate::pagination::{self, PAGE_SIZE};
use crate::render;
use crate::AppState;

/// GET /student/ - paginated list.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let students = state.store.students().await?;
    let page = pagination::paginate(students, PAGE_SIZE, params.get("page").map(String::as_str));

    let mut ctx = Context::new();
    ctx.insert("student_list", &page.items);
    ctx.insert("is_paginated", &page.has_other_pages());
    ctx.insert("previous_page_url", &page.previous_page_url());
    ctx.insert("next_page_url", &page.next_page_url());
    Ok(render::page("student_list.html", &ctx)?.into_response())
}

/// GET /student/:id/ - detail with the student's registrations.
pub async fn detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    let student = state.store.student(id).await?.ok_or(AppError::NotFound)?;
    let registration_list = state.store.registrations_for_student(id).await?;

    let mut ctx = Context::new();
    ctx.insert("student", &student);
    ctx.insert("registration_list", &registration_list);
    Ok(render::page("student_detail.html", &ctx)?.into_response())
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    handlers::create_form_page::<StudentForm>(&state).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<StudentForm>,
) -> Result<Response, AppError> {
    handlers::handle_create(&state, form).await
}

pub async fn update_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    handlers::update_form_page::<StudentForm>(&state, id).await
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(form): Form<StudentForm>,
) -> Result<Response, AppError> {
    handlers::handle_update(&state, id, form).await
}
