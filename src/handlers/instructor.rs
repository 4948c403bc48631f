use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Form,
};
use tera::Context;

use crate::error::AppError;
use crate::forms::InstructorForm;
use crate::handlers::{self, RecordId};
use crate::pagination::{self, PAGE_SIZE};
use crate::render;
use crate::AppState;

/// GET /instructor/ - paginated list.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let instructors = state.store.instructors().await?;
    let page = pagination::paginate(instructors, PAGE_SIZE, params.get("page").map(String::as_str));

    let mut ctx = Context::new();
    ctx.insert("instructor_list", &page.items);
    ctx.insert("is_paginated", &page.has_other_pages());
    ctx.insert("previous_page_url", &page.previous_page_url());
    ctx.insert("next_page_url", &page.next_page_url());
    Ok(render::page("instructor_list.html", &ctx)?.into_response())
}

/// GET /instructor/:id/ - detail with owned sections.
pub async fn detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    let instructor = state.store.instructor(id).await?.ok_or(AppError::NotFound)?;
    let section_list = state.store.sections_for_instructor(id).await?;

    let mut ctx = Context::new();
    ctx.insert("instructor", &instructor);
    ctx.insert("section_list", &section_list);
    Ok(render::page("instructor_detail.html", &ctx)?.into_response())
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    handlers::create_form_page::<InstructorForm>(&state).await
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<InstructorForm>,
) -> Result<Response, AppError> {
    handlers::handle_create(&state, form).await
}

pub async fn update_form(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    handlers::update_form_page::<InstructorForm>(&state, id).await
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(form): Form<InstructorForm>,
) -> Result<Response, AppError> {
    handlers::handle_update(&state, id, form).await
}
