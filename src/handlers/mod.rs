use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tera::Context;

use crate::error::AppError;
use crate::forms::{EntityForm, FormErrors};
use crate::render;
use crate::AppState;

pub mod auth;
pub mod course;
pub mod home;
pub mod instructor;
pub mod registration;
pub mod section;
pub mod semester;
pub mod student;

/// Record identifier taken from the URL path. A segment that is not a
/// well-formed integer can never name a record, so it answers 404 just
/// like an unknown id rather than a 400 extractor rejection.
pub struct RecordId(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        raw.parse::<i64>().map(RecordId).map_err(|_| AppError::NotFound)
    }
}

/// Render one entity kind's form template with its bound values, field
/// errors, action URL, and any reference choice lists.
async fn form_page<F: EntityForm>(
    state: &AppState,
    form: &F,
    errors: &FormErrors,
    action: String,
    heading: String,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    ctx.insert("action", &action);
    ctx.insert("heading", &heading);
    F::choices(state.store.as_ref(), &mut ctx).await?;
    Ok(render::page(F::TEMPLATE, &ctx)?.into_response())
}

/// GET create: an empty, unbound form.
pub async fn create_form_page<F: EntityForm>(state: &AppState) -> Result<Response, AppError> {
    form_page(
        state,
        &F::default(),
        &FormErrors::new(),
        F::create_path(),
        format!("New {}", F::NOUN),
    )
    .await
}

/// POST create: validate, persist, redirect to the new record's detail
/// page; on validation failure re-render the bound form with errors (200).
pub async fn handle_create<F: EntityForm>(state: &AppState, form: F) -> Result<Response, AppError> {
    match form.validate(state.store.as_ref(), None).await? {
        Ok(data) => {
            let id = F::insert(state.store.as_ref(), data).await?;
            Ok(Redirect::to(&F::detail_path(id)).into_response())
        }
        Err(errors) => {
            form_page(state, &form, &errors, F::create_path(), format!("New {}", F::NOUN)).await
        }
    }
}

/// GET update: the form pre-filled from the existing record, or 404.
pub async fn update_form_page<F: EntityForm>(
    state: &AppState,
    id: i64,
) -> Result<Response, AppError> {
    let record = F::load(state.store.as_ref(), id).await?.ok_or(AppError::NotFound)?;
    form_page(
        state,
        &F::from_record(&record),
        &FormErrors::new(),
        F::update_path(id),
        format!("Edit {}", F::NOUN),
    )
    .await
}

/// POST update: 404 if the record is gone, otherwise validate and mutate
/// in place, then redirect to the detail page.
pub async fn handle_update<F: EntityForm>(
    state: &AppState,
    id: i64,
    form: F,
) -> Result<Response, AppError> {
    F::load(state.store.as_ref(), id).await?.ok_or(AppError::NotFound)?;
    match form.validate(state.store.as_ref(), Some(id)).await? {
        Ok(data) => {
            F::update(state.store.as_ref(), id, data).await?;
            Ok(Redirect::to(&F::detail_path(id)).into_response())
        }
        Err(errors) => {
            form_page(state, &form, &errors, F::update_path(id), format!("Edit {}", F::NOUN)).await
        }
    }
}
