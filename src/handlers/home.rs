use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use tera::Context;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::render;
use crate::AppState;

/// GET / - home page linking the six entity lists.
pub async fn index(Extension(user): Extension<CurrentUser>) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("username", &user.username);
    Ok(render::page("home.html", &ctx)?.into_response())
}

/// GET /health - liveness plus a store ping.
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();
    match state.store.ping().await {
        Ok(()) => Json(json!({
            "status": "ok",
            "timestamp": now,
            "store": "ok"
        }))
        .into_response(),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string()
            })),
        )
            .into_response(),
    }
}
