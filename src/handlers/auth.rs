use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tera::Context;

use crate::auth::{self, Claims, SESSION_COOKIE};
use crate::error::AppError;
use crate::render;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: String,
}

fn login_page(next: &str, error: Option<&str>, username: &str) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("next", next);
    ctx.insert("error", &error);
    ctx.insert("username", username);
    Ok(render::page("login.html", &ctx)?.into_response())
}

/// Only allow same-site redirect targets after login.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") {
        next
    } else {
        "/"
    }
}

/// GET /login - the login form.
pub async fn login_form(Query(query): Query<LoginQuery>) -> Result<Response, AppError> {
    login_page(query.next.as_deref().unwrap_or("/"), None, "")
}

/// POST /login - authenticate and start a session. Bad credentials
/// re-render the form with an error and no state change.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let digest = auth::password_digest(&form.password);
    match state.store.authenticate(&form.username, &digest).await? {
        Some(account) => {
            let claims = Claims::new(account.username, account.account_id, account.permissions);
            let token = auth::issue_token(&claims).map_err(|e| AppError::Internal(e.to_string()))?;
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token);
            tracing::info!("login: {}", form.username);
            Ok((
                AppendHeaders([(SET_COOKIE, cookie)]),
                Redirect::to(safe_next(&form.next)),
            )
                .into_response())
        }
        None => {
            tracing::debug!("failed login attempt for {}", form.username);
            login_page(&form.next, Some("Invalid username or password."), &form.username)
        }
    }
}

/// POST /logout - clear the session cookie.
pub async fn logout() -> Response {
    let cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_targets_are_restricted_to_local_paths() {
        assert_eq!(safe_next("/course/"), "/course/");
        assert_eq!(safe_next("https://evil.example"), "/");
        assert_eq!(safe_next("//evil.example"), "/");
        assert_eq!(safe_next(""), "/");
    }
}
