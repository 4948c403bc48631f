use std::collections::HashSet;

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{self, Claims, SESSION_COOKIE};
use crate::error::AppError;

/// Authenticated caller context extracted from the session cookie.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub account_id: i64,
    pub username: String,
    pub permissions: HashSet<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.account_id,
            username: claims.sub,
            permissions: claims.permissions.into_iter().collect(),
        }
    }
}

impl CurrentUser {
    pub fn has_permission(&self, codename: &str) -> bool {
        self.permissions.contains(codename)
    }
}

/// Authentication middleware: validates the session cookie and injects a
/// [`CurrentUser`] extension, or redirects the caller to the login page.
pub async fn session_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    // Keep the query string so e.g. a page number survives the login round trip
    let next_path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let token = match session_cookie(&headers) {
        Some(token) => token,
        None => {
            return AppError::AuthenticationRequired { next: next_path }.into_response();
        }
    };

    match auth::verify_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(CurrentUser::from(claims));
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!("rejected session token: {}", err);
            AppError::AuthenticationRequired { next: next_path }.into_response()
        }
    }
}

/// Extract the session token from the Cookie header.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    for pair in cookies.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let name = parts.next()?;
        if name == SESSION_COOKIE {
            let value = parts.next().unwrap_or("");
            if value.is_empty() {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}
