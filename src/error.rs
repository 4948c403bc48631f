// HTTP error responses for the rendered-page surface
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::database::StoreError;

/// Request-terminal failures, mapped onto the responses a browser client
/// expects: a login redirect, a forbidden page, a not-found page, or a
/// generic server error with the real cause kept in the logs.
#[derive(Debug)]
pub enum AppError {
    /// Unauthenticated access to a protected route.
    AuthenticationRequired { next: String },
    /// Authenticated but missing the required permission string.
    PermissionDenied,
    /// An identifier did not resolve to a record.
    NotFound,
    /// Unclassified persistence or rendering failure.
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired { .. } => StatusCode::SEE_OTHER,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_page(status: StatusCode, title: &str) -> Response {
        let body = format!(
            "<!doctype html><html><head><title>{title}</title></head>\
             <body><h1>{code} {title}</h1></body></html>",
            title = title,
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::AuthenticationRequired { next } => {
                write!(f, "authentication required (next: {})", next)
            }
            AppError::PermissionDenied => write!(f, "permission denied"),
            AppError::NotFound => write!(f, "not found"),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Internal(format!("template error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthenticationRequired { next } => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("next", &next)
                    .finish();
                Redirect::to(&format!("/login?{}", query)).into_response()
            }
            AppError::PermissionDenied => Self::error_page(StatusCode::FORBIDDEN, "Forbidden"),
            AppError::NotFound => Self::error_page(StatusCode::NOT_FOUND, "Not Found"),
            AppError::Internal(msg) => {
                // Log the real cause, return a generic page to the client
                tracing::error!("internal error: {}", msg);
                Self::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        }
    }
}
