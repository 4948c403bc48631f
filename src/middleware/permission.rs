use std::future::Future;
use std::pin::Pin;

use axum::{extract::Request, middleware::Next, response::{IntoResponse, Response}};

use crate::auth::{self, Action, Entity};
use crate::error::AppError;
use crate::middleware::session::CurrentUser;

/// Permission guard factory: builds a middleware function that rejects
/// callers lacking the `<entity>.<action>_<entity>` permission string.
///
/// Composed per route group via `axum::middleware::from_fn`, taking the
/// (entity, action) pair as configuration:
///
/// ```ignore
/// .route_layer(middleware::from_fn(require(Entity::Section, Action::View)))
/// ```
pub fn require(
    entity: Entity,
    action: Action,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let codename = auth::permission(entity, action);
            match request.extensions().get::<CurrentUser>() {
                Some(user) if user.has_permission(&codename) => next.run(request).await,
                Some(user) => {
                    tracing::debug!("{} lacks permission {}", user.username, codename);
                    AppError::PermissionDenied.into_response()
                }
                // Session middleware runs first; no extension means it was skipped
                None => AppError::AuthenticationRequired {
                    next: request.uri().path().to_string(),
                }
                .into_response(),
            }
        })
    }
}
