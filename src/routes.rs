use axum::{middleware::from_fn, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::auth::{Action, Entity};
use crate::handlers::{auth, course, home, instructor, registration, section, semester, student};
use crate::middleware::{require, session_auth_middleware};
use crate::AppState;

/// Assemble the full application router. Everything except the login and
/// health routes sits behind the session middleware; each entity route
/// group carries its own permission guard.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .merge(instructor_routes())
        .merge(student_routes())
        .merge(course_routes())
        .merge(section_routes())
        .merge(semester_routes())
        .merge(registration_routes())
        .route_layer(from_fn(session_auth_middleware))
        // Public surface
        .route("/health", get(home::health))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", axum::routing::post(auth::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn instructor_routes() -> Router<AppState> {
    Router::new()
        .route("/instructor/", get(instructor::list))
        .route("/instructor/:id/", get(instructor::detail))
        .route_layer(from_fn(require(Entity::Instructor, Action::View)))
        .merge(
            Router::new()
                .route("/instructor/create/", get(instructor::create_form).post(instructor::create))
                .route_layer(from_fn(require(Entity::Instructor, Action::Add))),
        )
        .merge(
            Router::new()
                .route(
                    "/instructor/:id/update/",
                    get(instructor::update_form).post(instructor::update),
                )
                .route_layer(from_fn(require(Entity::Instructor, Action::Change))),
        )
}

fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/student/", get(student::list))
        .route("/student/:id/", get(student::detail))
        .route_layer(from_fn(require(Entity::Student, Action::View)))
        .merge(
            Router::new()
                .route("/student/create/", get(student::create_form).post(student::create))
                .route_layer(from_fn(require(Entity::Student, Action::Add))),
        )
        .merge(
            Router::new()
                .route("/student/:id/update/", get(student::update_form).post(student::update))
                .route_layer(from_fn(require(Entity::Student, Action::Change))),
        )
}

fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/course/", get(course::list))
        .route("/course/:id/", get(course::detail))
        .route_layer(from_fn(require(Entity::Course, Action::View)))
        .merge(
            Router::new()
                .route("/course/create/", get(course::create_form).post(course::create))
                .route_layer(from_fn(require(Entity::Course, Action::Add))),
        )
        .merge(
            Router::new()
                .route("/course/:id/update/", get(course::update_form).post(course::update))
                .route_layer(from_fn(require(Entity::Course, Action::Change))),
        )
}

fn section_routes() -> Router<AppState> {
    Router::new()
        .route("/section/", get(section::list))
        .route("/section/:id/", get(section::detail))
        .route_layer(from_fn(require(Entity::Section, Action::View)))
        .merge(
            Router::new()
                .route("/section/create/", get(section::create_form).post(section::create))
                .route_layer(from_fn(require(Entity::Section, Action::Add))),
        )
        .merge(
            Router::new()
                .route("/section/:id/update/", get(section::update_form).post(section::update))
                .route_layer(from_fn(require(Entity::Section, Action::Change))),
        )
}

fn semester_routes() -> Router<AppState> {
    Router::new()
        .route("/semester/", get(semester::list))
        .route("/semester/:id/", get(semester::detail))
        .route_layer(from_fn(require(Entity::Semester, Action::View)))
        .merge(
            Router::new()
                .route("/semester/create/", get(semester::create_form).post(semester::create))
                .route_layer(from_fn(require(Entity::Semester, Action::Add))),
        )
        .merge(
            Router::new()
                .route("/semester/:id/update/", get(semester::update_form).post(semester::update))
                .route_layer(from_fn(require(Entity::Semester, Action::Change))),
        )
}

fn registration_routes() -> Router<AppState> {
    Router::new()
        .route("/registration/", get(registration::list))
        .route("/registration/:id/", get(registration::detail))
        .route_layer(from_fn(require(Entity::Registration, Action::View)))
        .merge(
            Router::new()
                .route(
                    "/registration/create/",
                    get(registration::create_form).post(registration::create),
                )
                .route_layer(from_fn(require(Entity::Registration, Action::Add))),
        )
        .merge(
            Router::new()
                .route(
                    "/registration/:id/update/",
                    get(registration::update_form).post(registration::update),
                )
                .route_layer(from_fn(require(Entity::Registration, Action::Change))),
        )
}
