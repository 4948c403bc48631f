use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use courseinfo::auth;
use courseinfo::database::{
    CourseData, InstructorData, MemStore, RegistrationData, SectionData, SemesterData, Store,
    StudentData,
};
use courseinfo::{routes, AppState};

/// In-process application plus a handle on its seeded store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemStore>,
}

/// Build the app over a fresh in-memory store with two accounts:
/// `staff` (all permissions) and `intern` (none).
pub async fn build_app() -> Result<TestApp> {
    let store = Arc::new(MemStore::new());
    store
        .insert_account("staff", &auth::password_digest("staff-pass"), &auth::all_permissions())
        .await?;
    store.insert_account("intern", &auth::password_digest("intern-pass"), &[]).await?;
    let router = routes::app(AppState::new(store.clone()));
    Ok(TestApp { router, store })
}

/// Ids of one fully linked record of each entity kind.
pub struct World {
    pub instructor: i64,
    pub student: i64,
    pub course: i64,
    pub semester: i64,
    pub section: i64,
    pub registration: i64,
}

pub async fn seed_world(store: &MemStore) -> Result<World> {
    let instructor = store
        .insert_instructor(InstructorData { first_name: "Kate".into(), last_name: "Holden".into() })
        .await?;
    let student = store
        .insert_student(StudentData { first_name: "Ann".into(), last_name: "Lee".into() })
        .await?;
    let course = store
        .insert_course(CourseData { name: "IS 439".into(), description: "Web development".into() })
        .await?;
    let semester = store.insert_semester(SemesterData { year: 2026, term: "Fall".into() }).await?;
    let section = store
        .insert_section(SectionData {
            name: "IS 439 AOG".into(),
            course_id: course,
            semester_id: semester,
            instructor_id: instructor,
        })
        .await?;
    let registration = store
        .insert_registration(RegistrationData { student_id: student, section_id: section })
        .await?;
    Ok(World { instructor, student, course, semester, section, registration })
}

pub async fn get(router: &Router, path: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

pub async fn post_form(
    router: &Router,
    path: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
) -> Response {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    router
        .clone()
        .oneshot(builder.body(Body::from(body)).expect("request"))
        .await
        .expect("response")
}

/// Log in and return the session cookie pair (`session=...`).
pub async fn login(router: &Router, username: &str, password: &str) -> Result<String> {
    let resp = post_form(
        router,
        "/login",
        None,
        &[("username", username), ("password", password), ("next", "/")],
    )
    .await;
    anyhow::ensure!(
        resp.status() == StatusCode::SEE_OTHER,
        "login for {} did not redirect: {}",
        username,
        resp.status()
    );
    let cookie = resp
        .headers()
        .get("set-cookie")
        .context("missing set-cookie")?
        .to_str()?
        .split(';')
        .next()
        .context("empty set-cookie")?
        .to_string();
    Ok(cookie)
}

pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub fn location(resp: &Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn urlencode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_' | b'.' => out.push(byte as char),
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
