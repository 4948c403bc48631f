mod common;

use anyhow::Result;
use axum::http::StatusCode;
use courseinfo::database::Store;

#[tokio::test]
async fn create_form_renders_empty() -> Result<()> {
    let app = common::build_app().await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::get(&app.router, "/instructor/create/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_string(resp).await;
    assert!(body.contains("New instructor"));
    assert!(body.contains("name=\"first_name\""));
    Ok(())
}

#[tokio::test]
async fn valid_create_persists_and_redirects_to_detail() -> Result<()> {
    let app = common::build_app().await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::post_form(
        &app.router,
        "/instructor/create/",
        Some(&cookie),
        &[("first_name", "Grace"), ("last_name", "Hopper")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let location = common::location(&resp);
    let instructors = app.store.instructors().await?;
    assert_eq!(instructors.len(), 1);
    assert_eq!(instructors[0].first_name, "Grace");
    assert_eq!(location, format!("/instructor/{}/", instructors[0].instructor_id));
    Ok(())
}

#[tokio::test]
async fn section_create_with_missing_course_rerenders_with_field_error() -> Result<()> {
    let app = common::build_app().await?;
    let world = common::seed_world(app.store.as_ref()).await?;
    let sections_before = app.store.sections().await?.len();
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    // no course field submitted at all
    let resp = common::post_form(
        &app.router,
        "/section/create/",
        Some(&cookie),
        &[
            ("name", "IS 439 BOG"),
            ("semester", &world.semester.to_string()),
            ("instructor", &world.instructor.to_string()),
        ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_string(resp).await;
    assert!(body.contains("This field is required."));
    // bound values survive the re-render
    assert!(body.contains("IS 439 BOG"));

    assert_eq!(app.store.sections().await?.len(), sections_before, "no record persisted");
    Ok(())
}

#[tokio::test]
async fn section_create_with_dangling_course_rerenders_with_field_error() -> Result<()> {
    let app = common::build_app().await?;
    let world = common::seed_world(app.store.as_ref()).await?;
    let sections_before = app.store.sections().await?.len();
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::post_form(
        &app.router,
        "/section/create/",
        Some(&cookie),
        &[
            ("name", "IS 439 BOG"),
            ("course", "999999"),
            ("semester", &world.semester.to_string()),
            ("instructor", &world.instructor.to_string()),
        ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(common::body_string(resp).await.contains("Select a valid choice."));
    assert_eq!(app.store.sections().await?.len(), sections_before);
    Ok(())
}

#[tokio::test]
async fn valid_update_mutates_in_place_and_redirects() -> Result<()> {
    let app = common::build_app().await?;
    let world = common::seed_world(app.store.as_ref()).await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::post_form(
        &app.router,
        &format!("/instructor/{}/update/", world.instructor),
        Some(&cookie),
        &[("first_name", "Katherine"), ("last_name", "Holden")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp), format!("/instructor/{}/", world.instructor));

    let record = app.store.instructor(world.instructor).await?.expect("record");
    assert_eq!(record.instructor_id, world.instructor);
    assert_eq!(record.first_name, "Katherine");
    assert_eq!(app.store.instructors().await?.len(), 1, "no extra record created");
    Ok(())
}

#[tokio::test]
async fn update_form_is_prefilled_and_missing_record_is_not_found() -> Result<()> {
    let app = common::build_app().await?;
    let world = common::seed_world(app.store.as_ref()).await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::get(
        &app.router,
        &format!("/instructor/{}/update/", world.instructor),
        Some(&cookie),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_string(resp).await;
    assert!(body.contains("value=\"Kate\""));
    assert!(body.contains("value=\"Holden\""));

    let resp = common::get(&app.router, "/instructor/999999/update/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = common::post_form(
        &app.router,
        "/instructor/999999/update/",
        Some(&cookie),
        &[("first_name", "X"), ("last_name", "Y")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected_with_a_field_error() -> Result<()> {
    let app = common::build_app().await?;
    let world = common::seed_world(app.store.as_ref()).await?;
    let registrations_before = app.store.registrations().await?.len();
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::post_form(
        &app.router,
        "/registration/create/",
        Some(&cookie),
        &[
            ("student", &world.student.to_string()),
            ("section", &world.section.to_string()),
        ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_string(resp).await;
    assert!(body.contains("already registered"));
    assert_eq!(app.store.registrations().await?.len(), registrations_before);
    Ok(())
}

#[tokio::test]
async fn validation_errors_apply_per_field() -> Result<()> {
    let app = common::build_app().await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::post_form(
        &app.router,
        "/semester/create/",
        Some(&cookie),
        &[("year", "twenty"), ("term", "Fall")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_string(resp).await;
    assert!(body.contains("Enter a whole number."));
    assert!(body.contains("value=\"Fall\""), "valid field keeps its value");
    assert!(app.store.semesters().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_requires_the_add_permission() -> Result<()> {
    let app = common::build_app().await?;
    let cookie = common::login(&app.router, "intern", "intern-pass").await?;

    let resp = common::post_form(
        &app.router,
        "/instructor/create/",
        Some(&cookie),
        &[("first_name", "Grace"), ("last_name", "Hopper")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(app.store.instructors().await?.is_empty());
    Ok(())
}
