mod common;

use anyhow::Result;
use axum::http::StatusCode;
use courseinfo::database::{InstructorData, Store};

async fn seed_instructors(store: &dyn Store, count: usize) -> Result<()> {
    for n in 1..=count {
        store
            .insert_instructor(InstructorData {
                first_name: format!("First{:02}", n),
                last_name: format!("Last{:02}", n),
            })
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn instructor_list_paginates_at_twenty_five() -> Result<()> {
    let app = common::build_app().await?;
    seed_instructors(app.store.as_ref(), 30).await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    // page 1: 25 records, next link, no previous link
    let resp = common::get(&app.router, "/instructor/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_string(resp).await;
    assert_eq!(body.matches("Last").count(), 25);
    assert!(body.contains("Last01"));
    assert!(body.contains("Last25"));
    assert!(!body.contains("Last26"));
    assert!(body.contains("class=\"next\""));
    assert!(body.contains("?page=2"));
    assert!(!body.contains("class=\"prev\""));

    // page 2: the remaining 5, previous link, no next link
    let resp = common::get(&app.router, "/instructor/?page=2", Some(&cookie)).await;
    let body = common::body_string(resp).await;
    assert_eq!(body.matches("Last").count(), 5);
    assert!(body.contains("Last26"));
    assert!(body.contains("Last30"));
    assert!(body.contains("class=\"prev\""));
    assert!(body.contains("?page=1"));
    assert!(!body.contains("class=\"next\""));
    Ok(())
}

#[tokio::test]
async fn non_numeric_page_behaves_like_page_one() -> Result<()> {
    let app = common::build_app().await?;
    seed_instructors(app.store.as_ref(), 30).await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let bad = common::get(&app.router, "/instructor/?page=abc", Some(&cookie)).await;
    assert_eq!(bad.status(), StatusCode::OK);
    let one = common::get(&app.router, "/instructor/?page=1", Some(&cookie)).await;
    assert_eq!(common::body_string(bad).await, common::body_string(one).await);
    Ok(())
}

#[tokio::test]
async fn out_of_range_page_falls_back_to_the_last_page() -> Result<()> {
    let app = common::build_app().await?;
    seed_instructors(app.store.as_ref(), 30).await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::get(&app.router, "/instructor/?page=99", Some(&cookie)).await;
    let body = common::body_string(resp).await;
    assert!(body.contains("Last30"));
    assert!(!body.contains("Last01"));
    Ok(())
}

#[tokio::test]
async fn course_list_is_unpaginated() -> Result<()> {
    let app = common::build_app().await?;
    let world = common::seed_world(app.store.as_ref()).await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::get(&app.router, "/course/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_string(resp).await;
    assert!(body.contains("IS 439"));
    assert!(body.contains(&format!("/course/{}/", world.course)));
    Ok(())
}

#[tokio::test]
async fn section_and_semester_and_registration_lists_render() -> Result<()> {
    let app = common::build_app().await?;
    common::seed_world(app.store.as_ref()).await?;
    let cookie = common::login(&app.router, "staff", "staff-pass").await?;

    let resp = common::get(&app.router, "/section/", Some(&cookie)).await;
    assert!(common::body_string(resp).await.contains("IS 439 AOG"));

    let resp = common::get(&app.router, "/semester/", Some(&cookie)).await;
    assert!(common::body_string(resp).await.contains("Fall 2026"));

    let resp = common::get(&app.router, "/registration/", Some(&cookie)).await;
    let body = common::body_string(resp).await;
    assert!(body.contains("Lee, Ann"));
    assert!(body.contains("IS 439 AOG"));
    Ok(())
}
