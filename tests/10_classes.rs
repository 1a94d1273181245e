mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use lms_api::auth::Role;
use lms_api::database::models::CourseForm;
use lms_api::database::CourseStore;

fn titles(body: &serde_json::Value, key: Option<&str>) -> Vec<String> {
    let list = match key {
        Some(k) => &body["data"][k],
        None => &body["data"],
    };
    let mut out: Vec<String> = list
        .as_array()
        .expect("array of courses")
        .iter()
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect();
    out.sort();
    out
}

#[tokio::test]
async fn anonymous_listing_is_unrestricted() {
    let app = TestApp::new().await;
    app.course("Intro", 1).await;
    app.course("Deep", 3).await;

    let (status, body) = app.get("/api/classes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total_elements"], 2);
    assert_eq!(body["data"]["size"], 10);
}

#[tokio::test]
async fn learner_listing_applies_level_ceiling() {
    let app = TestApp::new().await;
    app.course("Intro", 1).await;
    app.course("Deep", 3).await;

    let (status, body) = app.get("/api/classes", Some(&app.learner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, Some("content")), vec!["Intro"]);

    let (_, body) = app.get("/api/classes/visible", Some(&app.learner)).await;
    assert_eq!(titles(&body, None), vec!["Intro"]);
}

#[tokio::test]
async fn keyword_and_level_filters_combine() {
    let app = TestApp::new().await;
    app.course("Rust Basics", 1).await;
    app.course("Rust Async", 2).await;
    app.course("Go Basics", 2).await;

    let (_, body) = app.get("/api/classes?search_type=title&kw=RUST", None).await;
    assert_eq!(titles(&body, Some("content")), vec!["Rust Async", "Rust Basics"]);

    let (_, body) = app.get("/api/classes?search_type=title&kw=rust&level_id=2", None).await;
    assert_eq!(titles(&body, Some("content")), vec!["Rust Async"]);

    let (_, body) = app.get("/api/classes?search_type=instructor&kw=kim", None).await;
    assert_eq!(body["data"]["total_elements"], 3);

    let (_, body) = app.get("/api/classes?search_type=other&kw=rust&level_id=0", None).await;
    assert_eq!(body["data"]["total_elements"], 3);
}

#[tokio::test]
async fn negative_page_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/classes?page=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn huge_page_index_is_rejected() {
    let app = TestApp::new().await;
    app.course("Rust", 1).await;

    let (status, body) = app.get("/api/classes?page=9223372036854775807", Some(&app.learner)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["page"].is_string());

    let uri = format!("/api/classes/instructor/{}?page=9223372036854775807", app.instructor.id);
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let course = app.course("Go", 1).await;
    let uri = format!("/api/reviews/classes/{}?page=9223372036854775807", course.id);
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn instructor_page_and_random_sample() {
    let app = TestApp::new().await;
    for i in 0..8 {
        app.course(&format!("Course {i}"), 1).await;
    }

    let uri = format!("/api/classes/instructor/{}", app.instructor.id);
    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"].as_array().unwrap().len(), 6);
    assert_eq!(body["data"]["total_pages"], 2);

    let (status, body) = app.get("/api/classes/random?limit=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn detail_includes_rating_figures() {
    let app = TestApp::new().await;
    let course = app.course("Rust", 1).await;

    let (status, body) = app.get(&format!("/api/classes/{}", course.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Rust");
    assert_eq!(body["data"]["instructor_name"], "Kim Instructor");
    assert_eq!(body["data"]["average_rating"], 0.0);
    assert_eq!(body["data"]["review_count"], 0);

    let (status, _) = app.get(&format!("/api/classes/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/classes/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn course_authoring_rules() {
    let app = TestApp::new().await;
    let form = json!({ "title": "Rust", "content": "ownership", "level_id": 1 });

    let (status, _) = app.post("/api/classes", None, form.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/api/classes", Some(&app.learner), form.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post("/api/classes", Some(&app.instructor), form).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let edit = json!({ "title": "Rust 2", "level_id": 2 });
    let stranger = app.user("park", Role::Instructor, None).await;
    let (status, _) = app.put(&format!("/api/classes/{id}"), Some(&stranger), edit.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.put(&format!("/api/classes/{id}"), Some(&app.admin), edit).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level_id"], 2);
}

#[tokio::test]
async fn delete_blocked_while_enrolled() {
    let app = TestApp::new().await;
    let course = app.course("Rust", 1).await;
    app.enroll(course.id, &app.learner, false).await;
    let uri = format!("/api/classes/{}", course.id);

    let (status, _) = app.delete(&uri, Some(&app.admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&uri, Some(&app.instructor)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let empty = app.course("Empty", 1).await;
    let (status, _) = app.delete(&format!("/api/classes/{}", empty.id), Some(&app.instructor)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn bad_tokens_are_unauthorized() {
    let app = TestApp::new().await;
    let request = axum::http::Request::builder()
        .uri("/api/classes")
        .header("authorization", "Bearer not.a.jwt")
        .body(axum::body::Body::empty())
        .unwrap();

    use tower::ServiceExt;
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

#[tokio::test]
async fn instructor_listing_without_paging() {
    let app = TestApp::new().await;
    for i in 0..8 {
        app.course(&format!("Course {i}"), 1).await;
    }
    let other = app.user("park", Role::Instructor, None).await;
    let form = CourseForm {
        title: "Other".to_string(),
        level_id: 1,
        ..Default::default()
    };
    app.store.insert_course(other.id, &form).await.unwrap();

    let (status, body) = app.get(&format!("/api/classes/instructor/{}/all", app.instructor.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 8);

    let (_, body) = app.get(&format!("/api/classes/instructor/{}/all", other.id), None).await;
    assert_eq!(titles(&body, None), vec!["Other"]);
}
}
