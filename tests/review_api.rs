//! HTTP 接口测试：认证、作业、提交与审查

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use std::sync::Arc;

use common::{StubFetcher, StubRequester, create_user, memory_storage, seed_scenario};
use rust_hwreview::cache::IdentityCache;
use rust_hwreview::config::CacheConfig;
use rust_hwreview::models::users::entities::{RoleSet, User};
use rust_hwreview::review::{PromptAssembler, ReviewOrchestrator};
use rust_hwreview::routes;
use rust_hwreview::storage::Storage;
use rust_hwreview::utils::json_error_handler;

fn orchestrator(storage: &Arc<dyn Storage>, feedback: &str) -> web::Data<ReviewOrchestrator> {
    web::Data::new(ReviewOrchestrator::new(
        storage.clone(),
        Arc::new(StubFetcher::one_file()),
        Arc::new(StubRequester::replying(feedback)),
        PromptAssembler::default(),
    ))
}

macro_rules! init_app {
    ($storage:expr, $orchestrator:expr) => {
        test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new(IdentityCache::new(&CacheConfig::default())))
                .app_data($orchestrator)
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn bearer(user: &User) -> (&'static str, String) {
    let token = user.generate_access_token().unwrap();
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_owner_can_review_submission() {
    let storage = memory_storage().await;
    let s = seed_scenario(&storage).await;
    let app = init_app!(storage, orchestrator(&storage, "Looks good"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{}/review", s.submission.id))
        .insert_header(bearer(&s.teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["submission_id"], json!(s.submission.id));
    assert_eq!(body["data"]["feedback"], json!("Looks good"));
    assert!(body["data"]["reviewed_at"].is_string());
    assert_eq!(body["message"], json!("Review completed"));

    let stored = storage
        .get_submission_by_id(s.submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.review.map(|r| r.feedback).as_deref(),
        Some("Looks good")
    );
}

#[actix_web::test]
async fn test_review_rejects_other_teacher_and_student() {
    let storage = memory_storage().await;
    let s = seed_scenario(&storage).await;
    let app = init_app!(storage, orchestrator(&storage, "Looks good"));
    let uri = format!("/api/v1/submissions/{}/review", s.submission.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&s.other_teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&s.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let stored = storage
        .get_submission_by_id(s.submission.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.review.is_none());
}

#[actix_web::test]
async fn test_review_unknown_submission() {
    let storage = memory_storage().await;
    let s = seed_scenario(&storage).await;
    let app = init_app!(storage, orchestrator(&storage, "Looks good"));

    let req = test::TestRequest::post()
        .uri("/api/v1/submissions/9999/review")
        .insert_header(bearer(&s.teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_review_requires_token() {
    let storage = memory_storage().await;
    let s = seed_scenario(&storage).await;
    let app = init_app!(storage, orchestrator(&storage, "Looks good"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{}/review", s.submission.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{}/review", s.submission.id))
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_assignment_teacher_only() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_a", RoleSet::teacher(), "x").await;
    let student = create_user(&storage, "student_a", RoleSet::student(), "x").await;
    let app = init_app!(storage, orchestrator(&storage, "unused"));

    let payload = json!({
        "title": "Linked lists",
        "description": "Implement a singly linked list",
        "due_date": "2030-01-01T00:00:00Z"
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header(bearer(&teacher))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], json!("Linked lists"));
    assert_eq!(body["data"]["teacher_id"], json!(teacher.id));

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header(bearer(&student))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_create_assignment_rejects_blank_title() {
    let storage = memory_storage().await;
    let teacher = create_user(&storage, "teacher_a", RoleSet::teacher(), "x").await;
    let app = init_app!(storage, orchestrator(&storage, "unused"));

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header(bearer(&teacher))
        .set_json(json!({
            "title": "   ",
            "description": "",
            "due_date": "2030-01-01T00:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_submission_flow() {
    let storage = memory_storage().await;
    let s = seed_scenario(&storage).await;
    let newcomer = create_user(&storage, "student_b", RoleSet::student(), "x").await;
    let app = init_app!(storage, orchestrator(&storage, "unused"));
    let uri = format!("/api/v1/assignments/{}/submissions", s.assignment.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&newcomer))
        .set_json(json!({"repo_url": "https://github.com/b/calc.git", "commit_ref": "main"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["student_id"], json!(newcomer.id));
    assert_eq!(body["data"]["status"], json!("submitted"));
    assert!(body["data"]["review_feedback"].is_null());

    // 同一学生对同一作业只能提交一次
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&newcomer))
        .set_json(json!({"repo_url": "https://github.com/b/calc"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_create_submission_rejections() {
    let storage = memory_storage().await;
    let s = seed_scenario(&storage).await;
    let newcomer = create_user(&storage, "student_b", RoleSet::student(), "x").await;
    let app = init_app!(storage, orchestrator(&storage, "unused"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/assignments/{}/submissions", s.assignment.id))
        .insert_header(bearer(&newcomer))
        .set_json(json!({"repo_url": "ftp://example.com/repo"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/9999/submissions")
        .insert_header(bearer(&newcomer))
        .set_json(json!({"repo_url": "https://github.com/b/calc"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 教师不能以学生身份提交
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/assignments/{}/submissions", s.assignment.id))
        .insert_header(bearer(&s.teacher))
        .set_json(json!({"repo_url": "https://github.com/t/calc"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let storage = memory_storage().await;
    let app = init_app!(storage, orchestrator(&storage, "unused"));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": "prof_lee",
            "email": "prof_lee@example.com",
            "password": "Sturdy9Harbor",
            "roles": ["teacher"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "prof_lee", "password": "Sturdy9Harbor"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], json!("prof_lee"));
    assert_eq!(body["data"]["is_teacher"], json!(true));
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["username"], json!("prof_lee"));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"username": "prof_lee", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
