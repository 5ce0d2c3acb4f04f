mod common;

use std::sync::Arc;

use actix_web::{
    http::{header::AUTHORIZATION, StatusCode},
    test, web, App,
};
use serde_json::{json, Value};

use common::TestContext;
use deepsleep_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

const CLASS_ID: &str = "Ort-High_7_3";

async fn test_state() -> Arc<AppState> {
    let ctx = TestContext::new();
    let state = AppState::from_repositories(Config::from_env(), ctx.repositories());
    state
        .user_service
        .ensure_manager_seed("manager", "manager-password")
        .await
        .unwrap();
    Arc::new(state)
}

macro_rules! init_app {
    ($state:expr) => {{
        let state: Arc<AppState> = $state;
        let jwt = web::Data::from(Arc::clone(&state.jwt_service));
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(jwt)
                .wrap(RequestIdMiddleware)
                .configure(handlers::configure),
        )
        .await
    }};
}

/// Status of a request whether it was answered by a handler or rejected by
/// middleware.
macro_rules! status_of {
    ($app:expr, $req:expr) => {
        match test::try_call_service(&$app, $req).await {
            Ok(res) => res.status(),
            Err(err) => err.as_response_error().status_code(),
        }
    };
}

macro_rules! login {
    ($app:expr, $role:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "role": $role, "username": $username, "password": $password }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

fn full_entry(student_id: &str) -> Value {
    json!({
        "experimentId": "exp1",
        "classId": CLASS_ID,
        "studentId": student_id,
        "entry": {
            "date": "2024-01-10",
            "grade": "z",
            "gender": "female",
            "bed_entry_time": "21_24",
            "eye_close_decision": "immediate",
            "pre_sleep_activity": ["phone", "book"],
            "time_to_fall_asleep": "15_or_less",
            "wakeups_count": "1",
            "awake_duration_total": "under_5",
            "wake_up_time": "6_7",
            "wake_up_method": "alarm",
            "total_sleep_estimate": "7_8"
        }
    })
}

#[actix_web::test]
async fn health_is_public() {
    let app = init_app!(test_state().await);

    let req = test::TestRequest::get().uri("/health").to_request();
    assert_eq!(status_of!(app, req), StatusCode::OK);

    // No database behind the in-memory repositories.
    let req = test::TestRequest::get().uri("/health/ready").to_request();
    assert_eq!(status_of!(app, req), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn protected_routes_require_token() {
    let app = init_app!(test_state().await);

    let req = test::TestRequest::get()
        .uri("/api/questions/pending")
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/questions/pending")
        .insert_header((AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn student_registers_logs_in_and_submits() {
    let app = init_app!(test_state().await);

    let req = test::TestRequest::post()
        .uri("/api/students/register")
        .set_json(json!({
            "experimentId": "exp1",
            "username": "dana",
            "password": "pw1",
            "schoolName": "Ort High",
            "grade": "7",
            "classNum": "3"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let user: Value = test::read_body_json(res).await;
    assert_eq!(user["classId"], CLASS_ID);
    assert!(user.get("passwordHash").is_none());
    let student_id = user["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/students/register")
        .set_json(json!({
            "experimentId": "exp1",
            "username": "dana",
            "password": "pw2",
            "schoolName": "Ort High",
            "grade": "7",
            "classNum": "4"
        }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::CONFLICT);

    let token = login!(app, "student", "dana", "pw1");
    let bearer = (AUTHORIZATION, format!("Bearer {}", token));

    let req = test::TestRequest::get()
        .uri(&format!("/api/classes/exp1/{}/form", CLASS_ID))
        .insert_header(bearer.clone())
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    let steps = form["steps"].as_array().unwrap();
    assert_eq!(steps.last().unwrap()["key"], "notes");

    let incomplete = json!({
        "experimentId": "exp1",
        "classId": CLASS_ID,
        "studentId": student_id,
        "entry": { "grade": "z" }
    });
    let req = test::TestRequest::post()
        .uri("/api/sleep/entry")
        .insert_header(bearer.clone())
        .set_json(incomplete)
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/sleep/entry")
        .insert_header(bearer.clone())
        .set_json(full_entry(&student_id))
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["success"], true);
    assert_eq!(saved["docId"], format!("{}_2024-01-10", student_id));

    let req = test::TestRequest::post()
        .uri("/api/sleep/entry")
        .insert_header(bearer.clone())
        .set_json(full_entry("someone-else"))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/sleep/progress?experimentId=exp1&classId={}&studentId={}",
            CLASS_ID, student_id
        ))
        .insert_header(bearer)
        .to_request();
    let progress: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(progress["count"], 1);
    assert!(progress["lastSubmissionAt"].is_string());

    let manager = login!(app, "researchManager", "manager", "manager-password");
    let req = test::TestRequest::get()
        .uri("/api/reports/stats")
        .insert_header((AUTHORIZATION, format!("Bearer {}", manager)))
        .to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["totalEntries"], 1);
    assert_eq!(stats["distributions"]["pre_sleep_activity"]["phone"], 1);
}

#[actix_web::test]
async fn anonymous_entry_requires_existing_class() {
    let state = test_state().await;
    state
        .experiment_service
        .create_class("exp1", "Ort High", "7", "3")
        .await
        .unwrap();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/classes/exp1/missing-class/anonymous")
        .set_json(json!({ "code": "1234" }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/api/classes/exp1/{}/anonymous", CLASS_ID))
        .set_json(json!({ "code": "1234" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["id"], "1234");
    assert_eq!(body["user"]["isAnonymous"], true);
    assert!(body["token"].is_string());
}

#[actix_web::test]
async fn malformed_login_and_entry_bodies_are_rejected() {
    let app = init_app!(test_state().await);

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "role": "student", "username": "", "password": "pw1" }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "role": "student", "username": "dana", "password": "x".repeat(201) }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::BAD_REQUEST);

    // Rejected before the class is looked up.
    let req = test::TestRequest::post()
        .uri("/api/classes/exp1/missing-class/anonymous")
        .set_json(json!({ "code": "12" }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/classes/exp1/missing-class/anonymous")
        .set_json(json!({ "code": "1".repeat(21) }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn teacher_proposes_and_manager_approves() {
    let state = test_state().await;
    let app = init_app!(state);

    let manager = login!(app, "researchManager", "manager", "manager-password");
    let manager_auth = (AUTHORIZATION, format!("Bearer {}", manager));

    let req = test::TestRequest::post()
        .uri("/api/teachers")
        .insert_header(manager_auth.clone())
        .set_json(json!({
            "experimentId": "exp1",
            "fullName": "Rina Levi",
            "email": "rina@school.org",
            "password": "secret",
            "schoolName": "Ort High",
            "grade": "7",
            "classNum": "3"
        }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::CREATED);

    let teacher = login!(app, "teacher", "rina@school.org", "secret");
    let teacher_auth = (AUTHORIZATION, format!("Bearer {}", teacher));

    let req = test::TestRequest::post()
        .uri("/api/questions/requests")
        .insert_header(teacher_auth.clone())
        .set_json(json!({ "text": "Do you drink coffee?", "type": "select", "options": "Yes, No" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let request_id = created["id"].as_str().unwrap().to_string();

    // Teachers cannot moderate.
    let req = test::TestRequest::get()
        .uri("/api/questions/pending")
        .insert_header(teacher_auth.clone())
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/questions/pending")
        .insert_header(manager_auth.clone())
        .to_request();
    let pending: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["class_id"], CLASS_ID);

    let req = test::TestRequest::post()
        .uri("/api/questions/approve")
        .insert_header(manager_auth)
        .set_json(json!({ "items": [{
            "originalId": request_id,
            "finalText": "Do you drink coffee?",
            "category": "nutrition",
            "type": "select",
            "options": ["Yes", "No"],
            "classId": CLASS_ID,
            "experimentId": "exp1"
        }]}))
        .to_request();
    let outcome: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(outcome["approved"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/classes/exp1/{}/questions", CLASS_ID))
        .insert_header(teacher_auth)
        .to_request();
    let questions: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(questions[0]["category"], "nutrition");
}
