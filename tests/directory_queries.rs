use actix_web::{http::StatusCode, test, web, App};
use serde_json::json;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use colleged::{api, db};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn student(first: &str, reg: &str, gmail: &str, branch: &str, section: &str) -> serde_json::Value {
    json!({
        "firstName": first,
        "allotedRegistrationName": reg,
        "branch": branch,
        "section": section,
        "gmail": gmail,
        "phoneNumber": format!("90000{}", reg.len()),
        "password": "pw-123456",
        "confirmPassword": "pw-123456"
    })
}

/// (uri, payload) pairs every test in this file starts from.
fn seed_requests() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        (
            "/api/register",
            student("Ravi", "21cs045", "ravi@college.edu", "CSE", "A"),
        ),
        (
            "/api/register",
            student("Priya", "21ec012", "priya@college.edu", "ECE", "B"),
        ),
        (
            "/api/register",
            student("Ravindra", "22cs001", "ravindra@college.edu", "CSE", "B"),
        ),
        (
            "/api/register-teacher",
            json!({
                "firstName": "Meena",
                "branch": "CSE",
                "section": "A",
                "subjectsTaught": ["Data Structures"],
                "gmail": "meena@college.edu",
                "phoneNumber": "9111111111",
                "password": "pw-123456"
            }),
        ),
    ]
}

fn names(students: &serde_json::Value, role_key: &str) -> Vec<String> {
    students
        .as_array()
        .expect("array")
        .iter()
        .map(|entry| {
            entry[role_key]["firstName"]
                .as_str()
                .expect("firstName")
                .to_string()
        })
        .collect()
}

#[actix_web::test]
async fn student_list_filters_compose() {
    let conn = db::open_db(&temp_dir("colleged-dir-students")).expect("open db");
    let state = web::Data::new(api::AppState::new(conn));
    let app = test::init_service(App::new().app_data(state).configure(api::routes)).await;
    for (uri, payload) in seed_requests() {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(payload)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    // Substring search is case-insensitive and spans name/registration/email/phone.
    let req = test::TestRequest::get().uri("/api/students?q=RAV").to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(names(&body, "student"), vec!["Ravi", "Ravindra"]);

    let req = test::TestRequest::get()
        .uri("/api/students?q=21ec")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(names(&body, "student"), vec!["Priya"]);

    // Exact section/branch filters stack on top of the substring search.
    let req = test::TestRequest::get()
        .uri("/api/students?branch=CSE")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(names(&body, "student"), vec!["Ravi", "Ravindra"]);

    let req = test::TestRequest::get()
        .uri("/api/students?q=rav&section=B")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(names(&body, "student"), vec!["Ravindra"]);

    let req = test::TestRequest::get()
        .uri("/api/students?q=nobody")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body.as_array().expect("array").is_empty());
}

#[actix_web::test]
async fn single_student_lookup_round_trips() {
    let conn = db::open_db(&temp_dir("colleged-dir-single")).expect("open db");
    let state = web::Data::new(api::AppState::new(conn));
    let app = test::init_service(App::new().app_data(state).configure(api::routes)).await;
    for (uri, payload) in seed_requests() {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(payload)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/students?q=priya")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = body[0]["id"].as_str().expect("id").to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/students/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(profile["allotedRegistrationName"], json!("21ec012"));
    assert!(profile.get("password").is_none());

    let req = test::TestRequest::get()
        .uri("/api/students/no-such-id")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn teacher_directory_and_lookup() {
    let conn = db::open_db(&temp_dir("colleged-dir-teachers")).expect("open db");
    let state = web::Data::new(api::AppState::new(conn));
    let app = test::init_service(App::new().app_data(state).configure(api::routes)).await;
    for (uri, payload) in seed_requests() {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(payload)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/teachers?q=meena")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(names(&body, "teacher"), vec!["Meena"]);
    let id = body[0]["id"].as_str().expect("id").to_string();

    // A student never shows up in the teacher directory.
    let req = test::TestRequest::get()
        .uri("/api/teachers?q=ravi")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body.as_array().expect("array").is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/teachers/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(profile["subjectsTaught"], json!(["Data Structures"]));

    let req = test::TestRequest::get()
        .uri("/api/teachers/no-such-id")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
