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

#[actix_web::test]
async fn subjects_fetch_is_404_until_saved_then_replaced_wholesale() {
    let conn = db::open_db(&temp_dir("colleged-subjects")).expect("open db");
    let state = web::Data::new(api::AppState::new(conn));
    let app = test::init_service(App::new().app_data(state).configure(api::routes)).await;

    // Nothing saved yet.
    let req = test::TestRequest::get()
        .uri("/api/subjects?branch=CSE&semester=3")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    // Both keys are required.
    let req = test::TestRequest::get()
        .uri("/api/subjects?branch=CSE")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let first = json!({
        "branch": "CSE",
        "semester": 3,
        "subjects": [
            { "code": "CS301", "name": "Data Structures", "maxMarks": 100.0, "maxCredits": 4.0 },
            { "code": "CS302", "name": "Operating Systems", "maxMarks": 100.0, "maxCredits": 4.0 }
        ]
    });
    let req = test::TestRequest::post()
        .uri("/api/subjects")
        .set_json(first)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/subjects?branch=CSE&semester=3")
        .to_request();
    let subjects: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(subjects.as_array().expect("array").len(), 2);

    // Second save fully replaces the first list; nothing is merged.
    let second = json!({
        "branch": "CSE",
        "semester": "3",
        "subjects": [
            { "code": "CS310", "name": "Computer Networks", "maxMarks": 100.0, "maxCredits": 3.0 }
        ]
    });
    let req = test::TestRequest::post()
        .uri("/api/subjects")
        .set_json(second)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/subjects?branch=CSE&semester=3")
        .to_request();
    let subjects: serde_json::Value =
        test::read_body_json(test::call_service(&app, req).await).await;
    let subjects = subjects.as_array().expect("array");
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["code"], json!("CS310"));

    // A different (branch, semester) key is untouched.
    let req = test::TestRequest::get()
        .uri("/api/subjects?branch=ECE&semester=3")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn marks_fetch_is_empty_until_saved_then_replaced_wholesale() {
    let conn = db::open_db(&temp_dir("colleged-marks")).expect("open db");
    let state = web::Data::new(api::AppState::new(conn));
    let app = test::init_service(App::new().app_data(state).configure(api::routes)).await;

    // Unsaved marks read as an empty list, not an error.
    let req = test::TestRequest::get()
        .uri("/api/marks?allotedRegistrationName=21cs045&branch=CSE&semester=3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["marks"], json!([]));

    // Missing keys are validation errors.
    let req = test::TestRequest::get()
        .uri("/api/marks?branch=CSE&semester=3")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let first = json!({
        "allotedRegistrationName": "21cs045",
        "branch": "CSE",
        "semester": 3,
        "marks": [
            { "subjectCode": "CS301", "subjectName": "Data Structures", "credits": 4.0, "marksObtained": 78.0 },
            { "subjectCode": "CS302", "subjectName": "Operating Systems", "credits": 4.0, "marksObtained": 64.0 }
        ]
    });
    let req = test::TestRequest::post()
        .uri("/api/marks")
        .set_json(first)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let second = json!({
        "allotedRegistrationName": "21cs045",
        "branch": "CSE",
        "semester": 3,
        "marks": [
            { "subjectCode": "CS301", "subjectName": "Data Structures", "credits": 4.0, "marksObtained": 82.0 }
        ]
    });
    let req = test::TestRequest::post()
        .uri("/api/marks")
        .set_json(second)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/marks?allotedRegistrationName=21cs045&branch=CSE&semester=3")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let marks = body["marks"].as_array().expect("array");
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0]["marksObtained"], json!(82.0));
}

#[actix_web::test]
async fn performance_reports_topper_by_total() {
    let conn = db::open_db(&temp_dir("colleged-performance")).expect("open db");
    let state = web::Data::new(api::AppState::new(conn));
    let app = test::init_service(App::new().app_data(state).configure(api::routes)).await;

    // 21cs001 opens with the best single score but the lower total.
    let records = [
        ("21cs001", vec![(95.0, "CS301"), (10.0, "CS302")]),
        ("21cs002", vec![(70.0, "CS301"), (80.0, "CS302")]),
    ];
    for (reg, subject_marks) in records {
        let marks: Vec<serde_json::Value> = subject_marks
            .iter()
            .map(|(obtained, code)| {
                json!({
                    "subjectCode": code,
                    "subjectName": code,
                    "credits": 4.0,
                    "marksObtained": obtained
                })
            })
            .collect();
        let req = test::TestRequest::post()
            .uri("/api/marks")
            .set_json(json!({
                "allotedRegistrationName": reg,
                "branch": "CSE",
                "semester": 3,
                "marks": marks
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/performance?reg=21cs001&sem=3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;

    assert_eq!(body["studentMarks"].as_array().expect("array").len(), 2);
    assert_eq!(body["topperRegistration"], json!("21cs002"));
    let topper_total: f64 = body["topperMarks"]
        .as_array()
        .expect("array")
        .iter()
        .map(|m| m["marksObtained"].as_f64().expect("number"))
        .sum();
    assert!((topper_total - 150.0).abs() < f64::EPSILON);

    // A student with no record still gets the topper alongside an empty list.
    let req = test::TestRequest::get()
        .uri("/api/performance?reg=21cs999&sem=3")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["studentMarks"], json!([]));
    assert_eq!(body["topperRegistration"], json!("21cs002"));

    // An empty semester has no topper at all.
    let req = test::TestRequest::get()
        .uri("/api/performance?reg=21cs001&sem=7")
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["topperMarks"], json!([]));
    assert_eq!(body["topperRegistration"], json!(null));
}
