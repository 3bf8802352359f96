use crate::helpers::app::{trainee_token, tutor_token};
use crate::helpers::make_test_app;
use axum::http::{StatusCode, header};
use serde_json::json;

async fn start_maths(app: &crate::helpers::TestApp, token: &str) {
    let (status, _) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/lesson/start",
            Some(token),
            Some(json!({ "subject": "Mathematics" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn subjects_lists_what_the_tutor_teaches() {
    let app = make_test_app().await;
    let token = tutor_token();

    let (status, json) = app.send("GET", "/api/tutor/subjects", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["Mathematics"], json!(["10A"]));
    assert_eq!(json["data"]["Science"], json!(["11C"]));
}

#[tokio::test]
async fn tutor_routes_require_auth_and_tutor_role() {
    let app = make_test_app().await;

    let (status, _) = app.send("GET", "/api/tutor/subjects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = trainee_token("alice");
    let (status, json) = app.send("GET", "/api/tutor/subjects", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Tutor access required");
}

#[tokio::test]
async fn lesson_lifecycle_start_get_stop() {
    let app = make_test_app().await;
    let token = tutor_token();

    let (_, json) = app
        .send("GET", "/api/tutor/classes/10A/lesson", Some(&token), None)
        .await;
    assert_eq!(json["data"]["state"], "inactive");

    let (status, json) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/lesson/start",
            Some(&token),
            Some(json!({ "subject": "Mathematics", "duration_minutes": 45 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Lesson started successfully");
    assert_eq!(json["data"]["subject"], "Mathematics");
    assert_eq!(json["data"]["tutor"], "Mr T");

    let (_, json) = app
        .send("GET", "/api/tutor/classes/10A/lesson", Some(&token), None)
        .await;
    assert_eq!(json["data"]["state"], "active");
    assert_eq!(json["data"]["subject"], "Mathematics");

    let (status, json) = app
        .send("POST", "/api/tutor/classes/10A/lesson/stop", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["subject"], "Mathematics");

    let (_, json) = app
        .send("GET", "/api/tutor/classes/10A/lesson", Some(&token), None)
        .await;
    assert_eq!(json["data"]["state"], "inactive");
}

#[tokio::test]
async fn start_lesson_for_untaught_subject_is_forbidden() {
    let app = make_test_app().await;
    let token = tutor_token();

    let (status, _) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/lesson/start",
            Some(&token),
            Some(json!({ "subject": "Science" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn start_lesson_validates_duration() {
    let app = make_test_app().await;
    let token = tutor_token();

    let (status, json) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/lesson/start",
            Some(&token),
            Some(json!({ "subject": "Mathematics", "duration_minutes": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Duration must be between 1 and 600 minutes");
}

#[tokio::test]
async fn tokens_need_an_active_lesson() {
    let app = make_test_app().await;
    let token = tutor_token();

    let (status, _) = app
        .send("POST", "/api/tutor/classes/10A/tokens", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn tokens_are_issued_to_every_trainee_of_the_class() {
    let app = make_test_app().await;
    let token = tutor_token();
    start_maths(&app, &token).await;

    let (status, json) = app
        .send("POST", "/api/tutor/classes/10A/tokens", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Tokens generated");
    let tokens = json["data"].as_array().unwrap();
    let names: Vec<&str> = tokens.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
    for t in tokens {
        let value = t["token"].as_str().unwrap();
        assert_eq!(value.len(), 4);
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }
}

#[tokio::test]
async fn marking_updates_percentage_and_rejects_second_mark() {
    let app = make_test_app().await;
    let token = tutor_token();
    start_maths(&app, &token).await;

    let (status, json) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/trainees/alice/present",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "Present");
    assert_eq!(json["data"]["percentage"], 5);

    let (status, _) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/trainees/alice/absent",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/trainees/bob/absent",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "Absent");
    assert_eq!(json["data"]["percentage"], 0);
}

#[tokio::test]
async fn marking_a_trainee_of_another_class_is_404() {
    let app = make_test_app().await;
    let token = tutor_token();
    start_maths(&app, &token).await;

    let (status, _) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/trainees/carol/present",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_lists_every_trainee_with_defaults() {
    let app = make_test_app().await;
    let token = tutor_token();
    start_maths(&app, &token).await;
    app.send(
        "POST",
        "/api/tutor/classes/10A/trainees/bob/present",
        Some(&token),
        None,
    )
    .await;

    let (status, json) = app
        .send(
            "GET",
            "/api/tutor/classes/10A/summary?subject=Mathematics",
            Some(&token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    let alice = rows.iter().find(|r| r["username"] == "alice").unwrap();
    let bob = rows.iter().find(|r| r["username"] == "bob").unwrap();
    assert_eq!(alice["percentage"], 0);
    assert_eq!(alice["status"], "Absent");
    assert_eq!(bob["percentage"], 5);
    assert_eq!(bob["status"], "Present");
    assert_eq!(bob["assessment_number"], "A-bob");
}

#[tokio::test]
async fn summary_export_is_a_csv_attachment() {
    let app = make_test_app().await;
    let token = tutor_token();
    start_maths(&app, &token).await;
    app.send(
        "POST",
        "/api/tutor/classes/10A/trainees/alice/present",
        Some(&token),
        None,
    )
    .await;

    let response = app
        .get_raw("/api/tutor/classes/10A/summary/export?subject=Mathematics", &token)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"attendance_10A_Mathematics_"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Assessment Number,Attendance %,Date,Status")
    );
    let alice = lines.find(|l| l.starts_with("Alice,")).unwrap();
    assert!(alice.starts_with("Alice,A-alice,5,"));
    assert!(alice.ends_with(",Present"));
}

#[tokio::test]
async fn summary_for_untaught_subject_is_forbidden() {
    let app = make_test_app().await;
    let token = tutor_token();

    let (status, _) = app
        .send(
            "GET",
            "/api/tutor/classes/10A/summary?subject=Science",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn history_filters_by_subject_and_class() {
    let app = make_test_app().await;
    let token = tutor_token();
    start_maths(&app, &token).await;
    app.send(
        "POST",
        "/api/tutor/classes/10A/trainees/alice/present",
        Some(&token),
        None,
    )
    .await;
    app.send(
        "POST",
        "/api/tutor/classes/11C/lesson/start",
        Some(&token),
        Some(json!({ "subject": "Science" })),
    )
    .await;
    app.send(
        "POST",
        "/api/tutor/classes/11C/trainees/carol/absent",
        Some(&token),
        None,
    )
    .await;

    let (status, json) = app.send("GET", "/api/tutor/history", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let all = json["data"].as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["trainee"], "alice");
    assert_eq!(all[1]["trainee"], "carol");

    let (_, json) = app
        .send("GET", "/api/tutor/history?subject=Science", Some(&token), None)
        .await;
    let science = json["data"].as_array().unwrap();
    assert_eq!(science.len(), 1);
    assert_eq!(science[0]["status"], "Absent");
    assert_eq!(science[0]["class"], "11C");

    let (_, json) = app
        .send(
            "GET",
            "/api/tutor/history?subject=Science&class=10A",
            Some(&token),
            None,
        )
        .await;
    assert!(json["data"].as_array().unwrap().is_empty());
}
