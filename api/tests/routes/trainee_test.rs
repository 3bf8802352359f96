use crate::helpers::app::{trainee_token, tutor_token};
use crate::helpers::{TestApp, make_test_app};
use axum::http::StatusCode;
use serde_json::json;

async fn start_maths(app: &TestApp) {
    let (status, _) = app
        .send(
            "POST",
            "/api/tutor/classes/10A/lesson/start",
            Some(&tutor_token()),
            Some(json!({ "subject": "Mathematics" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn trainee_routes_reject_tutors() {
    let app = make_test_app().await;

    let (status, json) = app
        .send("GET", "/api/trainee/me", Some(&tutor_token()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Trainee access required");
}

#[tokio::test]
async fn me_shows_every_subject_and_the_active_lesson() {
    let app = make_test_app().await;
    let alice = trainee_token("alice");

    let (status, json) = app.send("GET", "/api/trainee/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["class"], "10A");
    assert_eq!(json["data"]["assessment_number"], "A-alice");
    assert_eq!(json["data"]["percentages"]["Mathematics"], 0);
    assert_eq!(json["data"]["percentages"]["Science"], 0);
    assert!(json["data"]["active_lesson"].is_null());

    start_maths(&app).await;
    let (_, json) = app.send("GET", "/api/trainee/me", Some(&alice), None).await;
    assert_eq!(json["data"]["active_lesson"]["subject"], "Mathematics");
}

#[tokio::test]
async fn active_lesson_is_409_when_none_runs() {
    let app = make_test_app().await;
    let alice = trainee_token("alice");

    let (status, _) = app.send("GET", "/api/trainee/lesson", Some(&alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    start_maths(&app).await;
    let (status, json) = app.send("GET", "/api/trainee/lesson", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["tutor"], "Mr T");
}

#[tokio::test]
async fn token_is_fetched_once_issued_and_consumed_on_submit() {
    let app = make_test_app().await;
    let alice = trainee_token("alice");

    let (status, json) = app.send("GET", "/api/trainee/token", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["token"].is_null());
    assert_eq!(json["message"], "Your tutor has not generated a token yet");

    start_maths(&app).await;
    let (_, issued) = app
        .send("POST", "/api/tutor/classes/10A/tokens", Some(&tutor_token()), None)
        .await;
    let expected = issued["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["username"] == "alice")
        .unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (_, json) = app.send("GET", "/api/trainee/token", Some(&alice), None).await;
    assert_eq!(json["data"]["token"], expected.as_str());

    let (status, _) = app
        .send(
            "POST",
            "/api/trainee/token",
            Some(&alice),
            Some(json!({ "token": "not-it" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .send(
            "POST",
            "/api/trainee/token",
            Some(&alice),
            Some(json!({ "token": expected })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Token accepted");

    let (status, _) = app
        .send(
            "POST",
            "/api/trainee/token",
            Some(&alice),
            Some(json!({ "token": expected })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_token_fails_validation() {
    let app = make_test_app().await;
    let (status, json) = app
        .send(
            "POST",
            "/api/trainee/token",
            Some(&trainee_token("alice")),
            Some(json!({ "token": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Token is required");
}

#[tokio::test]
async fn attendance_needs_an_active_lesson() {
    let app = make_test_app().await;
    let (status, _) = app
        .send("POST", "/api/trainee/attendance", Some(&trainee_token("alice")), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn one_device_marks_one_trainee_per_lesson() {
    let app = make_test_app().await;
    start_maths(&app).await;
    let phone = [("user-agent", "Phone/1.0"), ("accept-language", "en")];

    let (status, json) = app
        .send_with(
            "POST",
            "/api/trainee/attendance",
            Some(&trainee_token("alice")),
            None,
            &phone,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Attendance marked successfully");
    assert_eq!(json["data"]["percentage"], 5);

    let (status, _) = app
        .send_with(
            "POST",
            "/api/trainee/attendance",
            Some(&trainee_token("alice")),
            None,
            &[("user-agent", "Laptop/2.0")],
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send_with(
            "POST",
            "/api/trainee/attendance",
            Some(&trainee_token("bob")),
            None,
            &phone,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send_with(
            "POST",
            "/api/trainee/attendance",
            Some(&trainee_token("bob")),
            None,
            &[("user-agent", "Tablet/3.0")],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn self_mark_shows_up_in_overview() {
    let app = make_test_app().await;
    start_maths(&app).await;
    let alice = trainee_token("alice");

    app.send("POST", "/api/trainee/attendance", Some(&alice), None)
        .await;

    let (_, json) = app.send("GET", "/api/trainee/me", Some(&alice), None).await;
    assert_eq!(json["data"]["percentages"]["Mathematics"], 5);
}
