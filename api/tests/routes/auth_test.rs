use crate::helpers::make_test_app;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_trainee_returns_account_and_jwt() {
    let app = make_test_app().await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "dave",
                "full_name": "Dave",
                "password": "secret1",
                "role": "trainee",
                "class": "10A",
                "assessment_number": "A-dave"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Account registered successfully");
    assert_eq!(json["data"]["username"], "dave");
    assert_eq!(json["data"]["role"], "trainee");
    assert_eq!(json["data"]["class"], "10A");
    assert!(!json["data"]["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn register_tutor_keeps_subject_map() {
    let app = make_test_app().await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "ms_b",
                "full_name": "Ms B",
                "password": "secret1",
                "role": "tutor",
                "subjects": { "History": ["10A", "12B"] }
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["subjects"]["History"], json!(["10A", "12B"]));
}

#[tokio::test]
async fn register_duplicate_username_is_409() {
    let app = make_test_app().await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "full_name": "Someone Else",
                "password": "secret1",
                "role": "trainee",
                "class": "10A",
                "assessment_number": "A-x"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn register_duplicate_trainee_display_name_is_409() {
    let app = make_test_app().await;

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice2",
                "full_name": "Alice",
                "password": "secret1",
                "role": "trainee",
                "class": "11C",
                "assessment_number": "A-y"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = make_test_app().await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "x",
                "full_name": "X",
                "password": "123",
                "role": "trainee",
                "class": "10A"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("Password must be at least 6 characters"));
    assert!(message.contains("Username must be"));
}

#[tokio::test]
async fn register_trainee_without_class_is_400() {
    let app = make_test_app().await;

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "erin",
                "full_name": "Erin",
                "password": "secret1",
                "role": "trainee"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_succeeds_with_correct_password() {
    let app = make_test_app().await;

    let (status, json) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "mr_t", "password": "password1" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["data"]["role"], "tutor");
    assert_eq!(json["data"]["subjects"]["Mathematics"], json!(["10A"]));
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_user() {
    let app = make_test_app().await;

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "nope-nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "ghost", "password": "password1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
