use crate::helpers::app::{trainee_token, tutor_token};
use crate::helpers::{connect_ws, make_test_app, next_json, spawn_server};
use futures::SinkExt;
use serde_json::json;
use serial_test::serial;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Sends `sync` and waits for the reply, which also proves the subscription is live.
async fn sync(ws: &mut crate::helpers::ws::WsClient) -> serde_json::Value {
    ws.send(Message::Text(r#"{"type":"sync"}"#.into()))
        .await
        .unwrap();
    next_json(ws).await
}

#[tokio::test]
#[serial]
async fn trainee_receives_token_on_private_channel() {
    let app = make_test_app().await;
    let addr = spawn_server(app.router.clone()).await;

    let mut ws = connect_ws(addr, "trainees/alice", &trainee_token("alice"))
        .await
        .unwrap();
    let state = sync(&mut ws).await;
    assert_eq!(state["event"], "token.state");
    assert_eq!(state["topic"], "trainee:alice");
    assert!(state["payload"]["token"].is_null());

    let tutor = tutor_token();
    app.send(
        "POST",
        "/api/tutor/classes/10A/lesson/start",
        Some(&tutor),
        Some(json!({ "subject": "Mathematics" })),
    )
    .await;
    let (_, issued) = app
        .send("POST", "/api/tutor/classes/10A/tokens", Some(&tutor), None)
        .await;
    let expected = issued["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["username"] == "alice")
        .unwrap()["token"]
        .clone();

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["type"], "event");
    assert_eq!(frame["event"], "token.issued");
    assert_eq!(frame["topic"], "trainee:alice");
    assert_eq!(frame["payload"]["trainee"], "alice");
    assert_eq!(frame["payload"]["token"], expected);

    let state = sync(&mut ws).await;
    assert_eq!(state["payload"]["token"], expected);
}

#[tokio::test]
#[serial]
async fn class_channel_sees_lesson_and_marks() {
    let app = make_test_app().await;
    let addr = spawn_server(app.router.clone()).await;

    let mut ws = connect_ws(addr, "classes/10A", &trainee_token("bob"))
        .await
        .unwrap();
    let state = sync(&mut ws).await;
    assert_eq!(state["event"], "lesson.state");
    assert_eq!(state["payload"]["active"], false);

    let tutor = tutor_token();
    app.send(
        "POST",
        "/api/tutor/classes/10A/lesson/start",
        Some(&tutor),
        Some(json!({ "subject": "Mathematics" })),
    )
    .await;
    let frame = next_json(&mut ws).await;
    assert_eq!(frame["event"], "lesson.activated");
    assert_eq!(frame["topic"], "class:10A");
    assert_eq!(frame["payload"]["subject"], "Mathematics");
    assert_eq!(frame["payload"]["tutor"], "Mr T");

    app.send(
        "POST",
        "/api/tutor/classes/10A/trainees/alice/present",
        Some(&tutor),
        None,
    )
    .await;
    let frame = next_json(&mut ws).await;
    assert_eq!(frame["event"], "attendance.marked");
    assert_eq!(frame["payload"]["trainee"], "alice");
    assert_eq!(frame["payload"]["trainee_name"], "Alice");
    assert_eq!(frame["payload"]["status"], "Present");
    assert_eq!(frame["payload"]["percentage"], 5);

    app.send("POST", "/api/tutor/classes/10A/lesson/stop", Some(&tutor), None)
        .await;
    let frame = next_json(&mut ws).await;
    assert_eq!(frame["event"], "lesson.stopped");
    assert_eq!(frame["payload"]["class"], "10A");
}

#[tokio::test]
#[serial]
async fn tutor_may_follow_a_class_they_teach() {
    let app = make_test_app().await;
    let addr = spawn_server(app.router.clone()).await;

    let mut ws = connect_ws(addr, "classes/11C", &tutor_token()).await.unwrap();
    let state = sync(&mut ws).await;
    assert_eq!(state["payload"]["class"], "11C");
}

#[tokio::test]
#[serial]
async fn foreign_channels_are_refused() {
    let app = make_test_app().await;
    let addr = spawn_server(app.router.clone()).await;

    match connect_ws(addr, "trainees/alice", &trainee_token("bob")).await {
        Err(WsError::Http(resp)) => assert_eq!(resp.status(), 403),
        other => panic!("expected 403, got {other:?}"),
    }
    match connect_ws(addr, "classes/11C", &trainee_token("alice")).await {
        Err(WsError::Http(resp)) => assert_eq!(resp.status(), 403),
        other => panic!("expected 403, got {other:?}"),
    }
    match connect_ws(addr, "classes/10A", "not-a-jwt").await {
        Err(WsError::Http(resp)) => assert_eq!(resp.status(), 401),
        other => panic!("expected 401, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn app_level_ping_gets_a_pong() {
    let app = make_test_app().await;
    let addr = spawn_server(app.router.clone()).await;

    let mut ws = connect_ws(addr, "classes/10A", &trainee_token("alice"))
        .await
        .unwrap();
    ws.send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .unwrap();
    let frame = next_json(&mut ws).await;
    assert_eq!(frame["event"], "pong");
}
