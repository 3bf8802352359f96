use api::{
    app, auth::generate_jwt, state::AppState,
    ws::attendance::dispatch::spawn_live_update_dispatcher,
};
use axum::{
    Router,
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode, header},
};
use db::{
    models::account::{AccountKind, NewAccount, Role},
    test_utils::setup_test_db,
};
use serde_json::Value;
use services::{AttendanceService, ClassroomSettings, LiveUpdateBus};
use std::net::SocketAddr;
use tower::ServiceExt;
use util::ws::WebSocketManager;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// App over a fresh in-memory database with one tutor and three trainees:
///
/// - `mr_t` ("Mr T") teaches Mathematics to 10A and Science to 11C
/// - `alice` ("Alice") and `bob` ("Bob") in 10A, `carol` ("Carol") in 11C
///
/// Every password is `password1`. Live updates are dispatched to the WS manager.
pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;
    let ws = WebSocketManager::new();
    let (bus, updates) = LiveUpdateBus::channel();
    spawn_live_update_dispatcher(ws.clone(), updates);

    let attendance = AttendanceService::load(db.clone(), bus, ClassroomSettings::default())
        .await
        .unwrap();

    for (username, name, class) in [
        ("alice", "Alice", "10A"),
        ("bob", "Bob", "10A"),
        ("carol", "Carol", "11C"),
    ] {
        attendance
            .register(NewAccount {
                username: username.into(),
                full_name: name.into(),
                password: "password1".into(),
                kind: AccountKind::Trainee {
                    class: class.into(),
                    assessment_number: format!("A-{username}"),
                },
            })
            .await
            .unwrap();
    }
    attendance
        .register(NewAccount {
            username: "mr_t".into(),
            full_name: "Mr T".into(),
            password: "password1".into(),
            kind: AccountKind::Tutor {
                subjects: [
                    ("Mathematics".to_string(), vec!["10A".to_string()]),
                    ("Science".to_string(), vec!["11C".to_string()]),
                ]
                .into_iter()
                .collect(),
            },
        })
        .await
        .unwrap();

    let state = AppState::new(db, ws, attendance);
    let router = app(state.clone()).layer(MockConnectInfo(SocketAddr::from(([10, 0, 0, 7], 40000))));
    TestApp { router, state }
}

pub fn token_for(username: &str, role: Role) -> String {
    generate_jwt(username, role).unwrap().0
}

pub fn tutor_token() -> String {
    token_for("mr_t", Role::Tutor)
}

pub fn trainee_token(username: &str) -> String {
    token_for(username, Role::Trainee)
}

impl TestApp {
    /// Sends a request and returns the status and JSON body (`Null` for non-JSON bodies).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_with(method, uri, token, body, &[]).await
    }

    pub async fn send_with(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Raw response, for endpoints that do not return JSON.
    pub async fn get_raw(&self, uri: &str, token: &str) -> axum::response::Response {
        let req = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(req).await.unwrap()
    }
}
