use crate::helpers::make_test_app;
use axum::http::StatusCode;

#[tokio::test]
async fn health_reports_database_ok() {
    let app = make_test_app().await;

    let (status, json) = app.send("GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["database"], "ok");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = make_test_app().await;
    let (status, _) = app.send("GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
