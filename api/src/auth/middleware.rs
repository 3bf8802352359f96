use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::{Origin, UserAgent};
use std::{net::SocketAddr, time::Instant};

use crate::auth::claims::AuthUser;

/// Request logging layer. Skips CORS preflight `OPTIONS` requests.
///
/// ```ignore
/// let app = Router::new().layer(axum::middleware::from_fn(log_request));
/// ```
///
/// Logs `method`, `path`, `ip`, `user` (username or `anonymous`), `origin`, `user_agent`
/// when the request arrives, then `status` and `elapsed_ms` once it has been handled.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();

    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map(|AuthUser(c)| c.sub)
        .unwrap_or_else(|_| "anonymous".into());
    let origin = TypedHeader::<Origin>::from_request_parts(&mut parts, &())
        .await
        .map(|TypedHeader(o)| o.to_string())
        .unwrap_or_else(|_| "unknown".into());
    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &())
        .await
        .map(|TypedHeader(ua)| ua.to_string())
        .unwrap_or_else(|_| "unknown".into());

    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    tracing::info!(
        method = %method,
        path = %path,
        ip = %addr.ip(),
        user = %user,
        origin = %origin,
        user_agent = %user_agent,
        "Incoming request"
    );

    let started = Instant::now();
    let response = next.run(Request::from_parts(parts, body)).await;
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
