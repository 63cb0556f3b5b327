//! Mock authentication backend and proxy setup shared by the integration tests.

use std::{io, net::SocketAddr};

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, HeaderName, StatusCode,
    },
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use cookieproxy_common::{
    app, client,
    state::{Config, ProxyState},
};
use serde_json::json;
use tokio::net::TcpListener;

pub const LOGIN_BODY: &str =
    r#"{"token":"xyz","user":{"username":"bob","createdDate":"2024-01-01","roles":[1,2]}}"#;

pub const USER_BODY: &str = r#"{"username":"bob","createdDate":"2024-01-01","roles":[1,2]}"#;

pub const ERROR_BODY: &str = r#"{"error":"invalid credentials"}"#;

/// A cookie the backend sets on its own, which must reach the client untouched.
pub const BACKEND_COOKIE: &str = "theme=dark; Path=/";

fn json_body(status: StatusCode, body: &'static str) -> impl IntoResponse {
    (
        status,
        [
            (CONTENT_TYPE, "application/json"),
            (HeaderName::from_static("x-backend"), "1"),
            (SET_COOKIE, BACKEND_COOKIE),
        ],
        body,
    )
}

/// Reports what the backend actually received.
async fn whoami(headers: HeaderMap) -> Json<serde_json::Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    Json(json!({
        "authorization": header("authorization"),
        "host": header("host"),
        "forwardedFor": header("x-forwarded-for"),
        "cookie": header("cookie"),
        "acceptEncoding": header("accept-encoding"),
    }))
}

async fn echo(req: Request) -> String {
    format!("{} {}", req.method(), req.uri())
}

async fn broken() -> Body {
    Body::from_stream(futures_util::stream::iter(vec![
        Ok(Bytes::from_static(b"{\"token\":")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "backend died")),
    ]))
}

/// Start a mock backend on an ephemeral port.
pub async fn start_backend() -> SocketAddr {
    let app = Router::new()
        .route("/api/login", post(|| async { json_body(StatusCode::OK, LOGIN_BODY) }))
        .route(
            "/api/login/created",
            post(|| async { json_body(StatusCode::CREATED, LOGIN_BODY) }),
        )
        .route(
            "/api/login/rejected",
            post(|| async { json_body(StatusCode::UNAUTHORIZED, ERROR_BODY) }),
        )
        .route(
            "/api/login/soft-error",
            post(|| async { json_body(StatusCode::OK, ERROR_BODY) }),
        )
        .route("/api/whoami", get(whoami))
        .route("/api/broken", get(broken))
        .route("/echo/*rest", any(echo));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Build the proxy app pointing at `backend`.
pub fn proxy_to(backend: &str) -> Router {
    let config = Config {
        backend: backend.to_string(),
        ..Config::default()
    };

    app(ProxyState::new(&config, client().unwrap()).unwrap())
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
