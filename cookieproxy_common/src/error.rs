use core::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scorched::{logf, LogData, LogImportance};
use thiserror::Error;

// Make our own error that wraps `anyhow::Error`.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

pub type Result<T> = std::result::Result<T, AppError>;

// An aborted exchange reaches the client as a bare 502, the same as any reverse proxy
// that failed to talk to its upstream. No payload is made up for it.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        logf!(Error, "Aborting proxied exchange: {:#}", self.0);

        StatusCode::BAD_GATEWAY.into_response()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
// `Result<_, AppError>`. That way you don't need to do that manually.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Startup failures. There is no degraded mode, every variant stops the server.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The backend origin `{backend}` is not a valid URL")]
    InvalidBackend {
        backend: String,
        #[source]
        source: url::ParseError,
    },
    #[error("The backend origin must use http or https, got `{0}`")]
    UnsupportedScheme(String),
    #[error("The backend origin `{0}` has no host")]
    MissingHost(String),
}

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Failed to read the backend response body")]
    BodyRead(#[source] reqwest::Error),
}
