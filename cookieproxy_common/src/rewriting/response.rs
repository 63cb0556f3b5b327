use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderValue, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use scorched::{logf, LogData, LogImportance};

use crate::{
    rewriting::{
        cookie::AuthCookie,
        login::{LoginResponse, User},
        rewriter::Rewriter,
    },
    state::CookieConfig,
};

const MAX_LIFETIME_DAYS: i64 = 100 * 365;

/// What a backend body turned out to be, decided by a strict parse.
#[derive(Debug)]
pub enum BackendBody {
    Login { login: LoginResponse, raw: Bytes },
    Opaque(Bytes),
}

impl BackendBody {
    pub fn classify(raw: Bytes) -> Self {
        match serde_json::from_slice::<LoginResponse>(&raw) {
            Ok(login) => BackendBody::Login { login, raw },
            Err(_) => BackendBody::Opaque(raw),
        }
    }
}

/// Result of rewriting one response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseRewrite {
    /// Forward the original bytes, headers untouched.
    Passthrough(Bytes),
    /// Forward `body` and append `set_cookie` as a `Set-Cookie` header.
    Login { set_cookie: HeaderValue, body: Bytes },
}

/// Moves the token of a login response into a cookie and forwards only the user profile.
#[derive(Clone, Debug)]
pub struct ResponseRewriter {
    cookie_name: Arc<str>,
    lifetime: Duration,
}

impl ResponseRewriter {
    pub fn new(config: &CookieConfig) -> Self {
        Self {
            cookie_name: Arc::from(config.name.as_str()),
            lifetime: Duration::days(config.lifetime_days.clamp(0, MAX_LIFETIME_DAYS)),
        }
    }

    /// Only successful responses can carry a login payload.
    pub fn applies_to(&self, status: StatusCode) -> bool {
        status == StatusCode::OK
    }

    pub fn rewrite_at(&self, body: Bytes, now: DateTime<Utc>) -> ResponseRewrite {
        let (LoginResponse { token, user }, raw) = match BackendBody::classify(body) {
            BackendBody::Login { login, raw } => (login, raw),
            BackendBody::Opaque(raw) => return ResponseRewrite::Passthrough(raw),
        };

        let body = match serialize_user(&user) {
            Ok(body) => body,
            Err(e) => {
                logf!(Error, "Error serializing user profile: {:?}", e);
                return ResponseRewrite::Passthrough(raw);
            }
        };

        let cookie = AuthCookie::new(&self.cookie_name, token, now + self.lifetime);

        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(set_cookie) => ResponseRewrite::Login { set_cookie, body },
            Err(e) => {
                logf!(Error, "Error building Set-Cookie header: {:?}", e);
                ResponseRewrite::Passthrough(raw)
            }
        }
    }
}

fn serialize_user(user: &User) -> serde_json::Result<Bytes> {
    serde_json::to_vec(user).map(Bytes::from)
}

impl Rewriter for ResponseRewriter {
    type Input = Bytes;
    type Output = ResponseRewrite;

    fn rewrite(&self, body: Bytes) -> ResponseRewrite {
        self.rewrite_at(body, Utc::now())
    }
}
