use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};

use crate::{rewriting::cookie, rewriting::rewriter::Rewriter, state::CookieConfig};

/// Turns the session cookie into the `Authorization: Bearer` header the backend expects.
#[derive(Clone, Debug)]
pub struct RequestRewriter {
    cookie_name: Arc<str>,
}

impl RequestRewriter {
    pub fn new(config: &CookieConfig) -> Self {
        Self {
            cookie_name: Arc::from(config.name.as_str()),
        }
    }
}

impl Rewriter for RequestRewriter {
    type Input = HeaderMap;
    type Output = HeaderMap;

    /// Requests without the cookie pass through untouched; this never fails.
    fn rewrite(&self, mut headers: HeaderMap) -> HeaderMap {
        let bearer = cookie::lookup(&headers, &self.cookie_name)
            .and_then(|token| HeaderValue::from_str(&format!("Bearer {}", token)).ok());

        if let Some(bearer) = bearer {
            headers.insert(AUTHORIZATION, bearer);
        }

        headers
    }
}
