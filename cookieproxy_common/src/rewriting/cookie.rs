use std::fmt;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Utc};

/// Every `name=value` pair across all `Cookie` headers, in the order they were sent.
/// Malformed pairs are skipped rather than failing the whole header.
pub fn pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> + '_ {
    headers
        .get_all(COOKIE)
        .iter()
        .flat_map(|value| value.as_bytes().split(|b| *b == b';'))
        .filter_map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?.trim();
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = name.trim();

            if !is_token(name) {
                return None;
            }

            Some((name, parse_value(value.trim())?))
        })
}

/// Value of the cookie called `name`. When the client sent several, the last one wins.
pub fn lookup<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    pairs(headers)
        .filter(|(candidate, _)| *candidate == name)
        .last()
        .map(|(_, value)| value)
}

fn parse_value(raw: &str) -> Option<&str> {
    let value = match raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(unquoted) => unquoted,
        None => raw,
    };

    value.bytes().all(is_value_byte).then_some(value)
}

fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}

fn is_value_byte(b: u8) -> bool {
    (0x20..0x7f).contains(&b) && !matches!(b, b'"' | b';' | b'\\')
}

/// A `Set-Cookie` directive carrying the session token back to the browser.
///
/// No `Secure` or `SameSite` attribute is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub http_only: bool,
}

impl AuthCookie {
    pub fn new(name: &str, value: String, expires: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            value,
            expires,
            http_only: true,
        }
    }
}

impl fmt::Display for AuthCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: String = self
            .value
            .chars()
            .filter(|c| c.is_ascii() && is_value_byte(*c as u8))
            .collect();

        if value.contains([' ', ',']) {
            write!(f, "{}=\"{}\"", self.name, value)?;
        } else {
            write!(f, "{}={}", self.name, value)?;
        }

        write!(
            f,
            "; Expires={}",
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT")
        )?;

        if self.http_only {
            write!(f, "; HttpOnly")?;
        }

        Ok(())
    }
}
