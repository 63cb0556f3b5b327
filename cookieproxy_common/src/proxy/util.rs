use std::net::IpAddr;

use axum::http::{header::CONNECTION, HeaderMap, HeaderValue, Uri};
use url::Url;

/// Headers that describe a single connection and must not cross the proxy.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Where a request for `uri` should go on the backend. The backend base path and the
/// request path are joined by exactly one slash, and both query strings are kept.
pub fn target_url(backend: &Url, uri: &Uri) -> String {
    let path = join_paths(backend.path(), uri.path());

    let query = match (
        backend.query().filter(|q| !q.is_empty()),
        uri.query().filter(|q| !q.is_empty()),
    ) {
        (Some(base), Some(request)) => format!("?{}&{}", base, request),
        (Some(query), None) | (None, Some(query)) => format!("?{}", query),
        (None, None) => String::new(),
    };

    format!("{}{}{}", backend.origin().ascii_serialization(), path, query)
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// The value the backend expects in `Host`, with the port only when it is not the default.
pub fn authority(backend: &Url) -> String {
    let host = backend.host_str().unwrap_or_default();

    match backend.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Drops hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in listed.iter().map(String::as_str).chain(HOP_BY_HOP.iter().copied()) {
        headers.remove(name);
    }

    headers
}

/// Appends the client address to `X-Forwarded-For`, keeping whatever earlier proxies put there.
pub fn forwarded_for(mut headers: HeaderMap, client: Option<IpAddr>) -> HeaderMap {
    let Some(client) = client else {
        return headers;
    };

    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client.to_string()
    } else {
        format!("{}, {}", prior.join(", "), client)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }

    headers
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn joins_backend_and_request() {
        let uri: Uri = "/api/login?next=%2F".parse().unwrap();

        assert_eq!(
            target_url(&url("https://localhost:7023"), &uri),
            "https://localhost:7023/api/login?next=%2F"
        );
        assert_eq!(
            target_url(&url("http://auth.internal/v1?tenant=a"), &uri),
            "http://auth.internal/v1/api/login?tenant=a&next=%2F"
        );
        assert_eq!(
            target_url(&url("http://auth.internal/v1/"), &"/".parse().unwrap()),
            "http://auth.internal/v1/"
        );
    }

    #[test]
    fn authority_omits_default_port() {
        assert_eq!(authority(&url("https://localhost:7023")), "localhost:7023");
        assert_eq!(authority(&url("https://auth.example.com:443")), "auth.example.com");
    }

    #[test]
    fn strips_connection_scoped_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("close, x-trace"));
        headers.insert("x-trace", HeaderValue::from_static("1"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let headers = strip_hop_by_hop(headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("content-type"));
    }

    #[test]
    fn appends_client_to_forwarded_for() {
        let client = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));

        let headers = forwarded_for(HeaderMap::new(), client);
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.2");

        let headers = forwarded_for(headers, Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert_eq!(headers[X_FORWARDED_FOR], "10.0.0.2, 127.0.0.1");

        assert!(forwarded_for(HeaderMap::new(), None).is_empty());
    }
}
