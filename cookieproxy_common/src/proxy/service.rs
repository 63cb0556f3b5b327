use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    debug_handler,
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    response::Response,
};
use hyper::header::{ACCEPT_ENCODING, CONTENT_LENGTH, HOST, SET_COOKIE};
use hyper::{HeaderMap, StatusCode};

use crate::{
    error::{Result, RewriteError},
    rewriting::{response::ResponseRewrite, rewriter::Rewriter},
    state::ProxyState,
};

use super::util::{authority, forwarded_for, strip_hop_by_hop, target_url};

#[debug_handler]
pub async fn proxy(
    State(state): State<Arc<ProxyState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request,
) -> Result<Response> {
    let (parts, body) = req.into_parts();

    let body_bytes = to_bytes(body, usize::MAX).await?;

    let client_ip = connect_info.map(|ConnectInfo(addr)| addr.ip());
    let mut headers = forwarded_for(
        strip_hop_by_hop(state.request_rewriter.rewrite(parts.headers)),
        client_ip,
    );

    headers.insert(HOST, HeaderValue::from_str(&authority(&state.backend))?);

    // reqwest decodes these for us, so the rewriter always sees plain JSON
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, br, deflate, zstd"),
    );

    let res = state
        .client
        .request(parts.method, target_url(&state.backend, &parts.uri))
        .headers(headers)
        .body(body_bytes)
        .send()
        .await?;

    let status = res.status();
    let mut headers = strip_hop_by_hop(res.headers().clone());

    if !state.response_rewriter.applies_to(status) {
        return Ok(build_response(
            status,
            headers,
            Body::from_stream(res.bytes_stream()),
        ));
    }

    let body = res.bytes().await.map_err(RewriteError::BodyRead)?;

    let body = match state.response_rewriter.rewrite(body) {
        ResponseRewrite::Passthrough(body) => body,
        ResponseRewrite::Login { set_cookie, body } => {
            headers.remove(CONTENT_LENGTH);
            headers.append(SET_COOKIE, set_cookie);
            body
        }
    };

    Ok(build_response(status, headers, Body::from(body)))
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
