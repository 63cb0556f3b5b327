pub mod error;
pub mod proxy;
pub mod rewriting;
pub mod state;

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use error::Result;
use reqwest::redirect::Policy;
use scorched::{logf, LogData, LogImportance};
use state::{Config, ProxyState};
use tower_http::trace::TraceLayer;

/// The client used to reach the backend. Redirects are handed back to the browser untouched.
pub fn client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .zstd(true)
        .build()
}

/// Every method and path goes through the same proxy handler.
pub fn app(state: ProxyState) -> Router {
    Router::new()
        .fallback(proxy::service::proxy)
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve<F>(config: Arc<Config>, graceful_shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = ProxyState::new(&config, client()?)?;

    let listener = tokio::net::TcpListener::bind(config.host).await?;

    logf!(
        Info,
        "Proxying {} to {}",
        listener.local_addr()?,
        state.backend
    );

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(graceful_shutdown)
    .await?;

    Ok(())
}
