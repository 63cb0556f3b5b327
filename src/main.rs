use std::sync::Arc;

use cookieproxy_common::{error::Result, serve, state::Config};
use scorched::{logf, LogData, LogImportance};

const APP_NAME: &str = "cookieproxy";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let path = confy::get_configuration_file_path(APP_NAME, None)?;
    let config: Config = confy::load(APP_NAME, None)?;

    // A bad origin is fatal here, before anything is bound.
    let backend = config.backend_url()?;

    logf!(
        Info,
        "Loaded {}: listening on {}, forwarding to {}, session cookie `{}`",
        path.display(),
        config.host,
        backend,
        config.cookie.name
    );

    serve(Arc::new(config), shutdown_signal()).await?;

    logf!(Info, "Stopped forwarding to {}", backend);

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix. A signal source that cannot be installed is
/// logged and then never fires, so the proxy keeps running on the other one.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                logf!(Error, "Cannot listen for SIGTERM: {:?}", e);
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;

    logf!(Info, "Shutdown requested, draining in-flight requests");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logf!(Error, "Cannot listen for Ctrl+C: {:?}", e);
        std::future::pending::<()>().await;
    }
}
