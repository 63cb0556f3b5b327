use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::rewriting::{request::RequestRewriter, response::ResponseRewriter};

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Settings for the session cookie handed to the browser
pub struct CookieConfig {
    /// Name of the cookie carrying the bearer token
    pub name: String,
    /// How long the browser keeps the cookie after a successful login
    pub lifetime_days: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        CookieConfig {
            name: "authtoken".to_string(),
            lifetime_days: 365,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// The listen address for the proxy server
    pub host: SocketAddr,
    /// Base URL of the authentication backend, e.g. `https://localhost:7023`
    pub backend: String,
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: SocketAddr::from(([0, 0, 0, 0], 8080)),
            backend: "https://localhost:7023".to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

impl Config {
    /// Parses and checks the backend origin. Only absolute http(s) URLs with a host are accepted.
    pub fn backend_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.backend).map_err(|source| ConfigError::InvalidBackend {
            backend: self.backend.clone(),
            source,
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(url),
            _ => Err(ConfigError::MissingHost(self.backend.clone())),
        }
    }
}

#[derive(Clone)]
/// The state that is passed to the proxy handler
pub struct ProxyState {
    pub backend: Url,
    pub client: reqwest::Client,
    pub request_rewriter: RequestRewriter,
    pub response_rewriter: ResponseRewriter,
}

impl ProxyState {
    pub fn new(config: &Config, client: reqwest::Client) -> Result<Self, ConfigError> {
        let backend = config.backend_url()?;

        Ok(ProxyState {
            backend,
            client,
            request_rewriter: RequestRewriter::new(&config.cookie),
            response_rewriter: ResponseRewriter::new(&config.cookie),
        })
    }
}
