pub mod decoder;

pub use decoder::Utf8ChunkDecoder;

use reqwest::Client;
use std::time::Duration;

use crate::transport::error::TransportError;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Total request timeout. `None` leaves long streams alone; a stalled
    /// stream is ended by stopping the session instead.
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            user_agent: Some(format!("coursebot/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// The limit behind a reqwest timeout. Without a total timeout only the
    /// connect timeout can fire.
    #[must_use]
    pub const fn timeout_for(&self, during_connect: bool) -> Duration {
        match self.timeout {
            Some(total) if !during_connect => total,
            _ => self.connect_timeout,
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        let inner = builder.build().map_err(|e| {
            TransportError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self { inner, config })
    }

    #[must_use]
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.inner.post(url)
    }

    pub(crate) fn map_error(&self, err: &reqwest::Error) -> TransportError {
        TransportError::from_reqwest(err, self.config.timeout_for(err.is_connect()))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
