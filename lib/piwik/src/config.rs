//! Settings for [`HyperTransport`](crate::HyperTransport).
//!
//! Reporting calls are plain GETs against one host. The settings cover
//! deadlines, keep-alive pooling and the `User-Agent` header.

use std::time::Duration;

/// `User-Agent` used unless [`ClientConfigBuilder::user_agent`] overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("piwik-rs/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POOL_IDLE_PER_HOST: usize = 32;
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Network settings of the hyper-backed transport.
///
/// ```
/// use std::time::Duration;
/// use piwik::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .timeout(Duration::from_secs(120))
///     .user_agent("nightly-export/1.0")
///     .build();
///
/// assert_eq!(config.connect_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on one API call, from sending the URL to the last body byte.
    pub timeout: Duration,
    /// Upper bound on TCP connect plus TLS handshake.
    pub connect_timeout: Duration,
    /// Keep-alive connections parked per host between calls.
    pub pool_idle_per_host: usize,
    /// How long a parked connection may sit unused before it is closed.
    pub pool_idle_timeout: Duration,
    /// Sent as the `User-Agent` header unless the request already carries one.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_idle_per_host: DEFAULT_POOL_IDLE_PER_HOST,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Start from the defaults and override selected settings.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Chained setters over a default [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Deadline for a whole call, body included.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Deadline for establishing a connection to the Piwik host.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Number of idle keep-alive connections kept per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// Lifetime of an idle keep-alive connection.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Replace the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Finish and return the settings.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
