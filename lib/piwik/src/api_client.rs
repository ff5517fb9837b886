//! The Reporting API client.
//!
//! [`PiwikClient`] turns `call(method, params, format)` into one GET against
//! the API endpoint and decodes the reply. It holds the base URL and the auth
//! token; the network is whatever [`Transport`] it was built with.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, debug_span, warn};
use url::Url;

use crate::{
    ApiResponse, CallOutput, ClientConfig, Error, Format, HyperTransport,
    Params, PhpValue, Result, Transport, decode_json, encode_query, middleware::redact_url,
};

/// Token sent when no credentials are configured.
pub const ANONYMOUS_TOKEN: &str = "anonymous";

/// Client for the Piwik / Matomo Reporting API.
///
/// # Example
///
/// ```ignore
/// use piwik::{Format, Params, PiwikClient};
///
/// let client = PiwikClient::builder()
///     .base_url("https://stats.example.org/index.php")
///     .token("c0ffee")
///     .build()?;
///
/// let params = Params::new().with("idSite", 1).with("period", "day").with("date", "today");
/// let summary = client.call_php("VisitsSummary.get", &params).await?;
/// let csv = client.call_text("VisitsSummary.get", &params, Format::Csv).await?;
/// ```
#[derive(Clone)]
pub struct PiwikClient<T> {
    transport: T,
    base_url: Url,
    token: String,
}

impl<T: fmt::Debug> fmt::Debug for PiwikClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token == ANONYMOUS_TOKEN {
            ANONYMOUS_TOKEN
        } else {
            "***"
        };
        f.debug_struct("PiwikClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &token)
            .field("transport", &self.transport)
            .finish()
    }
}

impl<T> PiwikClient<T> {
    /// Create a client for the given API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL cannot be parsed.
    pub fn new(transport: T, base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self::with_url(transport, base_url, token))
    }

    /// Create a client that authenticates as the anonymous user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL cannot be parsed.
    pub fn anonymous(transport: T, base_url: impl AsRef<str>) -> Result<Self> {
        Self::new(transport, base_url, ANONYMOUS_TOKEN)
    }

    /// Create a client with a pre-parsed URL.
    #[must_use]
    pub fn with_url(transport: T, base_url: Url, token: impl Into<String>) -> Self {
        Self {
            transport,
            base_url,
            token: token.into(),
        }
    }

    /// The API endpoint, without the call's query string.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The `token_auth` value sent with every call.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get a reference to the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Consume the client and return the transport.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// The exact URL [`call`](Self::call) sends for these arguments.
    ///
    /// `module`, `method`, `token_auth` and `format` are merged into a copy of
    /// `params`. A caller value under one of those keys is overwritten where it
    /// stands; missing keys are appended in that order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `method` is not of the form
    /// `Module.action`.
    pub fn request_url(&self, method: &str, params: &Params, format: Format) -> Result<Url> {
        validate_method(method)?;

        let mut merged = params.clone();
        merged.insert("module", "API");
        merged.insert("method", method);
        merged.insert("token_auth", self.token.as_str());
        merged.insert("format", format.as_str());

        let query = encode_query(&merged);
        let query = match self.base_url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
            _ => query,
        };

        let mut url = self.base_url.clone();
        url.set_query(Some(&query));
        Ok(url)
    }
}

impl PiwikClient<HyperTransport> {
    /// Create a builder that constructs the default transport.
    #[must_use]
    pub fn builder() -> PiwikClientBuilder {
        PiwikClientBuilder::default()
    }
}

impl<T: Transport> PiwikClient<T> {
    /// Call an API method.
    ///
    /// With [`Format::Php`] the body is decoded and checked for an error
    /// envelope. Every other format is returned verbatim as text.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] for a malformed method name (nothing is sent)
    /// - Transport errors ([`Error::Http`], [`Error::Connection`], [`Error::Timeout`], ...)
    /// - [`Error::Deserialization`] if a `php` body is malformed
    /// - [`Error::Api`] if a `php` body is an error envelope
    /// - [`Error::InvalidText`] if a text body is not UTF-8
    pub async fn call(&self, method: &str, params: &Params, format: Format) -> Result<CallOutput> {
        if format.is_structured() {
            return self.call_php(method, params).await.map(CallOutput::Structured);
        }
        self.call_text(method, params, format).await.map(CallOutput::Text)
    }

    /// Call an API method with `format=php` and return the decoded value.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn call_php(&self, method: &str, params: &Params) -> Result<PhpValue> {
        let body = self.fetch(method, params, Format::Php).await?;
        let result = ApiResponse::decode(&body)?.into_result();
        if let Err(err) = &result {
            warn!(api_method = method, error = %err, "API returned an error envelope");
        }
        result
    }

    /// Call an API method and return the body as text.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] for [`Format::Php`], which is decoded rather
    /// than returned as text. Otherwise see [`call`](Self::call).
    pub async fn call_text(&self, method: &str, params: &Params, format: Format) -> Result<String> {
        if format.is_structured() {
            return Err(Error::invalid_request(format!(
                "format {format} is decoded, use call_php"
            )));
        }
        let body = self.fetch(method, params, format).await?;
        Ok(String::from_utf8(body.to_vec())?)
    }

    /// Call an API method with `format=json` and deserialize the body.
    ///
    /// A JSON error envelope is reported as [`Error::Api`].
    ///
    /// # Errors
    ///
    /// [`Error::JsonDeserialization`] with the failing path if the body does
    /// not match `D`. Otherwise see [`call`](Self::call).
    pub async fn call_json<D: DeserializeOwned>(&self, method: &str, params: &Params) -> Result<D> {
        let body = self.fetch(method, params, Format::Json).await?;
        decode_json(&body).inspect_err(|err| {
            if err.is_api() {
                warn!(api_method = method, error = %err, "API returned an error envelope");
            }
        })
    }

    /// Call an API method with `format=php` and deserialize the decoded value.
    ///
    /// # Errors
    ///
    /// [`Error::JsonDeserialization`] if the value does not match `D`.
    /// Otherwise see [`call`](Self::call).
    pub async fn call_as<D: DeserializeOwned>(&self, method: &str, params: &Params) -> Result<D> {
        self.call_php(method, params).await?.deserialize()
    }

    async fn fetch(&self, method: &str, params: &Params, format: Format) -> Result<Bytes> {
        let url = self.request_url(method, params, format)?;
        let span = debug_span!("piwik_call", api_method = method, %format);

        async {
            debug!(url = %redact_url(&url), "sending API call");
            let response = self.transport.get(&url).await?;
            debug!(
                status = response.status(),
                bytes = response.body().len(),
                "API call answered"
            );
            Ok::<_, Error>(response.into_body())
        }
        .instrument(span)
        .await
    }
}

fn validate_method(method: &str) -> Result<()> {
    match method.split_once('.') {
        Some((module, action))
            if !module.is_empty() && !action.is_empty() && !action.contains('.') =>
        {
            Ok(())
        }
        _ => Err(Error::invalid_request(format!(
            "method must look like Module.action, got {method:?}"
        ))),
    }
}

/// Builder for a [`PiwikClient`] over the default [`HyperTransport`].
#[derive(Debug, Default)]
pub struct PiwikClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    config: ClientConfig,
    logging: bool,
}

impl PiwikClientBuilder {
    /// Set the API endpoint, e.g. `https://stats.example.org/index.php`.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the `token_auth` value. Defaults to `anonymous`.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace the transport configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Log every HTTP exchange through [`LoggingLayer`](crate::middleware::LoggingLayer).
    #[must_use]
    pub const fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if no base URL was set
    /// - [`Error::InvalidUrl`] if the base URL cannot be parsed
    pub fn build(self) -> Result<PiwikClient<HyperTransport>> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::invalid_request("base URL is required"))?;

        let mut transport = HyperTransport::builder().config(self.config);
        if self.logging {
            transport = transport.with_logging();
        }

        let token = self.token.unwrap_or_else(|| ANONYMOUS_TOKEN.to_string());
        PiwikClient::new(transport.build(), base_url, token)
    }
}
