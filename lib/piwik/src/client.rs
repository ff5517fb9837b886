//! Default HTTP transport using hyper-util.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use url::Url;

use crate::{
    Error, Request, Response, Result, Transport,
    config::ClientConfig,
    connector::https_connector,
    middleware::LoggingLayer,
};

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request, Response, Error>;

/// Future type for the Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Makes the boxed service `Sync`, which [`Transport`] requires.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request) -> ServiceFuture {
        // Lock, clone the service, and release the lock immediately
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

/// The innermost service: one GET over a pooled hyper connection.
#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl RawHyperClient {
    fn new(config: ClientConfig) -> Self {
        let connector = https_connector(&config);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    fn build_hyper_request(&self, request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (url, headers) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::GET)
            .uri(url.as_str());

        let has_user_agent = headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("user-agent"));
        if !has_user_agent {
            builder = builder.header(http::header::USER_AGENT, self.config.user_agent.as_str());
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(Full::default())
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let hyper_request = self.build_hyper_request(request)?;

        // The deadline covers the body as well as the response head.
        let exchange = async {
            let response = self
                .inner
                .request(hyper_request)
                .await
                .map_err(Self::map_hyper_error)?;

            let status = response.status().as_u16();
            let headers = Self::extract_headers(response.headers());
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| Error::connection(e.to_string()))?
                .to_bytes();

            Ok(Response::new(status, headers, body))
        };

        tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout)?
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Service<Request> for RawHyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

/// The default [`Transport`]: hyper-util with connection pooling, rustls and
/// optional Tower middleware.
///
/// A response with a non-2xx status becomes [`Error::Http`] carrying the body.
///
/// # Example
///
/// ```ignore
/// use piwik::HyperTransport;
/// use std::time::Duration;
///
/// let transport = HyperTransport::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    service: SyncService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with custom configuration and no middleware.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let raw = RawHyperClient::new(config.clone());
        Self::with_service(BoxCloneService::new(raw), config)
    }

    fn with_service(service: BoxedService, config: ClientConfig) -> Self {
        Self {
            service: SyncService::new(service),
            config,
        }
    }

    /// Create a new transport builder.
    #[must_use]
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::default()
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    async fn get(&self, url: &Url) -> Result<Response> {
        self.service
            .call(Request::get(url.clone()))
            .await?
            .error_for_status()
    }
}

impl Service<Request> for HyperTransport {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperTransport`].
#[derive(Default)]
pub struct HyperTransportBuilder {
    config: ClientConfig,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperTransportBuilder {
    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the request timeout, covering connect, headers and body.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a Tower layer around the transport.
    ///
    /// Layers are applied in order: first added = innermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Log each request and its outcome at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each request with its headers at debug level.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the transport.
    #[must_use]
    pub fn build(self) -> HyperTransport {
        let config = self.config;
        let mut service: BoxedService = BoxCloneService::new(RawHyperClient::new(config.clone()));

        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HyperTransport::with_service(service, config)
    }
}
