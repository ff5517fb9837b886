//! The transport seam.
//!
//! The client needs exactly one capability from the network: GET a URL and
//! hand back the complete response. Timeouts, TLS, pooling and status handling
//! live behind this trait. Implement it directly to stub the network in tests.

use std::future::Future;
use std::sync::Arc;

use url::Url;

use crate::{Response, Result};

/// HTTP GET capability consumed by the API client.
///
/// # Example
///
/// ```
/// use piwik_core::{Response, Result, Transport};
/// use url::Url;
///
/// struct Canned(&'static str);
///
/// impl Transport for Canned {
///     async fn get(&self, _url: &Url) -> Result<Response> {
///         Ok(Response::new(200, Default::default(), self.0.into()))
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Perform a GET request and return the full response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be completed:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Non-2xx status, for transports that treat it as a failure
    fn get(&self, url: &Url) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: Transport> Transport for &T {
    fn get(&self, url: &Url) -> impl Future<Output = Result<Response>> + Send {
        (**self).get(url)
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn get(&self, url: &Url) -> impl Future<Output = Result<Response>> + Send {
        (**self).get(url)
    }
}
