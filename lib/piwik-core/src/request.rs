//! HTTP GET requests handed to transport middleware.
//!
//! # Example
//!
//! ```
//! use piwik_core::Request;
//!
//! let request = Request::get("https://demo.matomo.cloud/index.php".parse().unwrap())
//!     .header("Accept", "text/plain");
//! assert_eq!(request.header("Accept"), Some("text/plain"));
//! ```

use std::collections::HashMap;

use url::Url;

/// An HTTP GET request with URL and headers.
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    headers: HashMap<String, String>,
}

impl Request {
    /// Creates a GET request for the URL.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: HashMap::new(),
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Consume into (url, headers).
    #[must_use]
    pub fn into_parts(self) -> (Url, HashMap<String, String>) {
        (self.url, self.headers)
    }
}
