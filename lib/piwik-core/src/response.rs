//! HTTP response handling.
//!
//! [`Response`] is what a [`Transport`](crate::Transport) hands back: status,
//! headers, and the complete body.

use std::collections::HashMap;

use bytes::Bytes;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Turn a non-2xx response into [`Error::Http`](crate::Error::Http), keeping the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not 2xx.
    pub fn error_for_status(self) -> crate::Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let message = http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("unexpected status");
        Err(crate::Error::http_with_body(
            self.status,
            message,
            self.body,
        ))
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(self) -> crate::Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_basic() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());

        let response = Response::new(200, headers, Bytes::from("i:1;"));

        assert_eq!(response.status(), 200);
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert!(response.is_success());
        assert_eq!(response.body().as_ref(), b"i:1;");
    }

    #[test]
    fn response_success_range() {
        for status in [200, 204, 299] {
            assert!(Response::new(status, HashMap::new(), Bytes::new()).is_success());
        }
        for status in [199, 301, 404, 500] {
            assert!(!Response::new(status, HashMap::new(), Bytes::new()).is_success());
        }
    }

    #[test]
    fn response_error_for_status() {
        let response = Response::new(204, HashMap::new(), Bytes::new());
        assert!(response.error_for_status().is_ok());

        let response = Response::new(503, HashMap::new(), Bytes::from("maintenance"));
        let err = response.error_for_status().expect_err("5xx");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "HTTP error 503: Service Unavailable");
        assert_eq!(err.body(), Some(&Bytes::from("maintenance")));
    }

    #[test]
    fn response_text() {
        let response = Response::new(200, HashMap::new(), Bytes::from("idsite,name\n1,Demo"));
        assert_eq!(response.text().expect("text"), "idsite,name\n1,Demo");

        let response = Response::new(200, HashMap::new(), Bytes::from_static(b"\xff"));
        let err = response.text().expect_err("invalid utf-8");
        assert!(err.is_deserialization());
    }
}
