//! Error types for piwik.

use derive_more::{Display, Error, From};

/// Main error type for piwik operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// HTTP-level errors (non-2xx status codes).
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request: bad API method name, unknown format, unbuildable request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// The `php` response body is not valid serialized PHP.
    #[display("deserialization error at byte {offset}: {message}")]
    #[from(skip)]
    Deserialization {
        /// Byte offset in the body where decoding failed.
        offset: usize,
        /// Error message.
        message: String,
    },

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "0.main_url").
        path: String,
        /// Error message.
        message: String,
    },

    /// The response body is not valid UTF-8 text.
    #[display("response body is not valid UTF-8: {_0}")]
    #[from]
    InvalidText(std::string::FromUtf8Error),

    /// The API answered with an error envelope (`result` = `"error"`).
    #[display("API error: {message}")]
    #[from(skip)]
    Api {
        /// Message provided by the server.
        message: String,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a serialized-PHP deserialization error.
    #[must_use]
    pub fn deserialization(offset: usize, message: impl Into<String>) -> Self {
        Self::Deserialization {
            offset,
            message: message.into(),
        }
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an API error from the server-provided message.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Returns `true` if the request could not be completed by the transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Connection(_) | Self::Tls(_) | Self::Timeout
        )
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the response body could not be decoded.
    #[must_use]
    pub const fn is_deserialization(&self) -> bool {
        matches!(
            self,
            Self::Deserialization { .. } | Self::JsonDeserialization { .. } | Self::InvalidText(_)
        )
    }

    /// Returns `true` if the API reported an error envelope.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// The server-provided message if this is an API error.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message } => Some(message),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::api("You can't access this resource");
        assert_eq!(err.to_string(), "API error: You can't access this resource");

        let err = Error::deserialization(12, "expected ';'");
        assert_eq!(
            err.to_string(),
            "deserialization error at byte 12: expected ';'"
        );
    }

    #[test]
    fn error_kinds() {
        assert!(Error::http(500, "Internal Server Error").is_transport());
        assert!(Error::connection("refused").is_transport());
        assert!(Error::tls("bad certificate").is_transport());
        assert!(Error::Timeout.is_transport());
        assert!(!Error::api("nope").is_transport());

        assert!(Error::deserialization(0, "empty").is_deserialization());
        assert!(Error::json_deserialization("0.name", "missing").is_deserialization());
        assert!(!Error::Timeout.is_deserialization());
    }

    #[test]
    fn error_api_message() {
        let err = Error::api("Invalid token");
        assert!(err.is_api());
        assert_eq!(err.api_message(), Some("Invalid token"));

        assert_eq!(Error::Timeout.api_message(), None);
    }

    #[test]
    fn error_status_and_body() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.status(), Some(404));
        assert!(err.body().is_none());

        let body = bytes::Bytes::from("gone");
        let err = Error::http_with_body(410, "Gone", body.clone());
        assert_eq!(err.body(), Some(&body));

        assert_eq!(Error::Timeout.status(), None);
    }

    #[test]
    fn error_from_url_parse() {
        let err: Error = url::Url::parse("not a url").expect_err("invalid").into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
