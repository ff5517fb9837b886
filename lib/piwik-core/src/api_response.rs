//! Decoding of API response bodies.
//!
//! The API reports failures inside a successful HTTP response, as an error
//! envelope:
//!
//! ```text
//! a:2:{s:6:"result";s:5:"error";s:7:"message";s:13:"Invalid token";}
//! ```
//!
//! [`ApiResponse::decode`] separates those envelopes from real results for the
//! `php` format. [`decode_json`] does the same for typed JSON decoding.

use crate::{Error, Format, PhpValue, Result, unserialize};

const RESULT_KEY: &str = "result";
const MESSAGE_KEY: &str = "message";
const ERROR_RESULT: &str = "error";

/// A decoded `php` response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// The call succeeded with this value.
    Success(PhpValue),
    /// The server answered with an error envelope.
    Error {
        /// Server-provided message.
        message: String,
    },
}

impl ApiResponse {
    /// Decode a serialized PHP body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialization`] if the body is not serialized PHP.
    /// An error envelope is not an error here: it decodes to [`ApiResponse::Error`].
    pub fn decode(body: &[u8]) -> Result<Self> {
        unserialize(body).map(Self::from_value)
    }

    /// Classify an already decoded value.
    ///
    /// A mapping whose `result` entry is the string `"error"` is an error
    /// envelope; anything else, including non-mapping values, is a success.
    #[must_use]
    pub fn from_value(value: PhpValue) -> Self {
        let is_error = value.get(RESULT_KEY).and_then(PhpValue::as_str) == Some(ERROR_RESULT);
        if !is_error {
            return Self::Success(value);
        }

        let message = value
            .get(MESSAGE_KEY)
            .and_then(PhpValue::as_str)
            .unwrap_or_default()
            .to_owned();
        Self::Error { message }
    }

    /// Returns `true` for an error envelope.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Convert into a result, turning the envelope into [`Error::Api`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] with the server message for an error envelope.
    pub fn into_result(self) -> Result<PhpValue> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error { message } => Err(Error::api(message)),
        }
    }
}

/// Outcome of a successful API call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    /// Decoded `php` response.
    Structured(PhpValue),
    /// Verbatim body for every other format.
    Text(String),
}

impl CallOutput {
    /// Decode a response body according to the requested format.
    ///
    /// # Errors
    ///
    /// - [`Error::Api`] for a `php` error envelope
    /// - [`Error::Deserialization`] for an undecodable `php` body
    /// - [`Error::InvalidText`] for a non-UTF-8 body in any other format
    pub fn decode(format: Format, body: &[u8]) -> Result<Self> {
        if format.is_structured() {
            return ApiResponse::decode(body)?.into_result().map(Self::Structured);
        }
        String::from_utf8(body.to_vec())
            .map(Self::Text)
            .map_err(Into::into)
    }

    /// The decoded value, if structured.
    #[must_use]
    pub const fn as_structured(&self) -> Option<&PhpValue> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The raw text, if not structured.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Consume into the decoded value, if structured.
    #[must_use]
    pub fn into_structured(self) -> Option<PhpValue> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Consume into the raw text, if not structured.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] with the path to the failing field
/// (e.g., `[0].idsite`).
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}

/// Deserialize a `json` response body, surfacing error envelopes.
///
/// # Errors
///
/// - [`Error::Api`] if the body is `{"result": "error", "message": ...}`
/// - [`Error::JsonDeserialization`] if the body does not match `T`
///
/// # Example
///
/// ```
/// use piwik_core::decode_json;
///
/// let ids: Vec<u32> = decode_json(b"[1,3]")?;
/// assert_eq!(ids, [1, 3]);
///
/// let err = decode_json::<Vec<u32>>(br#"{"result":"error","message":"denied"}"#).unwrap_err();
/// assert_eq!(err.api_message(), Some("denied"));
/// # Ok::<(), piwik_core::Error>(())
/// ```
pub fn decode_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let value: serde_json::Value = from_json(bytes)?;

    if value.get(RESULT_KEY).and_then(serde_json::Value::as_str) == Some(ERROR_RESULT) {
        let message = value
            .get(MESSAGE_KEY)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        return Err(Error::api(message));
    }

    serde_path_to_error::deserialize(value)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    const ERROR_ENVELOPE: &[u8] =
        br#"a:2:{s:6:"result";s:5:"error";s:7:"message";s:13:"Invalid token";}"#;

    #[test]
    fn decode_error_envelope() {
        let response = ApiResponse::decode(ERROR_ENVELOPE).expect("decodes");
        check!(
            response
                == ApiResponse::Error {
                    message: "Invalid token".to_string()
                }
        );
        check!(response.is_error());

        let_assert!(Err(err) = response.into_result());
        check!(err.api_message() == Some("Invalid token"));
    }

    #[test]
    fn decode_success_envelope() {
        let body = br#"a:2:{s:6:"result";s:7:"success";s:7:"message";s:2:"ok";}"#;
        let value = ApiResponse::decode(body)
            .expect("decodes")
            .into_result()
            .expect("success");

        check!(value.get("result").and_then(PhpValue::as_str) == Some("success"));
        check!(value.get("message").and_then(PhpValue::as_str) == Some("ok"));
    }

    #[test]
    fn non_mapping_values_are_successes() {
        let response = ApiResponse::decode(b"i:12;").expect("decodes");
        check!(response == ApiResponse::Success(PhpValue::Int(12)));
        check!(!ApiResponse::decode(br#"s:5:"error";"#).expect("decodes").is_error());
        check!(!ApiResponse::decode(b"N;").expect("decodes").is_error());
    }

    #[test]
    fn envelope_without_message_has_empty_message() {
        let response = ApiResponse::decode(br#"a:1:{s:6:"result";s:5:"error";}"#).expect("decodes");
        check!(
            response
                == ApiResponse::Error {
                    message: String::new()
                }
        );
    }

    #[test]
    fn non_string_result_is_not_an_error() {
        let response = ApiResponse::decode(br#"a:1:{s:6:"result";b:1;}"#).expect("decodes");
        check!(!response.is_error());
    }

    #[test]
    fn decode_rejects_invalid_body() {
        let_assert!(Err(err) = ApiResponse::decode(b"<result>error</result>"));
        check!(err.is_deserialization());
    }

    #[test]
    fn call_output_structured() {
        let output = CallOutput::decode(Format::Php, b"i:5;").expect("decodes");
        check!(output.as_structured() == Some(&PhpValue::Int(5)));
        check!(output.as_text().is_none());
        check!(output.into_structured() == Some(PhpValue::Int(5)));

        let_assert!(Err(err) = CallOutput::decode(Format::Php, ERROR_ENVELOPE));
        check!(err.is_api());
    }

    #[test]
    fn call_output_passes_other_formats_through() {
        let body = br#"{"result":"error","message":"Invalid token"}"#;
        for format in [Format::Json, Format::Xml, Format::Csv, Format::Original] {
            let output = CallOutput::decode(format, body).expect("passes through");
            check!(output.as_text() == Some(r#"{"result":"error","message":"Invalid token"}"#));
        }

        let output = CallOutput::decode(Format::Csv, ERROR_ENVELOPE).expect("passes through");
        let text = output.into_text().expect("text output");
        check!(text.as_bytes() == ERROR_ENVELOPE);
    }

    #[test]
    fn call_output_rejects_non_utf8_text() {
        let_assert!(Err(Error::InvalidText(_)) = CallOutput::decode(Format::Html, b"\xff\xfe"));
    }

    #[test]
    fn decode_json_typed() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Site {
            idsite: u32,
            name: String,
        }

        let sites: Vec<Site> = decode_json(br#"[{"idsite":1,"name":"Demo"}]"#).expect("decodes");
        check!(
            sites
                == [Site {
                    idsite: 1,
                    name: "Demo".to_string()
                }]
        );

        let_assert!(
            Err(Error::JsonDeserialization { path, .. }) =
                decode_json::<Vec<Site>>(br#"[{"idsite":"x","name":"Demo"}]"#)
        );
        check!(path == "[0].idsite");
    }

    #[test]
    fn decode_json_error_envelope() {
        let_assert!(
            Err(err) = decode_json::<serde_json::Value>(br#"{"result":"error","message":"denied"}"#)
        );
        check!(err.api_message() == Some("denied"));

        let value: serde_json::Value =
            decode_json(br#"{"result":"success","message":"ok"}"#).expect("success");
        check!(value["message"] == "ok");
    }

    #[test]
    fn from_json_syntax_error() {
        let_assert!(Err(err) = from_json::<serde_json::Value>(b"not json"));
        check!(err.to_string().contains("JSON deserialization error"));
    }
}
