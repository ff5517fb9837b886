//! Core types for the piwik Reporting API client.
//!
//! This crate provides the network-free building blocks used by `piwik`:
//! - [`Params`] and [`ParamValue`] - Ordered, typed API parameters
//! - [`encode_query`] and [`form_urlencode`] - Query string encoding
//! - [`Format`] - Response formats accepted by the API
//! - [`unserialize`], [`PhpValue`], [`PhpKey`] - Serialized-PHP decoding
//! - [`ApiResponse`] and [`CallOutput`] - Response decoding and error envelopes
//! - [`Transport`] - The GET capability the client is built on
//! - [`Request`] and [`Response`] - HTTP request/response types
//! - [`Error`] and [`Result`] - Error handling

mod api_response;
mod error;
mod format;
mod params;
mod php;
pub mod prelude;
mod query;
mod request;
mod response;
mod transport;

pub use api_response::{ApiResponse, CallOutput, decode_json, from_json};
pub use error::{Error, Result};
pub use format::Format;
pub use params::{ParamValue, Params};
pub use php::{PhpKey, PhpValue, unserialize};
pub use query::{encode_query, form_urlencode};
pub use request::Request;
pub use response::Response;
pub use transport::Transport;

// Re-export date types accepted as parameter values
pub use chrono::{NaiveDate, NaiveDateTime};
