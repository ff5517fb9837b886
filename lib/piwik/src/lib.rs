//! Async client for the Piwik / Matomo Reporting API.
//!
//! The Reporting API is a method-call interface over HTTP GET: every call names
//! a `Module.action` method, carries its arguments in the query string, and
//! picks a response format. This crate builds those requests, sends them
//! through a pluggable [`Transport`], and decodes the `php` format into
//! [`PhpValue`]s.
//!
//! # Example
//!
//! ```ignore
//! use piwik::prelude::*;
//!
//! let client = PiwikClient::builder()
//!     .base_url("https://stats.example.org/index.php")
//!     .token(std::env::var("PIWIK_TOKEN_AUTH")?)
//!     .build()?;
//!
//! let params = Params::new()
//!     .with("idSite", 1)
//!     .with("period", "day")
//!     .with("date", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
//!
//! match client.call("VisitsSummary.get", &params, Format::Php).await? {
//!     CallOutput::Structured(value) => println!("{:?}", value.get("nb_visits")),
//!     CallOutput::Text(text) => println!("{text}"),
//! }
//! ```
//!
//! # Crates
//!
//! - `piwik-core` holds the network-free parts: parameters, query encoding,
//!   the `php` decoder and the error type.
//! - this crate adds [`PiwikClient`] and the default hyper-based transport.

mod api_client;
mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;

pub use api_client::{ANONYMOUS_TOKEN, PiwikClient, PiwikClientBuilder};
pub use client::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_USER_AGENT};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use piwik_core::{
    ApiResponse, CallOutput, Error, Format, NaiveDate, NaiveDateTime, ParamValue, Params, PhpKey,
    PhpValue, Request, Response, Result, Transport, decode_json, encode_query, form_urlencode,
    from_json, unserialize,
};

pub use url;
