//! Tower middleware layers for the default transport.
//!
//! Layers wrap the [`HyperTransport`](crate::HyperTransport) service through
//! [`HyperTransportBuilder::layer`](crate::HyperTransportBuilder::layer). Any
//! `tower::Layer` over [`Request`](crate::Request) and
//! [`Response`](crate::Response) can be added the same way.
//!
//! # Example
//!
//! ```ignore
//! use piwik::HyperTransport;
//! use piwik::middleware::LoggingLayer;
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::new())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer, redact_url};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
