//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types for easy glob
//! importing:
//!
//! ```ignore
//! use piwik::prelude::*;
//! ```

pub use crate::{
    CallOutput, ClientConfig, Error, Format, HyperTransport, NaiveDate, ParamValue, Params,
    PhpValue, PiwikClient, Result, Transport,
};
pub use serde::Deserialize;
