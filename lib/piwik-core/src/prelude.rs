//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use piwik_core::prelude::*;
//! ```

pub use crate::{
    ApiResponse, CallOutput, Error, Format, NaiveDate, ParamValue, Params, PhpValue, Response,
    Result, Transport, encode_query, unserialize,
};
