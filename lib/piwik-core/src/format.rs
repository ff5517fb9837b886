//! Response formats.

use std::str::FromStr;

use derive_more::Display;

/// Output format requested from the Reporting API (`format=` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Format {
    /// PHP `serialize()` output, decoded and checked for error envelopes.
    #[default]
    #[display("php")]
    Php,
    /// XML.
    #[display("xml")]
    Xml,
    /// JSON.
    #[display("json")]
    Json,
    /// Comma-separated values.
    #[display("csv")]
    Csv,
    /// Tab-separated values.
    #[display("tsv")]
    Tsv,
    /// HTML table.
    #[display("html")]
    Html,
    /// The report's native representation.
    #[display("original")]
    Original,
}

impl Format {
    /// All formats, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Php,
        Self::Xml,
        Self::Json,
        Self::Csv,
        Self::Tsv,
        Self::Html,
        Self::Original,
    ];

    /// Wire name of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Php => "php",
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Html => "html",
            Self::Original => "original",
        }
    }

    /// Returns `true` if responses are decoded rather than passed through.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Php)
    }
}

impl FromStr for Format {
    type Err = crate::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| crate::Error::invalid_request(format!("unknown format: {value}")))
    }
}
