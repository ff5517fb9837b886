//! Query string encoding for Reporting API calls.
//!
//! [`encode_query`] turns an ordered [`Params`] set into the query string the
//! API expects:
//!
//! | value | key | output |
//! |-------|-----|--------|
//! | list | `name[]` | `name[0]=a&name[1]=b` (strings and numbers only) |
//! | list | `name` | `name=a,b` |
//! | date | any | `name=2013-01-01` |
//! | bool | any | `name=1` / `name=0` |
//! | string, number | any | `name=<form-encoded>` |
//!
//! Keys are written as given.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{ParamValue, Params};

/// Bytes escaped by HTML form encoding: everything but alphanumerics and `-_.`.
const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

const BRACKET_SUFFIX: &str = "[]";

/// Encode a value the way an HTML form submission does.
///
/// Alphanumerics and `-_.` pass through, space becomes `+`, every other byte
/// becomes `%XX`.
///
/// # Example
///
/// ```
/// use piwik_core::form_urlencode;
///
/// assert_eq!(form_urlencode("category 1"), "category+1");
/// assert_eq!(form_urlencode("127.0.*.*"), "127.0.%2A.%2A");
/// assert_eq!(form_urlencode("UTC+3"), "UTC%2B3");
/// ```
#[must_use]
pub fn form_urlencode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for (index, part) in value.split(' ').enumerate() {
        if index > 0 {
            encoded.push('+');
        }
        encoded.extend(utf8_percent_encode(part, FORM));
    }
    encoded
}

/// Encode an ordered parameter set into a query string (without the leading `?`).
///
/// Terms follow the input order. A `[]`-suffixed key holding a list expands to
/// indexed terms and only string or numeric elements are kept, so an empty
/// list under such a key produces no term at all.
///
/// # Example
///
/// ```
/// use piwik_core::{Params, encode_query};
///
/// let params = Params::new()
///     .with("urls[]", vec!["http://example.com"])
///     .with("searchCategoryParameters", vec!["category 1", "category 2"])
///     .with("ecommerce", true);
///
/// assert_eq!(
///     encode_query(&params),
///     "urls[0]=http%3A%2F%2Fexample.com&searchCategoryParameters=category+1,category+2&ecommerce=1"
/// );
/// ```
#[must_use]
pub fn encode_query(params: &Params) -> String {
    let mut terms = Vec::with_capacity(params.len());

    for (key, value) in params.iter() {
        match (key.strip_suffix(BRACKET_SUFFIX), value) {
            (Some(name), ParamValue::List(items)) => {
                terms.extend(
                    items
                        .iter()
                        .enumerate()
                        .filter(|(_, item)| item.is_scalar())
                        .map(|(index, item)| format!("{name}[{index}]={}", encode_value(item))),
                );
            }
            (_, ParamValue::List(items)) => {
                let joined = items.iter().map(encode_value).collect::<Vec<_>>().join(",");
                terms.push(format!("{key}={joined}"));
            }
            (_, value) => terms.push(format!("{key}={}", encode_value(value))),
        }
    }

    terms.join("&")
}

fn encode_value(value: &ParamValue) -> String {
    match value {
        ParamValue::String(text) => form_urlencode(text),
        ParamValue::Int(number) => number.to_string(),
        ParamValue::Float(number) => form_urlencode(&php_float(*number)),
        ParamValue::Bool(flag) => u8::from(*flag).to_string(),
        ParamValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        // Nested lists have no wire form; the API receives the literal marker.
        ParamValue::List(_) => "Array".to_string(),
    }
}

/// Render a float as PHP prints it: shortest digits, `INF`/`NAN`, and
/// `1.0E+21` style exponents outside `[1e-4, 1e15)`.
fn php_float(number: f64) -> String {
    if number.is_nan() {
        return "NAN".to_string();
    }
    if number.is_infinite() {
        return if number > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let magnitude = number.abs();
    if number == 0.0 || (1e-4..1e15).contains(&magnitude) {
        return number.to_string();
    }

    let text = format!("{number:E}");
    let Some((mantissa, exponent)) = text.split_once('E') else {
        return text;
    };
    let point = if mantissa.contains('.') { "" } else { ".0" };
    let sign = if exponent.starts_with('-') { "" } else { "+" };
    format!("{mantissa}{point}E{sign}{exponent}")
}
