//! Decoder for PHP's native `serialize()` format.
//!
//! This is the self-describing format returned by the API with `format=php`.
//!
//! | token | value |
//! |-------|-------|
//! | `N;` | [`PhpValue::Null`] |
//! | `b:1;` | [`PhpValue::Bool`] |
//! | `i:42;` | [`PhpValue::Int`] |
//! | `d:0.5;` | [`PhpValue::Float`] |
//! | `s:5:"hello";` | [`PhpValue::String`] (length in bytes) |
//! | `a:1:{i:0;s:1:"x";}` | [`PhpValue::Array`] |
//! | `O:8:"stdClass":1:{s:1:"a";i:1;}` | [`PhpValue::Object`] |
//!
//! References (`r:`, `R:`) and custom-serialized objects (`C:`) are rejected.
//!
//! # Example
//!
//! ```
//! use piwik_core::{PhpValue, unserialize};
//!
//! let value = unserialize(br#"a:2:{s:6:"result";s:7:"success";s:7:"message";s:2:"ok";}"#)?;
//! assert_eq!(value.get("result").and_then(PhpValue::as_str), Some("success"));
//! # Ok::<(), piwik_core::Error>(())
//! ```

use std::fmt;

use crate::{Error, Result};

/// Nesting limit for arrays and objects.
///
/// The parser recurses once per level; this keeps it well inside a 2 MiB
/// thread stack in unoptimized builds. API payloads nest a few levels deep.
const MAX_DEPTH: usize = 128;

/// Key of a PHP array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhpKey {
    /// Integer key.
    Int(i64),
    /// String key.
    String(String),
}

impl PhpKey {
    /// Returns `true` if this key is written `key` in PHP source.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Int(index) => index.to_string() == key,
            Self::String(name) => name == key,
        }
    }
}

impl fmt::Display for PhpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(index) => write!(f, "{index}"),
            Self::String(name) => write!(f, "{name}"),
        }
    }
}

/// A decoded PHP value.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    /// `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    String(String),
    /// Ordered array (list or map).
    Array(Vec<(PhpKey, PhpValue)>),
    /// Object with its class name and properties.
    Object {
        /// Class name.
        class: String,
        /// Properties in declaration order.
        properties: Vec<(PhpKey, PhpValue)>,
    },
}

impl PhpValue {
    /// Returns `true` for `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Integer content, if this is an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            _ => None,
        }
    }

    /// Float content, if this is a float.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(number) => Some(*number),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Entries of an array, or properties of an object.
    #[must_use]
    pub fn entries(&self) -> Option<&[(PhpKey, Self)]> {
        match self {
            Self::Array(entries) | Self::Object {
                properties: entries,
                ..
            } => Some(entries),
            _ => None,
        }
    }

    /// Entry by key. Integer keys match their decimal form (`"0"`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.entries()?
            .iter()
            .find_map(|(k, v)| k.matches(key).then_some(v))
    }

    /// Entry by integer key.
    #[must_use]
    pub fn index(&self, index: i64) -> Option<&Self> {
        self.entries()?
            .iter()
            .find_map(|(k, v)| (*k == PhpKey::Int(index)).then_some(v))
    }

    /// Convert into a JSON value.
    ///
    /// Arrays keyed `0..n` in order become JSON arrays, other arrays and objects
    /// become JSON objects. Non-finite floats become `null`.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(flag),
            Self::Int(number) => Value::from(number),
            Self::Float(number) => {
                serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
            }
            Self::String(text) => Value::String(text),
            Self::Array(entries) if is_list(&entries) => {
                Value::Array(entries.into_iter().map(|(_, v)| v.into_json()).collect())
            }
            Self::Array(entries) | Self::Object {
                properties: entries,
                ..
            } => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.into_json()))
                    .collect(),
            ),
        }
    }

    /// Deserialize into a typed value, with path-aware errors.
    ///
    /// # Example
    ///
    /// ```
    /// use piwik_core::unserialize;
    ///
    /// #[derive(serde::Deserialize)]
    /// struct Site { idsite: String, name: String }
    ///
    /// let value = unserialize(br#"a:1:{i:0;a:2:{s:6:"idsite";s:1:"1";s:4:"name";s:4:"Demo";}}"#)?;
    /// let sites: Vec<Site> = value.deserialize()?;
    /// assert_eq!(sites[0].name, "Demo");
    /// # Ok::<(), piwik_core::Error>(())
    /// ```
    pub fn deserialize<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        serde_path_to_error::deserialize(self.into_json()).map_err(|e| {
            Error::json_deserialization(e.path().to_string(), e.inner().to_string())
        })
    }
}

fn is_list(entries: &[(PhpKey, PhpValue)]) -> bool {
    entries
        .iter()
        .zip(0_i64..)
        .all(|((key, _), expected)| *key == PhpKey::Int(expected))
}

/// Decode a serialized PHP value.
///
/// Decoding stops after the first complete value; whatever follows it is
/// ignored, as PHP's own `unserialize` does.
///
/// # Errors
///
/// Returns [`Error::Deserialization`] with the byte offset of the failure.
pub fn unserialize(input: &[u8]) -> Result<PhpValue> {
    Parser { input, pos: 0 }.value(0)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::deserialization(self.pos, message)
    }

    fn remaining(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = self
            .remaining()
            .first()
            .copied()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let start = self.pos;
        let found = self.next_byte()?;
        if found == expected {
            Ok(())
        } else {
            Err(Error::deserialization(
                start,
                format!(
                    "expected '{}', found '{}'",
                    expected.escape_ascii(),
                    found.escape_ascii()
                ),
            ))
        }
    }

    /// Bytes up to `end`, consuming the delimiter.
    fn take_until(&mut self, end: u8) -> Result<&'a [u8]> {
        let rest = self.remaining();
        let len = rest
            .iter()
            .position(|&b| b == end)
            .ok_or_else(|| self.error(format!("missing '{}'", end.escape_ascii())))?;
        let (token, _) = rest.split_at(len);
        self.pos += len + 1;
        Ok(token)
    }

    fn number<T: std::str::FromStr>(&mut self, end: u8, what: &str) -> Result<T> {
        let start = self.pos;
        let raw = self.take_until(end)?;
        std::str::from_utf8(raw)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| {
                Error::deserialization(start, format!("invalid {what} '{}'", raw.escape_ascii()))
            })
    }

    fn float(&mut self) -> Result<f64> {
        let start = self.pos;
        let raw = self.take_until(b';')?;
        match raw {
            b"INF" => Ok(f64::INFINITY),
            b"-INF" => Ok(f64::NEG_INFINITY),
            b"NAN" => Ok(f64::NAN),
            _ => std::str::from_utf8(raw)
                .ok()
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| {
                    Error::deserialization(start, format!("invalid float '{}'", raw.escape_ascii()))
                }),
        }
    }

    /// `<len>:"<bytes>"`, without the trailing delimiter.
    fn quoted(&mut self) -> Result<String> {
        let len: usize = self.number(b':', "string length")?;
        self.expect(b'"')?;

        let start = self.pos;
        let rest = self.remaining();
        if rest.len() < len {
            return Err(self.error(format!(
                "string of {len} bytes exceeds the {} remaining",
                rest.len()
            )));
        }
        let (bytes, _) = rest.split_at(len);
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::deserialization(start, format!("invalid UTF-8: {e}")))?;
        self.pos += len;

        self.expect(b'"')?;
        Ok(text)
    }

    /// `<count>:{<key><value>...}`
    fn entries(&mut self, depth: usize) -> Result<Vec<(PhpKey, PhpValue)>> {
        if depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }

        let count: usize = self.number(b':', "element count")?;
        self.expect(b'{')?;

        let mut entries = Vec::with_capacity(count.min(self.remaining().len()));
        for _ in 0..count {
            let key = self.key()?;
            let value = self.value(depth + 1)?;
            entries.push((key, value));
        }

        self.expect(b'}')?;
        Ok(entries)
    }

    fn key(&mut self) -> Result<PhpKey> {
        let start = self.pos;
        match self.next_byte()? {
            b'i' => {
                self.expect(b':')?;
                Ok(PhpKey::Int(self.number(b';', "integer")?))
            }
            b's' => {
                self.expect(b':')?;
                let name = self.quoted()?;
                self.expect(b';')?;
                Ok(PhpKey::String(name))
            }
            other => Err(Error::deserialization(
                start,
                format!("invalid array key type '{}'", other.escape_ascii()),
            )),
        }
    }

    fn value(&mut self, depth: usize) -> Result<PhpValue> {
        let start = self.pos;
        match self.next_byte()? {
            b'N' => {
                self.expect(b';')?;
                Ok(PhpValue::Null)
            }
            b'b' => {
                self.expect(b':')?;
                match self.take_until(b';')? {
                    b"0" => Ok(PhpValue::Bool(false)),
                    b"1" => Ok(PhpValue::Bool(true)),
                    raw => Err(Error::deserialization(
                        start,
                        format!("invalid boolean '{}'", raw.escape_ascii()),
                    )),
                }
            }
            b'i' => {
                self.expect(b':')?;
                Ok(PhpValue::Int(self.number(b';', "integer")?))
            }
            b'd' => {
                self.expect(b':')?;
                Ok(PhpValue::Float(self.float()?))
            }
            b's' => {
                self.expect(b':')?;
                let text = self.quoted()?;
                self.expect(b';')?;
                Ok(PhpValue::String(text))
            }
            b'a' => {
                self.expect(b':')?;
                Ok(PhpValue::Array(self.entries(depth)?))
            }
            b'O' => {
                self.expect(b':')?;
                let class = self.quoted()?;
                self.expect(b':')?;
                let properties = self.entries(depth)?;
                Ok(PhpValue::Object { class, properties })
            }
            b'r' | b'R' => Err(Error::deserialization(start, "references are not supported")),
            b'C' => Err(Error::deserialization(
                start,
                "custom serialized objects are not supported",
            )),
            other => Err(Error::deserialization(
                start,
                format!("unknown type tag '{}'", other.escape_ascii()),
            )),
        }
    }
}
