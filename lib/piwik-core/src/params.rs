//! Parameter values and ordered parameter sets.
//!
//! A [`Params`] set maps API parameter names to [`ParamValue`]s. Insertion order
//! is preserved and drives the order of terms in the encoded query string.
//!
//! # Example
//!
//! ```
//! use piwik_core::Params;
//!
//! let params = Params::new()
//!     .with("siteName", "Example site 1")
//!     .with("urls[]", vec!["http://example.com", "https://www.example.com"])
//!     .with("ecommerce", true)
//!     .with("siteSearch", 1);
//!
//! assert_eq!(params.len(), 4);
//! assert_eq!(params.keys().next(), Some("siteName"));
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text, sent percent-encoded.
    String(String),
    /// Integer, sent in decimal.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean, sent as `1` or `0`.
    Bool(bool),
    /// Calendar date, sent as `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Ordered list of values.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Returns `true` for string and numeric values.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::String(_) | Self::Int(_) | Self::Float(_))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value.date())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ParamValue {
    fn from(value: DateTime<Tz>) -> Self {
        Self::Date(value.date_naive())
    }
}

impl<T: Into<Self>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self> + Clone> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        Self::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered set of API parameters.
///
/// Inserting a key that is already present replaces its value in place: the key
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces a parameter, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder-style [`Params::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameter names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
