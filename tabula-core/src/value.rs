//! Field values and the partially-populated field map.
//!
//! A record's columns hold `FieldValue`s. Inputs to key lookups, creation,
//! and filters are `FieldMap`s: field name to value, possibly covering only
//! a subset of the schema (e.g. before an insert assigns a generated id).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single column value.
///
/// The variants mirror the column types the schema layer supports. `Null`
/// is an explicit SQL NULL; a field that is absent from a record's map is
/// *undefined*, which is a different state (an undefined primary key is an
/// error when deriving a unique key, a NULL one is not).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit NULL.
    Null,
    /// Boolean column value.
    Bool(bool),
    /// 64-bit integer column value.
    BigInt(i64),
    /// Text column value.
    Text(String),
}

impl FieldValue {
    /// Short type tag used in validation diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::BigInt(_) => "bigint",
            Self::Text(_) => "text",
        }
    }

    /// Returns true for the explicit `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::BigInt(i64::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Field name to value mapping, possibly partial with respect to a schema.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Build a [`FieldMap`] from `name => value` pairs.
///
/// Values are converted through [`FieldValue::from`], so plain integers,
/// booleans, and string slices work directly.
#[macro_export]
macro_rules! fields {
    () => { $crate::FieldMap::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::FieldMap::new();
        $( map.insert(($name).to_string(), $crate::FieldValue::from($value)); )+
        map
    }};
}
