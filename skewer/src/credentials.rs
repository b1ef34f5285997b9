//! Warehouse credentials
//!
//! Credentials are an opaque mapping handed to the driver as-is. Field names
//! are not validated here; the driver decides what it understands. Values are
//! secret, so the `Debug` output lists keys only.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A primitive credential value
#[derive(Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CredentialValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialValue::Boolean(value) => write!(f, "{}", value),
            CredentialValue::Integer(value) => write!(f, "{}", value),
            CredentialValue::Float(value) => write!(f, "{}", value),
            CredentialValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for CredentialValue {
    fn from(value: &str) -> Self {
        CredentialValue::Text(value.to_string())
    }
}

impl From<String> for CredentialValue {
    fn from(value: String) -> Self {
        CredentialValue::Text(value)
    }
}

impl From<i64> for CredentialValue {
    fn from(value: i64) -> Self {
        CredentialValue::Integer(value)
    }
}

impl From<bool> for CredentialValue {
    fn from(value: bool) -> Self {
        CredentialValue::Boolean(value)
    }
}

/// Connection credentials for one warehouse (host, user, password, logmech, ...)
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, CredentialValue>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&CredentialValue> {
        self.0.get(key)
    }

    /// Value of `key` rendered as text
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).map(ToString::to_string)
    }

    /// Add or replace a field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CredentialValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CredentialValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Credentials
where
    K: Into<String>,
    V: Into<CredentialValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|key| (key, "<redacted>")))
            .finish()
    }
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
