//! Capability set codec
//!
//! Nodes persist their capabilities as a flat string, e.g.
//! `profile:compute,boot_option:local`. A [`CapabilitySet`] is the structured
//! form of that string. Keys are kept sorted, so serialization is
//! deterministic: persisted strings are always emitted in key order.
//!
//! Sets are never mutated in place. Every update produces a new set that the
//! caller persists as a whole.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};

/// Capability key holding the node's committed profile
pub const PROFILE_KEY: &str = "profile";

const PAIR_DELIMITER: char = ',';
const KEY_VALUE_DELIMITER: char = ':';

/// Structured key to value capability mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilitySet(BTreeMap<String, String>);

impl CapabilitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the flat `key:value,key:value` encoding.
    ///
    /// An empty (or whitespace-only) string yields an empty set. A repeated
    /// key keeps its last value.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut map = BTreeMap::new();
        if raw.trim().is_empty() {
            return Ok(Self(map));
        }

        for fragment in raw.split(PAIR_DELIMITER) {
            let (key, value) = fragment
                .split_once(KEY_VALUE_DELIMITER)
                .ok_or_else(|| TypesError::malformed(fragment, "missing ':' separator"))?;
            validate_key(key).map_err(|reason| TypesError::malformed(fragment, reason))?;
            validate_value(value).map_err(|reason| TypesError::malformed(fragment, reason))?;
            map.insert(key.to_string(), value.to_string());
        }

        Ok(Self(map))
    }

    /// Parse an optional raw string; absent input is an empty set
    pub fn parse_optional(raw: Option<&str>) -> Result<Self> {
        raw.map_or_else(|| Ok(Self::new()), Self::parse)
    }

    /// Build a set from key/value pairs, validating each against the grammar
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |set, (k, v)| set.with(k, v))
    }

    /// Return a copy of this set with `key` set to `value`
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        let fragment = || format!("{key}{KEY_VALUE_DELIMITER}{value}");
        validate_key(&key).map_err(|reason| TypesError::malformed(fragment(), reason))?;
        validate_value(&value).map_err(|reason| TypesError::malformed(fragment(), reason))?;

        let mut map = self.0.clone();
        map.insert(key, value);
        Ok(Self(map))
    }

    /// Return a copy of this set with every pair of `other` applied on top
    pub fn merged(&self, other: &CapabilitySet) -> Self {
        let mut map = self.0.clone();
        map.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self(map)
    }

    /// Return a copy of this set without `key`
    pub fn without(&self, key: &str) -> Self {
        let mut map = self.0.clone();
        map.remove(key);
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The committed profile, if any. An empty value counts as no profile.
    pub fn profile(&self) -> Option<&str> {
        self.get(PROFILE_KEY).filter(|p| !p.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to the flat encoding, fragments sorted by key
    pub fn to_capability_string(&self) -> String {
        self.to_string()
    }
}

fn validate_key(key: &str) -> std::result::Result<(), &'static str> {
    if key.is_empty() {
        return Err("empty key");
    }
    if key.contains(PAIR_DELIMITER) || key.contains(KEY_VALUE_DELIMITER) {
        return Err("key contains a delimiter");
    }
    Ok(())
}

fn validate_value(value: &str) -> std::result::Result<(), &'static str> {
    if value.contains(PAIR_DELIMITER) || value.contains(KEY_VALUE_DELIMITER) {
        return Err("value contains a delimiter");
    }
    Ok(())
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PAIR_DELIMITER}")?;
            }
            write!(f, "{key}{KEY_VALUE_DELIMITER}{value}")?;
        }
        Ok(())
    }
}

impl FromStr for CapabilitySet {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CapabilitySet {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CapabilitySet> for String {
    fn from(value: CapabilitySet) -> Self {
        value.to_string()
    }
}
