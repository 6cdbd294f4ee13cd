use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Identifies a rendering layer on the host map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u64);

/// Identifies a feature collection (data source) registered with the host map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cluster identifier assigned by the clustering data source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub u64);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GeoJSON feature id: either a number or a string.
///
/// Numbers are kept as JSON numbers, so negative and fractional ids
/// survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(Number),
    String(String),
}

impl From<u64> for FeatureId {
    fn from(n: u64) -> Self {
        FeatureId::Number(Number::from(n))
    }
}

impl From<Number> for FeatureId {
    fn from(n: Number) -> Self {
        FeatureId::Number(n)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::String(s.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        FeatureId::String(s)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{n}"),
            FeatureId::String(s) => f.write_str(s),
        }
    }
}
