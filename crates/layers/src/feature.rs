//! GeoJSON-shaped feature model shared by the host map, the clustering
//! source and the spider layers.

use foundation::ids::{ClusterId, FeatureId};
use foundation::math::Position;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arbitrary feature attributes.
pub type Properties = serde_json::Map<String, Value>;

/// Set to `true` on features produced by the clustering source.
pub const CLUSTER_KEY: &str = "cluster";
pub const CLUSTER_ID_KEY: &str = "cluster_id";
pub const POINT_COUNT_KEY: &str = "point_count";

/// Ties a spider point to its connector line.
pub const STICK_ID_KEY: &str = "_stickId";
/// Id of the cluster member a spider point was copied from.
pub const PARENT_ID_KEY: &str = "_parentId";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
}

impl Geometry {
    /// Representative position: the point itself, or the first vertex.
    pub fn anchor(&self) -> Option<Position> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.first().copied()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: Properties::new(),
        }
    }

    pub fn point(position: Position) -> Self {
        Self::new(Geometry::Point {
            coordinates: position,
        })
    }

    pub fn line(vertices: Vec<Position>) -> Self {
        Self::new(Geometry::LineString {
            coordinates: vertices,
        })
    }

    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn position(&self) -> Option<Position> {
        self.geometry.anchor()
    }

    pub fn cluster_info(&self) -> Option<ClusterInfo> {
        ClusterInfo::from_feature(self)
    }

    pub fn stick_id(&self) -> Option<&str> {
        self.properties.get(STICK_ID_KEY).and_then(Value::as_str)
    }

    /// `true` when the feature carries the spider parent bookkeeping key,
    /// even if its value is `null`.
    pub fn is_spider_point(&self) -> bool {
        self.properties.contains_key(PARENT_ID_KEY)
    }

    pub fn parent_id(&self) -> Option<FeatureId> {
        self.properties
            .get(PARENT_ID_KEY)
            .and_then(feature_id_from_value)
    }
}

/// Cluster metadata read from a clustered feature's properties.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClusterInfo {
    pub id: ClusterId,
    pub point_count: u64,
    pub position: Position,
}

impl ClusterInfo {
    /// Returns `None` unless `cluster == true` and a `cluster_id` is present.
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let props = &feature.properties;
        if !props.get(CLUSTER_KEY).and_then(Value::as_bool).unwrap_or(false) {
            return None;
        }
        let id = props.get(CLUSTER_ID_KEY).and_then(Value::as_u64)?;
        let point_count = props
            .get(POINT_COUNT_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Some(Self {
            id: ClusterId(id),
            point_count,
            position: feature.position()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter()
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

pub fn feature_id_to_value(id: &FeatureId) -> Value {
    match id {
        FeatureId::Number(n) => Value::Number(n.clone()),
        FeatureId::String(s) => Value::String(s.clone()),
    }
}

pub fn feature_id_from_value(v: &Value) -> Option<FeatureId> {
    match v {
        Value::Number(n) => Some(FeatureId::Number(n.clone())),
        Value::String(s) => Some(FeatureId::String(s.clone())),
        _ => None,
    }
}

/// Copies the top-level entries of `props` except the `excluded` keys.
pub fn copy_filtered(props: &Properties, excluded: &[&str]) -> Properties {
    props
        .iter()
        .filter(|(k, _)| !excluded.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
