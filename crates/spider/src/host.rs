use foundation::ids::{ClusterId, FeatureId, LayerId, SourceId};
use foundation::math::{Position, Projection};
use futures_util::future::LocalBoxFuture;
use layers::{Feature, LayerHost};
use runtime::{EventKey, EventKind};

use crate::error::SourceError;

/// Single-shot asynchronous answer from a [`ClusterSource`].
///
/// Futures are polled on the thread that owns the manager and must not
/// borrow the source.
pub type SourceFuture<T> = LocalBoxFuture<'static, Result<T, SourceError>>;

/// The clustering data source behind the cluster layer.
pub trait ClusterSource {
    fn id(&self) -> &SourceId;

    /// Up to `limit` members of `cluster`, skipping the first `offset`.
    fn cluster_leaves(&self, cluster: ClusterId, limit: usize, offset: usize) -> SourceFuture<Vec<Feature>>;

    /// Zoom level at which `cluster` starts to break apart.
    fn cluster_expansion_zoom(&self, cluster: ClusterId) -> SourceFuture<f64>;

    fn shape_by_id(&self, id: &FeatureId) -> Option<Feature>;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub center: Position,
    pub zoom: f64,
}

/// Everything the manager needs from the host map.
pub trait MapSurface: Projection + LayerHost {
    /// Asks the host to forward events matching `key` to the manager.
    fn subscribe(&mut self, key: EventKey);
    fn unsubscribe(&mut self, key: EventKey);
    fn set_camera(&mut self, camera: Camera);
}

/// A pointer or camera event forwarded by the host.
///
/// `layer` is the layer whose features were hit, if any; `shapes` are the
/// hit features, topmost first.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEvent {
    pub kind: EventKind,
    pub layer: Option<LayerId>,
    pub shapes: Vec<Feature>,
    default_prevented: bool,
}

impl MapEvent {
    /// An event on the map itself, with nothing hit.
    pub fn map(kind: EventKind) -> Self {
        Self {
            kind,
            layer: None,
            shapes: Vec::new(),
            default_prevented: false,
        }
    }

    pub fn on_layer(kind: EventKind, layer: LayerId, shapes: Vec<Feature>) -> Self {
        Self {
            kind,
            layer: Some(layer),
            shapes,
            default_prevented: false,
        }
    }

    /// Stops map-wide handlers from seeing this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
