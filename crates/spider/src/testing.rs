//! Recording host map and scriptable clustering source for manager tests.

use std::cell::RefCell;
use std::collections::HashMap;

use foundation::ids::{ClusterId, FeatureId, LayerId, SourceId};
use foundation::math::{Pixel, Position, Projection};
use futures_util::FutureExt;
use futures_util::future;
use layers::{
    BubbleLayerOptions, Feature, FeatureCollection, FeatureState, Filter, LayerDescriptor, LayerHost,
    LayerOptions, SymbolLayerOptions,
};
use runtime::EventKey;
use tokio::sync::oneshot;

use crate::error::SourceError;
use crate::host::{Camera, ClusterSource, MapSurface, SourceFuture};

pub const POINTS: &str = "points";
pub const CLUSTER_LAYER: LayerId = LayerId(100);
pub const UNCLUSTERED_LAYER: LayerId = LayerId(101);

/// Pixels per degree in [`MockMap`]'s flat projection.
pub const SCALE: f64 = 1000.0;

#[derive(Debug, Default)]
pub struct MockMap {
    next_id: u64,
    pub sources: Vec<SourceId>,
    pub layers: Vec<(LayerId, LayerOptions)>,
    pub data: HashMap<SourceId, FeatureCollection>,
    pub data_pushes: usize,
    pub states: Vec<(SourceId, FeatureId, FeatureState)>,
    pub subscriptions: Vec<EventKey>,
    pub cameras: Vec<Camera>,
}

impl MockMap {
    pub fn shapes(&self, source: &SourceId) -> &[Feature] {
        self.data.get(source).map(|c| c.features.as_slice()).unwrap_or(&[])
    }
}

impl Projection for MockMap {
    fn positions_to_pixels(&self, positions: &[Position]) -> Vec<Pixel> {
        positions
            .iter()
            .map(|p| Pixel::new(p.lon * SCALE, -p.lat * SCALE))
            .collect()
    }

    fn pixels_to_positions(&self, pixels: &[Pixel]) -> Vec<Position> {
        pixels
            .iter()
            .map(|px| Position::new(px.x / SCALE, -px.y / SCALE))
            .collect()
    }
}

impl LayerHost for MockMap {
    fn add_source(&mut self) -> SourceId {
        self.next_id += 1;
        let id = SourceId::new(format!("spider-{}", self.next_id));
        self.sources.push(id.clone());
        id
    }

    fn remove_source(&mut self, source: &SourceId) {
        self.sources.retain(|s| s != source);
        self.data.remove(source);
    }

    fn set_source_data(&mut self, source: &SourceId, data: &FeatureCollection) {
        self.data_pushes += 1;
        self.data.insert(source.clone(), data.clone());
    }

    fn add_layer(&mut self, options: &LayerOptions) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.push((id, options.clone()));
        id
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.layers.retain(|(id, _)| *id != layer);
    }

    fn set_layer_options(&mut self, layer: LayerId, options: &LayerOptions) {
        if let Some(entry) = self.layers.iter_mut().find(|(id, _)| *id == layer) {
            entry.1 = options.clone();
        }
    }

    fn set_feature_state(&mut self, source: &SourceId, feature: &FeatureId, state: FeatureState) {
        self.states.push((source.clone(), feature.clone(), state));
    }
}

impl MapSurface for MockMap {
    fn subscribe(&mut self, key: EventKey) {
        self.subscriptions.push(key);
    }

    fn unsubscribe(&mut self, key: EventKey) {
        self.subscriptions.retain(|k| *k != key);
    }

    fn set_camera(&mut self, camera: Camera) {
        self.cameras.push(camera);
    }
}

/// Clustering source with canned answers.
///
/// In deferred mode every request waits until [`MockSource::release_all`].
#[derive(Debug)]
pub struct MockSource {
    id: SourceId,
    clusters: HashMap<ClusterId, Vec<Feature>>,
    zooms: HashMap<ClusterId, f64>,
    shapes: RefCell<HashMap<FeatureId, Feature>>,
    deferred: bool,
    gates: RefCell<Vec<oneshot::Sender<()>>>,
    pub leaf_requests: RefCell<Vec<(ClusterId, usize, usize)>>,
    pub zoom_requests: RefCell<Vec<ClusterId>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            id: SourceId::new(POINTS),
            clusters: HashMap::new(),
            zooms: HashMap::new(),
            shapes: RefCell::new(HashMap::new()),
            deferred: false,
            gates: RefCell::new(Vec::new()),
            leaf_requests: RefCell::new(Vec::new()),
            zoom_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_cluster(mut self, id: u64, leaves: Vec<Feature>) -> Self {
        for leaf in &leaves {
            if let Some(fid) = &leaf.id {
                self.shapes.borrow_mut().insert(fid.clone(), leaf.clone());
            }
        }
        self.clusters.insert(ClusterId(id), leaves);
        self
    }

    pub fn with_zoom(mut self, id: u64, zoom: f64) -> Self {
        self.zooms.insert(ClusterId(id), zoom);
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Drops a shape so later id lookups miss.
    pub fn forget(&self, id: &FeatureId) {
        self.shapes.borrow_mut().remove(id);
    }

    pub fn release_all(&self) {
        for gate in self.gates.borrow_mut().drain(..) {
            let _ = gate.send(());
        }
    }

    fn answer<T: 'static>(&self, result: Result<T, SourceError>) -> SourceFuture<T> {
        if !self.deferred {
            return future::ready(result).boxed_local();
        }
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push(tx);
        async move {
            rx.await.map_err(|_| SourceError::new("request dropped"))?;
            result
        }
        .boxed_local()
    }
}

impl ClusterSource for MockSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn cluster_leaves(&self, cluster: ClusterId, limit: usize, offset: usize) -> SourceFuture<Vec<Feature>> {
        self.leaf_requests.borrow_mut().push((cluster, limit, offset));
        let result = self
            .clusters
            .get(&cluster)
            .map(|leaves| leaves.iter().skip(offset).take(limit).cloned().collect())
            .ok_or_else(|| SourceError::new(format!("unknown cluster {cluster}")));
        self.answer(result)
    }

    fn cluster_expansion_zoom(&self, cluster: ClusterId) -> SourceFuture<f64> {
        self.zoom_requests.borrow_mut().push(cluster);
        let result = self
            .zooms
            .get(&cluster)
            .copied()
            .ok_or_else(|| SourceError::new(format!("unknown cluster {cluster}")));
        self.answer(result)
    }

    fn shape_by_id(&self, id: &FeatureId) -> Option<Feature> {
        self.shapes.borrow().get(id).cloned()
    }
}

pub fn cluster_layer() -> LayerDescriptor {
    LayerDescriptor::new(
        CLUSTER_LAYER,
        LayerOptions::Bubble(BubbleLayerOptions {
            source: Some(SourceId::new(POINTS)),
            filter: Some(Filter::HasPointCount),
            ..BubbleLayerOptions::default()
        }),
    )
}

pub fn unclustered_layer() -> LayerDescriptor {
    LayerDescriptor::new(
        UNCLUSTERED_LAYER,
        LayerOptions::Symbol(SymbolLayerOptions {
            source: Some(SourceId::new(POINTS)),
            filter: Some(Filter::NotHasPointCount),
            ..SymbolLayerOptions::default()
        }),
    )
}

pub fn cluster(id: u64, point_count: u64, position: Position) -> Feature {
    Feature::point(position)
        .with_property("cluster", true)
        .with_property("cluster_id", id)
        .with_property("point_count", point_count)
}

/// `n` members with ids `first..first + n`.
pub fn leaves(first: u64, n: u64) -> Vec<Feature> {
    (first..first + n)
        .map(|i| {
            Feature::point(Position::new(0.0, 0.0))
                .with_id(i)
                .with_property("name", format!("leaf-{i}"))
        })
        .collect()
}
