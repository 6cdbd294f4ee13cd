use std::task::Context;

use foundation::ids::{ClusterId, LayerId};
use foundation::math::Position;
use futures_util::FutureExt;
use futures_util::task::noop_waker_ref;
use layers::{ClusterInfo, Feature, FeatureCollection, LayerDescriptor, SpiderLayerSet};
use runtime::{EventKey, EventKind, GenerationCounter, HandlerTable, PendingSet};
use tracing::{debug, trace, warn};

use crate::error::{SourceError, SpiderError};
use crate::host::{Camera, ClusterSource, MapEvent, MapSurface};
use crate::layout::{LayoutSettings, build_spider};
use crate::options::{SpiderCallbacks, SpiderOptions, SpiderOptionsPatch};

/// Whether a cluster is currently fanned out.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Collapsed,
    /// Holds the cluster feature that was expanded.
    Expanded(Feature),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Handler {
    Collapse,
    LayerClick,
    HighlightStick,
    UnhighlightStick,
}

enum Completion {
    Leaves {
        cluster: ClusterId,
        feature: Feature,
        center: Position,
        limit: usize,
        layout: LayoutSettings,
        result: Result<Vec<Feature>, SourceError>,
    },
    ExpansionZoom {
        cluster: ClusterId,
        center: Position,
        result: Result<f64, SourceError>,
    },
}

/// Expands clusters of a clustered point layer into circles or spirals of
/// their members.
///
/// The manager owns the host map handle and the clustering source for its
/// lifetime; [`SpiderClusterManager::dispose`] hands both back. Source
/// requests are polled cooperatively through [`SpiderClusterManager::poll_pending`]
/// or [`SpiderClusterManager::pump`]. A request issued before the most recent
/// collapse never touches the spider layers.
pub struct SpiderClusterManager<M: MapSurface, S: ClusterSource> {
    map: M,
    source: S,
    cluster_layer: LayerId,
    unclustered_layer: LayerId,
    spider: SpiderLayerSet,
    options: SpiderOptions,
    callbacks: SpiderCallbacks,
    handlers: HandlerTable<Handler>,
    state: InteractionState,
    hovered_stick: Option<String>,
    generations: GenerationCounter,
    pending: PendingSet<Completion>,
}

impl<M: MapSurface, S: ClusterSource> SpiderClusterManager<M, S> {
    /// Creates the spider layers and subscribes to the events the manager
    /// reacts to.
    ///
    /// `cluster_layer` must draw points from `source`; `unclustered_layer`
    /// must be a point layer and is used as the style template for spidered
    /// points. Nothing is registered with `map` when validation fails.
    pub fn new(
        mut map: M,
        source: S,
        cluster_layer: &LayerDescriptor,
        unclustered_layer: &LayerDescriptor,
        mut patch: SpiderOptionsPatch,
    ) -> Result<Self, SpiderError> {
        if !cluster_layer.options.is_point_layer() {
            return Err(SpiderError::UnsupportedLayer {
                layer: cluster_layer.id,
                role: "cluster",
            });
        }
        match cluster_layer.options.source() {
            Some(bound) if bound == source.id() => {}
            bound => {
                return Err(SpiderError::UnsupportedSource {
                    layer: cluster_layer.id,
                    bound: bound.cloned(),
                    expected: source.id().clone(),
                });
            }
        }
        if !unclustered_layer.options.is_point_layer() {
            return Err(SpiderError::UnsupportedLayer {
                layer: unclustered_layer.id,
                role: "unclustered",
            });
        }

        let mut callbacks = SpiderCallbacks::default();
        callbacks.merge(patch.take_callbacks());
        let mut options = SpiderOptions::default();
        options.merge(&patch);

        let spider = SpiderLayerSet::create(
            &mut map,
            &unclustered_layer.options,
            &options.stick_layer_options,
            options.visible,
        )
        .ok_or(SpiderError::UnsupportedLayer {
            layer: unclustered_layer.id,
            role: "unclustered",
        })?;

        let spider_points = spider.point_layer().id;
        let mut handlers = HandlerTable::new();
        for (key, handler) in [
            (EventKey::map(EventKind::Click), Handler::Collapse),
            (EventKey::map(EventKind::MoveStart), Handler::Collapse),
            (EventKey::layer(EventKind::MouseLeave, spider_points), Handler::UnhighlightStick),
            (EventKey::layer(EventKind::MouseMove, spider_points), Handler::HighlightStick),
            (EventKey::layer(EventKind::Click, cluster_layer.id), Handler::LayerClick),
            (EventKey::layer(EventKind::Click, spider_points), Handler::LayerClick),
            (EventKey::layer(EventKind::Click, unclustered_layer.id), Handler::LayerClick),
        ] {
            handlers.register(key, handler);
        }
        for key in handlers.keys() {
            map.subscribe(key);
        }

        debug!(
            cluster_layer = cluster_layer.id.0,
            unclustered_layer = unclustered_layer.id.0,
            spider_source = %spider.source(),
            subscriptions = handlers.keys().len(),
            "spider cluster manager attached"
        );

        Ok(Self {
            map,
            source,
            cluster_layer: cluster_layer.id,
            unclustered_layer: unclustered_layer.id,
            spider,
            options,
            callbacks,
            handlers,
            state: InteractionState::Collapsed,
            hovered_stick: None,
            generations: GenerationCounter::new(),
            pending: PendingSet::new(),
        })
    }

    /// Merges `patch` into the current options.
    ///
    /// Any open expansion is collapsed first. Stick styling and visibility
    /// changes are pushed to the host layers immediately.
    pub fn set_options(&mut self, mut patch: SpiderOptionsPatch) {
        self.collapse();
        self.callbacks.merge(patch.take_callbacks());
        let delta = self.options.merge(&patch);
        if delta.stick_layer_changed {
            self.spider
                .set_stick_options(&mut self.map, &self.options.stick_layer_options);
        }
        if delta.visibility_changed {
            self.spider.set_visible(&mut self.map, self.options.visible);
        }
        debug!(?delta, "spider options updated");
    }

    /// Collapses any open expansion and requests the members of `cluster`.
    ///
    /// The layout is drawn once the request resolves and the manager is
    /// polled; only then does the state become
    /// [`InteractionState::Expanded`]. A failed or empty answer leaves the
    /// manager collapsed. Features that are not clusters are ignored.
    pub fn expand(&mut self, cluster: &Feature) {
        self.collapse();
        let Some(info) = cluster.cluster_info() else {
            debug!("expand ignored: feature is not a cluster");
            return;
        };

        let limit = self.options.max_features_in_web;
        let layout = self.options.layout;
        let feature = cluster.clone();
        let future = self
            .source
            .cluster_leaves(info.id, limit, 0)
            .map(move |result| Completion::Leaves {
                cluster: info.id,
                feature,
                center: info.position,
                limit,
                layout,
                result,
            })
            .boxed_local();
        let request = self.pending.submit(self.generations.current(), future);
        debug!(cluster = %info.id, limit, ?request, "requested cluster leaves");
    }

    /// Removes every spider shape and supersedes in-flight leaf requests.
    /// Safe to call at any time.
    pub fn collapse(&mut self) {
        self.generations.advance();
        self.unhighlight_stick();
        if self.spider.clear(&mut self.map) {
            debug!("spider collapsed");
        }
        self.state = InteractionState::Collapsed;
    }

    /// Routes a host event through the handler table.
    ///
    /// Layer-scoped handlers run first; map-wide handlers are skipped once a
    /// layer handler prevented the default. Returns whether it did.
    pub fn handle_event(&mut self, mut event: MapEvent) -> bool {
        for key in EventKey::routes(event.kind, event.layer) {
            if key.layer.is_none() && event.is_default_prevented() {
                break;
            }
            let handlers: Vec<Handler> = self.handlers.handlers(key).copied().collect();
            for handler in handlers {
                self.run(handler, &mut event);
            }
        }
        event.is_default_prevented()
    }

    /// Applies every source answer that is ready. Returns how many were
    /// applied; stale answers are dropped silently.
    pub fn poll_pending(&mut self, cx: &mut Context<'_>) -> usize {
        for request in self.pending.retain_generation(self.generations.current()) {
            debug!(?request, "dropped superseded request");
        }

        let mut applied = 0;
        for done in self.pending.poll_ready(cx) {
            if !self.generations.is_current(done.generation) {
                debug!(request = ?done.request, "ignoring stale completion");
                continue;
            }
            self.apply(done.output);
            applied += 1;
        }
        applied
    }

    /// [`SpiderClusterManager::poll_pending`] with a no-op waker, for hosts
    /// that poll once per frame.
    pub fn pump(&mut self) -> usize {
        let mut cx = Context::from_waker(noop_waker_ref());
        self.poll_pending(&mut cx)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn expanded_cluster(&self) -> Option<&Feature> {
        match &self.state {
            InteractionState::Expanded(cluster) => Some(cluster),
            InteractionState::Collapsed => None,
        }
    }

    pub fn hovered_stick_id(&self) -> Option<&str> {
        self.hovered_stick.as_deref()
    }

    /// Shapes currently drawn by the spider layers.
    pub fn spider_features(&self) -> &FeatureCollection {
        self.spider.features()
    }

    pub fn spider_layers(&self) -> &SpiderLayerSet {
        &self.spider
    }

    pub fn options(&self) -> &SpiderOptions {
        &self.options
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Unsubscribes every handler, removes the spider layers and source and
    /// hands the map and clustering source back.
    pub fn dispose(mut self) -> (M, S) {
        for key in self.handlers.keys() {
            let registered: Vec<Handler> = self.handlers.handlers(key).copied().collect();
            for handler in &registered {
                self.handlers.unregister(key, handler);
            }
            self.map.unsubscribe(key);
        }
        self.pending.clear();

        let Self {
            mut map,
            source,
            spider,
            cluster_layer,
            unclustered_layer,
            ..
        } = self;
        spider.remove(&mut map);
        debug!(
            cluster_layer = cluster_layer.0,
            unclustered_layer = unclustered_layer.0,
            "spider cluster manager disposed"
        );
        (map, source)
    }

    fn run(&mut self, handler: Handler, event: &mut MapEvent) {
        match handler {
            Handler::Collapse => self.collapse(),
            Handler::LayerClick => self.on_layer_click(event),
            Handler::HighlightStick => self.highlight_stick(event),
            Handler::UnhighlightStick => self.unhighlight_stick(),
        }
    }

    fn on_layer_click(&mut self, event: &mut MapEvent) {
        let Some(shape) = event.shapes.first().cloned() else {
            return;
        };

        if let Some(info) = shape.cluster_info() {
            if matches!(self.state, InteractionState::Expanded(_)) {
                self.callbacks.unselected();
            }
            if info.point_count > self.options.max_features_in_web as u64 {
                self.collapse();
                self.request_expansion_zoom(info);
            } else {
                self.expand(&shape);
            }
        } else {
            if shape.is_spider_point() {
                let member = shape.parent_id().and_then(|id| self.source.shape_by_id(&id));
                match member {
                    Some(member) => {
                        let cluster = self.expanded_cluster().cloned();
                        self.callbacks.selected(&member, cluster.as_ref());
                    }
                    None => debug!("spider point no longer resolves to a source shape"),
                }
            }
            self.collapse();
        }
        event.prevent_default();
    }

    fn request_expansion_zoom(&mut self, info: ClusterInfo) {
        let future = self
            .source
            .cluster_expansion_zoom(info.id)
            .map(move |result| Completion::ExpansionZoom {
                cluster: info.id,
                center: info.position,
                result,
            })
            .boxed_local();
        let request = self.pending.submit(self.generations.current(), future);
        debug!(cluster = %info.id, point_count = info.point_count, ?request, "requested expansion zoom");
    }

    fn highlight_stick(&mut self, event: &MapEvent) {
        let Some(stick_id) = event.shapes.first().and_then(Feature::stick_id) else {
            return;
        };
        if self.hovered_stick.as_deref() == Some(stick_id) {
            return;
        }
        let stick_id = stick_id.to_string();
        self.unhighlight_stick();
        self.spider.set_stick_hover(&mut self.map, &stick_id, true);
        trace!(stick = %stick_id, "stick highlighted");
        self.hovered_stick = Some(stick_id);
    }

    fn unhighlight_stick(&mut self) {
        if let Some(stick_id) = self.hovered_stick.take() {
            self.spider.set_stick_hover(&mut self.map, &stick_id, false);
            trace!(stick = %stick_id, "stick highlight cleared");
        }
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Leaves {
                cluster,
                feature,
                center,
                limit,
                layout,
                result,
            } => match result {
                Ok(mut leaves) => {
                    leaves.truncate(limit);
                    if leaves.is_empty() {
                        debug!(%cluster, "cluster has no leaves to expand");
                        return;
                    }
                    let shapes = build_spider(center, &leaves, &layout, &self.map);
                    debug!(
                        %cluster,
                        members = leaves.len(),
                        mode = ?layout.mode_for(leaves.len()),
                        "cluster expanded"
                    );
                    self.spider.populate(&mut self.map, shapes);
                    self.state = InteractionState::Expanded(feature);
                }
                Err(err) => warn!(%cluster, %err, "cluster leaves request failed"),
            },
            Completion::ExpansionZoom {
                cluster,
                center,
                result,
            } => match result {
                Ok(zoom) => {
                    debug!(%cluster, zoom, "zooming into cluster");
                    self.map.set_camera(Camera { center, zoom });
                }
                Err(err) => warn!(%cluster, %err, "expansion zoom request failed"),
            },
        }
    }
}
