use foundation::ids::{FeatureId, SourceId};
use tracing::trace;

use crate::feature::{Feature, FeatureCollection};
use crate::layer::{FeatureState, LayerDescriptor, LayerHost};
use crate::symbology::{Filter, LayerOptions, LineLayerOptions};

/// Point-layer options for spidered features, derived from the layer that
/// renders un-clustered points.
///
/// The copy is rebound to `source`, restricted to point geometries and, for
/// symbol layers, allowed to overlap so no expanded point is culled.
/// Returns `None` for line layers.
pub fn spider_point_options(unclustered: &LayerOptions, source: &SourceId) -> Option<LayerOptions> {
    let mut out = unclustered.without_source();
    match &mut out {
        LayerOptions::Bubble(o) => {
            o.filter = Some(Filter::PointGeometry);
        }
        LayerOptions::Symbol(o) => {
            o.filter = Some(Filter::PointGeometry);
            o.icon.allow_overlap = true;
            o.icon.ignore_placement = true;
        }
        LayerOptions::Line(_) => return None,
    }
    out.set_source(Some(source.clone()));
    Some(out)
}

/// The manager-owned feature collection plus the two layers drawing it:
/// connector lines underneath, spidered points on top.
///
/// Invariant: `features` mirrors exactly what was last pushed to the host.
#[derive(Debug)]
pub struct SpiderLayerSet {
    source: SourceId,
    lines: LayerDescriptor,
    points: LayerDescriptor,
    features: FeatureCollection,
}

impl SpiderLayerSet {
    /// Registers an empty source and both layers with `host`.
    ///
    /// Returns `None` (without touching the host) if `unclustered` is not a
    /// point layer.
    pub fn create<H: LayerHost + ?Sized>(
        host: &mut H,
        unclustered: &LayerOptions,
        stick: &LineLayerOptions,
        visible: bool,
    ) -> Option<Self> {
        if !unclustered.is_point_layer() {
            return None;
        }

        let source = host.add_source();

        let mut line_options = LayerOptions::Line(stick.clone());
        line_options.set_source(Some(source.clone()));
        line_options.set_visible(visible);
        let line_id = host.add_layer(&line_options);

        let mut point_options = spider_point_options(unclustered, &source)?;
        point_options.set_visible(visible);
        let point_id = host.add_layer(&point_options);

        Some(Self {
            source,
            lines: LayerDescriptor::new(line_id, line_options),
            points: LayerDescriptor::new(point_id, point_options),
            features: FeatureCollection::new(),
        })
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn line_layer(&self) -> &LayerDescriptor {
        &self.lines
    }

    pub fn point_layer(&self) -> &LayerDescriptor {
        &self.points
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Replaces the current content with `shapes`.
    pub fn populate<H: LayerHost + ?Sized>(&mut self, host: &mut H, shapes: Vec<Feature>) {
        self.features = FeatureCollection::from(shapes);
        host.set_source_data(&self.source, &self.features);
        trace!(source = %self.source, shapes = self.features.len(), "spider layer populated");
    }

    /// Removes every shape. Returns `false` if there was nothing to remove.
    pub fn clear<H: LayerHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.features.is_empty() {
            return false;
        }
        self.features.clear();
        host.set_source_data(&self.source, &self.features);
        true
    }

    /// Restyles the connector lines, keeping their source binding and visibility.
    pub fn set_stick_options<H: LayerHost + ?Sized>(&mut self, host: &mut H, stick: &LineLayerOptions) {
        let visible = self.lines.options.visible();
        let mut options = LayerOptions::Line(stick.clone());
        options.set_source(Some(self.source.clone()));
        options.set_visible(visible);
        self.lines.options = options;
        host.set_layer_options(self.lines.id, &self.lines.options);
    }

    pub fn set_visible<H: LayerHost + ?Sized>(&mut self, host: &mut H, visible: bool) {
        for layer in [&mut self.lines, &mut self.points] {
            layer.options.set_visible(visible);
            host.set_layer_options(layer.id, &layer.options);
        }
    }

    /// Flags the connector identified by `stick_id` as hovered (or not).
    pub fn set_stick_hover<H: LayerHost + ?Sized>(&self, host: &mut H, stick_id: &str, hover: bool) {
        host.set_feature_state(
            &self.source,
            &FeatureId::String(stick_id.to_string()),
            FeatureState { hover },
        );
    }

    /// Unregisters both layers and the source from `host`.
    pub fn remove<H: LayerHost + ?Sized>(mut self, host: &mut H) {
        self.clear(host);
        host.remove_layer(self.points.id);
        host.remove_layer(self.lines.id);
        host.remove_source(&self.source);
    }
}

#[cfg(test)]
mod tests {
    use super::{SpiderLayerSet, spider_point_options};
    use crate::feature::{Feature, FeatureCollection};
    use crate::layer::{FeatureState, LayerHost, LayerId};
    use crate::symbology::{
        BubbleLayerOptions, Filter, LayerOptions, LineLayerOptions, StrokeColor,
        SymbolLayerOptions,
    };
    use foundation::ids::{FeatureId, SourceId};
    use foundation::math::Position;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingHost {
        next_id: u64,
        sources: Vec<SourceId>,
        layers: Vec<(LayerId, LayerOptions)>,
        data_pushes: Vec<(SourceId, usize)>,
        states: Vec<(SourceId, FeatureId, FeatureState)>,
    }

    impl LayerHost for RecordingHost {
        fn add_source(&mut self) -> SourceId {
            self.next_id += 1;
            let id = SourceId::new(format!("src-{}", self.next_id));
            self.sources.push(id.clone());
            id
        }

        fn remove_source(&mut self, source: &SourceId) {
            self.sources.retain(|s| s != source);
        }

        fn set_source_data(&mut self, source: &SourceId, data: &FeatureCollection) {
            self.data_pushes.push((source.clone(), data.len()));
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

    fn symbol_layer() -> LayerOptions {
        LayerOptions::Symbol(SymbolLayerOptions {
            source: Some(SourceId::new("points")),
            filter: Some(Filter::NotHasPointCount),
            ..SymbolLayerOptions::default()
        })
    }

    #[test]
    fn symbol_copy_is_rebound_and_allowed_to_overlap() {
        let out = spider_point_options(&symbol_layer(), &SourceId::new("spider")).expect("point layer");
        let LayerOptions::Symbol(o) = out else {
            panic!("kind changed");
        };
        assert_eq!(o.source, Some(SourceId::new("spider")));
        assert_eq!(o.filter, Some(Filter::PointGeometry));
        assert!(o.icon.allow_overlap);
        assert!(o.icon.ignore_placement);
    }

    #[test]
    fn bubble_copy_keeps_icon_free_style() {
        let bubble = LayerOptions::Bubble(BubbleLayerOptions::default());
        let out = spider_point_options(&bubble, &SourceId::new("spider")).expect("point layer");
        assert_eq!(out.source(), Some(&SourceId::new("spider")));
        assert!(spider_point_options(&LayerOptions::Line(LineLayerOptions::default()), &SourceId::new("s")).is_none());
    }

    #[test]
    fn create_registers_source_then_lines_then_points() {
        let mut host = RecordingHost::default();
        let set = SpiderLayerSet::create(&mut host, &symbol_layer(), &LineLayerOptions::default(), true)
            .expect("created");

        assert_eq!(host.sources, vec![set.source().clone()]);
        assert_eq!(host.layers.len(), 2);
        assert_eq!(host.layers[0].0, set.line_layer().id);
        assert_eq!(host.layers[1].0, set.point_layer().id);
        assert_eq!(set.line_layer().options.source(), Some(set.source()));
        assert!(set.is_empty());
    }

    #[test]
    fn create_rejects_line_layers_without_side_effects() {
        let mut host = RecordingHost::default();
        let line = LayerOptions::Line(LineLayerOptions::default());
        assert!(SpiderLayerSet::create(&mut host, &line, &LineLayerOptions::default(), true).is_none());
        assert!(host.sources.is_empty());
        assert!(host.layers.is_empty());
    }

    #[test]
    fn populate_replaces_and_clear_is_idempotent() {
        let mut host = RecordingHost::default();
        let mut set = SpiderLayerSet::create(&mut host, &symbol_layer(), &LineLayerOptions::default(), true)
            .expect("created");

        let p = |x: f64| Feature::point(Position::new(x, 0.0));
        set.populate(&mut host, vec![p(1.0), p(2.0)]);
        set.populate(&mut host, vec![p(3.0)]);
        assert_eq!(set.len(), 1);

        assert!(set.clear(&mut host));
        assert!(!set.clear(&mut host));
        assert!(!set.clear(&mut host));
        assert!(set.is_empty());

        let src = set.source().clone();
        assert_eq!(host.data_pushes, vec![(src.clone(), 2), (src.clone(), 1), (src, 0)]);
    }

    #[test]
    fn restyle_keeps_binding_and_visibility() {
        let mut host = RecordingHost::default();
        let mut set = SpiderLayerSet::create(&mut host, &symbol_layer(), &LineLayerOptions::default(), true)
            .expect("created");

        set.set_visible(&mut host, false);
        let blue = LineLayerOptions {
            stroke_color: StrokeColor::Fixed("blue".into()),
            ..LineLayerOptions::default()
        };
        set.set_stick_options(&mut host, &blue);

        let lines = &set.line_layer().options;
        assert!(!lines.visible());
        assert_eq!(lines.source(), Some(set.source()));
        assert!(!set.point_layer().options.visible());
        assert_eq!(host.layers[0].1, *lines);
    }

    #[test]
    fn hover_addresses_connector_by_stick_id() {
        let mut host = RecordingHost::default();
        let set = SpiderLayerSet::create(&mut host, &symbol_layer(), &LineLayerOptions::default(), true)
            .expect("created");

        set.set_stick_hover(&mut host, "2", true);
        assert_eq!(
            host.states,
            vec![(set.source().clone(), FeatureId::String("2".into()), FeatureState { hover: true })]
        );
    }

    #[test]
    fn remove_unregisters_everything() {
        let mut host = RecordingHost::default();
        let mut set = SpiderLayerSet::create(&mut host, &symbol_layer(), &LineLayerOptions::default(), true)
            .expect("created");
        set.populate(&mut host, vec![Feature::point(Position::new(0.0, 0.0))]);

        set.remove(&mut host);
        assert!(host.sources.is_empty());
        assert!(host.layers.is_empty());
    }
}
