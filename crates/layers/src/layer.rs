pub use foundation::ids::LayerId;
use foundation::ids::{FeatureId, SourceId};

use crate::feature::FeatureCollection;
use crate::symbology::LayerOptions;

/// A layer registered with the host map, with the options it was created from.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub id: LayerId,
    pub options: LayerOptions,
}

impl LayerDescriptor {
    pub fn new(id: LayerId, options: LayerOptions) -> Self {
        Self { id, options }
    }
}

/// Per-feature render state the host uses for data-driven styling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct FeatureState {
    pub hover: bool,
}

/// Source and layer management offered by the host map.
///
/// The host owns rendering, hit-testing and id allocation; callers only
/// describe what to draw.
pub trait LayerHost {
    fn add_source(&mut self) -> SourceId;
    fn remove_source(&mut self, source: &SourceId);
    /// Replaces the whole content of `source`.
    fn set_source_data(&mut self, source: &SourceId, data: &FeatureCollection);

    fn add_layer(&mut self, options: &LayerOptions) -> LayerId;
    fn remove_layer(&mut self, layer: LayerId);
    fn set_layer_options(&mut self, layer: LayerId, options: &LayerOptions);

    fn set_feature_state(&mut self, source: &SourceId, feature: &FeatureId, state: FeatureState);
}
