use foundation::ids::SourceId;
use serde::{Deserialize, Serialize};

use crate::feature::{Properties, copy_filtered};

/// Connector line color, optionally switching on the `hover` feature state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrokeColor {
    Fixed(String),
    HoverCase { hover: String, normal: String },
}

impl Default for StrokeColor {
    fn default() -> Self {
        StrokeColor::HoverCase {
            hover: "red".to_string(),
            normal: "black".to_string(),
        }
    }
}

/// Which features a layer draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    /// Clusters only.
    HasPointCount,
    /// Everything except clusters.
    NotHasPointCount,
    /// Point or MultiPoint geometries.
    PointGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineLayerOptions {
    pub source: Option<SourceId>,
    pub stroke_color: StrokeColor,
    pub stroke_width: f64,
    pub visible: bool,
}

impl Default for LineLayerOptions {
    fn default() -> Self {
        Self {
            source: None,
            stroke_color: StrokeColor::default(),
            stroke_width: 1.0,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconOptions {
    pub image: Option<String>,
    pub allow_overlap: bool,
    pub ignore_placement: bool,
}

/// Circle markers. `paint` holds renderer style expressions verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BubbleLayerOptions {
    pub source: Option<SourceId>,
    pub filter: Option<Filter>,
    pub visible: bool,
    pub paint: Properties,
}

impl Default for BubbleLayerOptions {
    fn default() -> Self {
        Self {
            source: None,
            filter: None,
            visible: true,
            paint: Properties::new(),
        }
    }
}

/// Icon/text markers. `paint` holds renderer style expressions verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SymbolLayerOptions {
    pub source: Option<SourceId>,
    pub filter: Option<Filter>,
    pub visible: bool,
    pub icon: IconOptions,
    pub paint: Properties,
}

impl Default for SymbolLayerOptions {
    fn default() -> Self {
        Self {
            source: None,
            filter: None,
            visible: true,
            icon: IconOptions::default(),
            paint: Properties::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerOptions {
    Bubble(BubbleLayerOptions),
    Symbol(SymbolLayerOptions),
    Line(LineLayerOptions),
}

impl LayerOptions {
    pub fn source(&self) -> Option<&SourceId> {
        match self {
            LayerOptions::Bubble(o) => o.source.as_ref(),
            LayerOptions::Symbol(o) => o.source.as_ref(),
            LayerOptions::Line(o) => o.source.as_ref(),
        }
    }

    pub fn set_source(&mut self, source: Option<SourceId>) {
        match self {
            LayerOptions::Bubble(o) => o.source = source,
            LayerOptions::Symbol(o) => o.source = source,
            LayerOptions::Line(o) => o.source = source,
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            LayerOptions::Bubble(o) => o.visible,
            LayerOptions::Symbol(o) => o.visible,
            LayerOptions::Line(o) => o.visible,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            LayerOptions::Bubble(o) => o.visible = visible,
            LayerOptions::Symbol(o) => o.visible = visible,
            LayerOptions::Line(o) => o.visible = visible,
        }
    }

    /// Bubble and symbol layers draw point features; line layers do not.
    pub fn is_point_layer(&self) -> bool {
        !matches!(self, LayerOptions::Line(_))
    }

    /// Copy of these options with the data source binding stripped.
    pub fn without_source(&self) -> LayerOptions {
        let mut out = self.clone();
        out.set_source(None);
        match &mut out {
            LayerOptions::Bubble(o) => o.paint = copy_filtered(&o.paint, &["source"]),
            LayerOptions::Symbol(o) => o.paint = copy_filtered(&o.paint, &["source"]),
            LayerOptions::Line(_) => {}
        }
        out
    }
}
