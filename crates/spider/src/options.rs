use std::fmt;

use layers::{Feature, LineLayerOptions};
use serde::Deserialize;

use crate::layout::LayoutSettings;

/// Largest cluster expanded in place; bigger clusters zoom instead.
pub const DEFAULT_MAX_FEATURES_IN_WEB: usize = 100;

/// Called with the selected member and the cluster it was expanded from.
pub type FeatureSelected = Box<dyn FnMut(&Feature, Option<&Feature>)>;
/// Called when a selection is dropped or a new cluster is opened.
pub type FeatureUnselected = Box<dyn FnMut()>;

/// Complete manager configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiderOptions {
    pub layout: LayoutSettings,
    pub max_features_in_web: usize,
    pub stick_layer_options: LineLayerOptions,
    pub visible: bool,
}

impl Default for SpiderOptions {
    fn default() -> Self {
        Self {
            layout: LayoutSettings::default(),
            max_features_in_web: DEFAULT_MAX_FEATURES_IN_WEB,
            stick_layer_options: LineLayerOptions::default(),
            visible: true,
        }
    }
}

/// What changed when a patch was merged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OptionsDelta {
    pub stick_layer_changed: bool,
    pub visibility_changed: bool,
}

impl SpiderOptions {
    /// Overwrites only the fields present in `patch`.
    pub fn merge(&mut self, patch: &SpiderOptionsPatch) -> OptionsDelta {
        if let Some(v) = patch.circle_spiral_switchover {
            self.layout.circle_spiral_switchover = v;
        }
        if let Some(v) = patch.min_circle_length {
            self.layout.min_circle_length = v;
        }
        if let Some(v) = patch.min_spiral_angle_separation {
            self.layout.min_spiral_angle_separation = v;
        }
        if let Some(v) = patch.spiral_distance_factor {
            self.layout.spiral_distance_factor = v;
        }
        if let Some(v) = patch.max_features_in_web {
            self.max_features_in_web = v;
        }

        let mut delta = OptionsDelta::default();
        if let Some(stick) = &patch.stick_layer_options {
            self.stick_layer_options = stick.clone();
            delta.stick_layer_changed = true;
        }
        if let Some(visible) = patch.visible
            && visible != self.visible
        {
            self.visible = visible;
            delta.visibility_changed = true;
        }
        delta
    }
}

/// Partial configuration update. Absent fields keep their current value.
///
/// Deserializes from camelCase JSON; callbacks can only be attached in code.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpiderOptionsPatch {
    pub circle_spiral_switchover: Option<usize>,
    pub min_circle_length: Option<f64>,
    #[serde(alias = "minSpiralAngleSeperation")]
    pub min_spiral_angle_separation: Option<f64>,
    pub spiral_distance_factor: Option<f64>,
    pub max_features_in_web: Option<usize>,
    pub stick_layer_options: Option<LineLayerOptions>,
    pub visible: Option<bool>,
    #[serde(skip)]
    pub feature_selected: Option<FeatureSelected>,
    #[serde(skip)]
    pub feature_unselected: Option<FeatureUnselected>,
}

impl fmt::Debug for SpiderOptionsPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpiderOptionsPatch")
            .field("circle_spiral_switchover", &self.circle_spiral_switchover)
            .field("min_circle_length", &self.min_circle_length)
            .field("min_spiral_angle_separation", &self.min_spiral_angle_separation)
            .field("spiral_distance_factor", &self.spiral_distance_factor)
            .field("max_features_in_web", &self.max_features_in_web)
            .field("stick_layer_options", &self.stick_layer_options)
            .field("visible", &self.visible)
            .field("feature_selected", &self.feature_selected.is_some())
            .field("feature_unselected", &self.feature_unselected.is_some())
            .finish()
    }
}

impl SpiderOptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circle_spiral_switchover(mut self, n: usize) -> Self {
        self.circle_spiral_switchover = Some(n);
        self
    }

    pub fn min_circle_length(mut self, px: f64) -> Self {
        self.min_circle_length = Some(px);
        self
    }

    pub fn min_spiral_angle_separation(mut self, px: f64) -> Self {
        self.min_spiral_angle_separation = Some(px);
        self
    }

    pub fn spiral_distance_factor(mut self, factor: f64) -> Self {
        self.spiral_distance_factor = Some(factor);
        self
    }

    pub fn max_features_in_web(mut self, n: usize) -> Self {
        self.max_features_in_web = Some(n);
        self
    }

    pub fn stick_layer_options(mut self, options: LineLayerOptions) -> Self {
        self.stick_layer_options = Some(options);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn on_feature_selected(mut self, f: impl FnMut(&Feature, Option<&Feature>) + 'static) -> Self {
        self.feature_selected = Some(Box::new(f));
        self
    }

    pub fn on_feature_unselected(mut self, f: impl FnMut() + 'static) -> Self {
        self.feature_unselected = Some(Box::new(f));
        self
    }

    /// Moves the callbacks out, leaving `None` behind.
    pub fn take_callbacks(&mut self) -> SpiderCallbacks {
        SpiderCallbacks {
            feature_selected: self.feature_selected.take(),
            feature_unselected: self.feature_unselected.take(),
        }
    }
}

#[derive(Default)]
pub struct SpiderCallbacks {
    feature_selected: Option<FeatureSelected>,
    feature_unselected: Option<FeatureUnselected>,
}

impl fmt::Debug for SpiderCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpiderCallbacks")
            .field("feature_selected", &self.feature_selected.is_some())
            .field("feature_unselected", &self.feature_unselected.is_some())
            .finish()
    }
}

impl SpiderCallbacks {
    /// Replaces only the callbacks `other` provides.
    pub fn merge(&mut self, other: SpiderCallbacks) {
        if let Some(f) = other.feature_selected {
            self.feature_selected = Some(f);
        }
        if let Some(f) = other.feature_unselected {
            self.feature_unselected = Some(f);
        }
    }

    pub fn selected(&mut self, member: &Feature, cluster: Option<&Feature>) {
        if let Some(f) = self.feature_selected.as_mut() {
            f(member, cluster);
        }
    }

    pub fn unselected(&mut self) {
        if let Some(f) = self.feature_unselected.as_mut() {
            f();
        }
    }
}
