use std::f64::consts::{PI, TAU};

use foundation::math::{Pixel, Position, Projection, Vec2};
use layers::{Feature, PARENT_ID_KEY, STICK_ID_KEY, feature_id_to_value};
use serde_json::Value;

/// Geometry parameters of an expansion, in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayoutSettings {
    /// Member count above which the spiral layout is used.
    pub circle_spiral_switchover: usize,
    /// Minimum circle radius; also seeds the first spiral leg.
    pub min_circle_length: f64,
    /// Minimum spacing between consecutive spiral members.
    pub min_spiral_angle_separation: f64,
    /// Controls how fast the spiral grows outward.
    pub spiral_distance_factor: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            circle_spiral_switchover: 6,
            min_circle_length: 30.0,
            min_spiral_angle_separation: 25.0,
            spiral_distance_factor: 5.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayoutMode {
    Circle,
    Spiral,
}

impl LayoutSettings {
    pub fn mode_for(&self, count: usize) -> LayoutMode {
        if count > self.circle_spiral_switchover {
            LayoutMode::Spiral
        } else {
            LayoutMode::Circle
        }
    }
}

/// Polar offset of one expanded member from the cluster center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Leg {
    pub angle: f64,
    pub length: f64,
}

impl Leg {
    pub fn offset(&self) -> Vec2 {
        Vec2::from_polar(self.length, self.angle)
    }
}

/// Plans one leg per member, in member order.
pub fn plan_legs(count: usize, settings: &LayoutSettings) -> Vec<Leg> {
    if count == 0 {
        return Vec::new();
    }
    match settings.mode_for(count) {
        LayoutMode::Circle => circle_legs(count, settings),
        LayoutMode::Spiral => spiral_legs(count, settings),
    }
}

fn circle_legs(count: usize, settings: &LayoutSettings) -> Vec<Leg> {
    let n = count as f64;
    let step = TAU / n;
    let length = (settings.spiral_distance_factor / step / TAU * n).max(settings.min_circle_length);
    (0..count)
        .map(|i| Leg {
            angle: step * i as f64,
            length,
        })
        .collect()
}

fn spiral_legs(count: usize, settings: &LayoutSettings) -> Vec<Leg> {
    let growth = TAU * settings.spiral_distance_factor;
    let mut length = settings.min_circle_length / PI;
    let mut angle = 0.0_f64;
    let mut legs = Vec::with_capacity(count);
    for i in 0..count {
        angle += settings.min_spiral_angle_separation / length + i as f64 * 0.0005;
        length += growth / angle;
        legs.push(Leg { angle, length });
    }
    legs
}

/// Builds the connector lines and displaced points for `members` spread
/// around `center`.
///
/// Output is interleaved per member `i`: the line from `center` to the
/// displaced position (feature id `"i"`), then a copy of the member at that
/// position tagged with `_stickId = "i"` and `_parentId` = the member's id
/// (or `null`). All positions are projected back in a single call.
pub fn build_spider<P: Projection + ?Sized>(
    center: Position,
    members: &[Feature],
    settings: &LayoutSettings,
    projection: &P,
) -> Vec<Feature> {
    if members.is_empty() {
        return Vec::new();
    }
    let Some(&center_px) = projection.positions_to_pixels(&[center]).first() else {
        return Vec::new();
    };

    let pixels: Vec<Pixel> = plan_legs(members.len(), settings)
        .iter()
        .map(|leg| center_px + leg.offset())
        .collect();
    let positions = projection.pixels_to_positions(&pixels);

    let mut shapes = Vec::with_capacity(members.len() * 2);
    for (i, (member, position)) in members.iter().zip(positions).enumerate() {
        let stick_id = i.to_string();
        shapes.push(Feature::line(vec![center, position]).with_id(stick_id.clone()));

        let mut properties = member.properties.clone();
        properties.insert(STICK_ID_KEY.to_string(), Value::String(stick_id));
        properties.insert(
            PARENT_ID_KEY.to_string(),
            member.id.as_ref().map(feature_id_to_value).unwrap_or(Value::Null),
        );
        shapes.push(Feature::point(position).with_properties(properties));
    }
    shapes
}
