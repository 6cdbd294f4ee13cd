use std::f64::consts::PI;

use super::{Pixel, Position, Vec2};

/// Latitude limit of the square Web Mercator world.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Batch conversion between geographic positions and canvas pixels.
///
/// Implementations must return exactly one output per input, in input order.
pub trait Projection {
    fn positions_to_pixels(&self, positions: &[Position]) -> Vec<Pixel>;
    fn pixels_to_positions(&self, pixels: &[Pixel]) -> Vec<Position>;
}

/// A Web Mercator camera over a fixed-size canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub center: Position,
    pub zoom: f64,
    pub width_px: f64,
    pub height_px: f64,
    /// Edge length of one world tile at zoom 0.
    pub tile_size: f64,
}

impl Viewport {
    pub fn new(center: Position, zoom: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            center,
            zoom,
            width_px,
            height_px,
            tile_size: 512.0,
        }
    }

    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// World size in pixels at the current zoom.
    pub fn world_size(&self) -> f64 {
        self.tile_size * 2f64.powf(self.zoom)
    }

    pub fn project(&self, p: Position) -> Pixel {
        let origin = self.world_pixel(self.center);
        let half = Vec2::new(self.width_px / 2.0, self.height_px / 2.0);
        self.world_pixel(p) - origin + half
    }

    pub fn unproject(&self, px: Pixel) -> Position {
        let origin = self.world_pixel(self.center);
        let half = Vec2::new(self.width_px / 2.0, self.height_px / 2.0);
        let world = px - half + origin;
        let size = self.world_size();

        let lon = world.x / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * world.y / size);
        let lat = n.sinh().atan().to_degrees();
        Position::new(lon, lat)
    }

    fn world_pixel(&self, p: Position) -> Pixel {
        let size = self.world_size();
        let lat = p.lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
        let x = (p.lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        Vec2::new(x, y)
    }
}

impl Projection for Viewport {
    fn positions_to_pixels(&self, positions: &[Position]) -> Vec<Pixel> {
        positions.iter().map(|p| self.project(*p)).collect()
    }

    fn pixels_to_positions(&self, pixels: &[Pixel]) -> Vec<Position> {
        pixels.iter().map(|px| self.unproject(*px)).collect()
    }
}
