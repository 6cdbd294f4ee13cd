/// Screen-space vector in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// A point on the map canvas, in pixels from the top-left corner.
pub type Pixel = Vec2;

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset of `length` pixels along `angle_rad`, measured from +x towards +y.
    ///
    /// Screen y grows downwards, so positive angles turn clockwise on screen.
    pub fn from_polar(length: f64, angle_rad: f64) -> Self {
        Self::new(length * angle_rad.cos(), length * angle_rad.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, k: f64) -> Self::Output {
        Self::new(self.x * k, self.y * k)
    }
}
