use serde::{Deserialize, Serialize};

/// Geographic position in degrees (WGS84 longitude/latitude).
///
/// Serialized as a GeoJSON position array `[lon, lat]`; a trailing altitude
/// is accepted on input and dropped.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.lon, p.lat]
    }
}

impl From<[f64; 2]> for Position {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self::new(lon, lat)
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [lon, lat] | [lon, lat, _] => Ok(Self::new(*lon, *lat)),
            other => Err(format!(
                "position must have 2 or 3 elements, got {}",
                other.len()
            )),
        }
    }
}
