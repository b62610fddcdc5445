//! Geographic position in T32 angular units, and the Web Mercator projection
//! used by the (out-of-scope) map display.

use serde::Serialize;

use crate::types::{AdsbError, Result};

/// One turn (2π rad) expressed in T32 ticks.
pub const TURN: i64 = 1i64 << 32;

/// Valid latitude range in T32 ticks: [-90°, 90°] maps to [-2^30, 2^30].
const LAT_T32_MAX: i64 = 1i64 << 30;

/// A geographic position using T32 fixed-point angles (one turn = 2^32).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeoPosition {
    pub lon_t32: i32,
    pub lat_t32: i32,
}

impl GeoPosition {
    pub fn new(lon_t32: i32, lat_t32: i32) -> Result<Self> {
        if (lat_t32 as i64) < -LAT_T32_MAX || (lat_t32 as i64) > LAT_T32_MAX {
            return Err(AdsbError::InvalidArgument(format!(
                "latitude {lat_t32} out of T32 range"
            )));
        }
        Ok(GeoPosition { lon_t32, lat_t32 })
    }

    pub fn lon_turns(&self) -> f64 {
        self.lon_t32 as f64 / TURN as f64
    }

    pub fn lat_turns(&self) -> f64 {
        self.lat_t32 as f64 / TURN as f64
    }

    pub fn lon_rad(&self) -> f64 {
        self.lon_turns() * std::f64::consts::TAU
    }

    pub fn lat_rad(&self) -> f64 {
        self.lat_turns() * std::f64::consts::TAU
    }
}

/// Web Mercator tile-space x coordinate at zoom `z`, for `lon` in radians.
pub fn mercator_x(z: u32, lon_rad: f64) -> f64 {
    2f64.powi(8 + z as i32) * (lon_rad / std::f64::consts::TAU + 0.5)
}

/// Web Mercator tile-space y coordinate at zoom `z`, for `lat` in radians.
pub fn mercator_y(z: u32, lat_rad: f64) -> f64 {
    2f64.powi(8 + z as i32) * (-lat_rad.tan().asinh() / std::f64::consts::TAU + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(GeoPosition::new(0, (LAT_T32_MAX + 1) as i32).is_err());
        assert!(GeoPosition::new(0, LAT_T32_MAX as i32).is_ok());
        assert!(GeoPosition::new(0, -(LAT_T32_MAX as i32)).is_ok());
    }

    #[test]
    fn mercator_origin_at_zoom_zero() {
        assert!((mercator_x(0, 0.0) - 128.0).abs() < 1e-9);
        assert!((mercator_y(0, 0.0) - 128.0).abs() < 1e-9);
    }
}
