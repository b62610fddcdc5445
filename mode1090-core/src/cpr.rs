//! Compact Position Reporting global decode (SPEC_FULL.md §4.H).
//!
//! Unlike degrees-based CPR implementations, this one works entirely in
//! "turns" (fractions of a full circle) and converts to T32 ticks only at
//! the very end, matching the normalized `x`/`y` coordinates produced by
//! [`crate::message::decode`].

use std::f64::consts::TAU;

use crate::geo::GeoPosition;
use crate::message::Parity;

const NZ_EVEN: f64 = 60.0;
const NZ_ODD: f64 = 59.0;
const D_EVEN: f64 = 1.0 / NZ_EVEN;
const D_ODD: f64 = 1.0 / NZ_ODD;

/// Maximum time between paired even/odd frames for global decode (ns).
pub const MAX_PAIR_AGE_NS: i64 = 10_000_000_000;

/// Number of longitude zones at the given latitude (in turns). Returns 1 at
/// the poles, where CPR collapses to a single zone.
fn nl(lat_turns: f64) -> i32 {
    let lat_rad = lat_turns * TAU;
    let cos_lat = lat_rad.cos();
    if cos_lat == 0.0 {
        return 1;
    }
    let a = 1.0 - (1.0 - (TAU * D_EVEN).cos()) / (cos_lat * cos_lat);
    if !(-1.0..=1.0).contains(&a) {
        return 1;
    }
    let angle = a.acos();
    if angle == 0.0 {
        return 1;
    }
    (TAU / angle).floor().max(1.0) as i32
}

/// Global CPR decode from a paired even/odd position report.
///
/// `even` and `odd` are normalized `(x, y)` coordinates in `[0, 1)`.
/// `most_recent` selects which of the pair supplies the final longitude
/// zone and latitude.
pub fn global_decode(even: (f64, f64), odd: (f64, f64), most_recent: Parity) -> Option<GeoPosition> {
    let (x0, y0) = even;
    let (x1, y1) = odd;

    let j = (59.0 * y0 - 60.0 * y1).round();
    let j_even = j + if j < 0.0 { 60.0 } else { 0.0 };
    let j_odd = j + if j < 0.0 { 59.0 } else { 0.0 };

    let lat_even = D_EVEN * (j_even + y0);
    let lat_odd = D_ODD * (j_odd + y1);

    let nl_even = nl(lat_even);
    let nl_odd = nl(lat_odd);
    if nl_even != nl_odd {
        return None;
    }
    let nl_val = nl_even;

    let mut lon = if nl_val == 1 {
        match most_recent {
            Parity::Even => x0,
            Parity::Odd => x1,
        }
    } else {
        let m = (x0 * (nl_val - 1) as f64 - x1 * nl_val as f64).round();
        let m_prime = m
            + if m < 0.0 {
                match most_recent {
                    Parity::Even => nl_val as f64,
                    Parity::Odd => (nl_val - 1) as f64,
                }
            } else {
                0.0
            };
        match most_recent {
            Parity::Even => (1.0 / nl_val as f64) * (m_prime + x0),
            Parity::Odd => (1.0 / (nl_val - 1) as f64) * (m_prime + x1),
        }
    };

    let mut lat = match most_recent {
        Parity::Even => lat_even,
        Parity::Odd => lat_odd,
    };

    if lon >= 0.5 {
        lon -= 1.0;
    }
    if lat >= 0.5 {
        lat -= 1.0;
    }

    let lon_t32 = (lon * (1i64 << 32) as f64).round() as i64;
    let lat_t32 = (lat * (1i64 << 32) as f64).round() as i64;

    GeoPosition::new(lon_t32 as i32, lat_t32 as i32).ok()
}
