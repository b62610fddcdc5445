//! Decode the payload of a raw message into a typed ADS-B message.
//!
//! Covers identification (TC 1-4), airborne position (TC 9-18, 20-22), and
//! airborne velocity (TC 19). Every other type code is rejected upstream by
//! [`crate::frame::classify`].

use serde::Serialize;

use crate::bytes::{bit, bits};
use crate::frame::{classify, MessageCategory, RawMessage};
use crate::types::{Callsign, IcaoAddress};
use crate::units::{feet_to_meters, knots_to_mps};

/// CPR frame parity: which of the two latitude-zoning constants applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Parity {
    Even,
    Odd,
}

/// A decoded ADS-B message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TypedMessage {
    Identification {
        ts: i64,
        icao: IcaoAddress,
        category: u8,
        callsign: Callsign,
    },
    AirbornePosition {
        ts: i64,
        icao: IcaoAddress,
        altitude_m: f64,
        parity: Parity,
        x: f64,
        y: f64,
    },
    AirborneVelocity {
        ts: i64,
        icao: IcaoAddress,
        speed_mps: f64,
        track_or_heading_rad: f64,
    },
}

impl TypedMessage {
    pub fn timestamp_ns(&self) -> i64 {
        match self {
            TypedMessage::Identification { ts, .. } => *ts,
            TypedMessage::AirbornePosition { ts, .. } => *ts,
            TypedMessage::AirborneVelocity { ts, .. } => *ts,
        }
    }

    pub fn icao_address(&self) -> IcaoAddress {
        match self {
            TypedMessage::Identification { icao, .. } => *icao,
            TypedMessage::AirbornePosition { icao, .. } => *icao,
            TypedMessage::AirborneVelocity { icao, .. } => *icao,
        }
    }
}

/// Decode a raw message into a typed message, dispatching on type code.
/// Returns `None` on any soft rejection (unrecognized type code, invalid
/// callsign character, invalid altitude encoding, unusable velocity field).
pub fn decode(raw: &RawMessage) -> Option<TypedMessage> {
    let payload = raw.payload();
    let type_code = raw.type_code();
    match classify(type_code)? {
        MessageCategory::Identification => decode_identification(raw, payload, type_code),
        MessageCategory::AirbornePosition => decode_airborne_position(raw, payload),
        MessageCategory::AirborneVelocity => decode_airborne_velocity(raw, payload),
    }
}

fn decode_identification(raw: &RawMessage, payload: u64, type_code: u8) -> Option<TypedMessage> {
    let mut chars = String::with_capacity(8);
    for i in 0..8 {
        let hi = 48 - 6 * i;
        let lo = hi - 6;
        let n = bits(payload, lo, hi);
        let c = match n {
            1..=26 => (b'A' + (n as u8 - 1)) as char,
            48..=57 => (b'0' + (n as u8 - 48)) as char,
            32 => ' ',
            _ => return None,
        };
        chars.push(c);
    }
    let callsign = Callsign::parse(chars.trim_end()).ok()?;
    let category = (((14 - type_code) << 4) | bits(payload, 48, 51) as u8) as u8;

    Some(TypedMessage::Identification {
        ts: raw.timestamp_ns,
        icao: raw.icao_address(),
        category,
        callsign,
    })
}

/// Fixed permutation realigning the 12 raw altitude bits before Gray
/// decoding. `REALIGN[k]` names the source bit (0-indexed, LSB=0) feeding
/// output position `k`, written MSB-first.
const REALIGN: [u32; 12] = [4, 2, 0, 10, 8, 6, 5, 3, 1, 11, 9, 7];

fn gray_decode(g: u32) -> u32 {
    let mut b = g;
    b ^= b >> 1;
    b ^= b >> 2;
    b ^= b >> 4;
    b ^= b >> 8;
    b
}

fn decode_altitude(raw_alt: u64) -> Option<f64> {
    let a = raw_alt as u32 & 0xFFF;
    if bit(a as u64, 4) {
        // Trivial case: 11-bit altitude with the Q bit spliced out.
        let a_prime = ((a >> 5) << 4) | (a & 0xF);
        return Some(feet_to_meters(-1000.0 + 25.0 * a_prime as f64));
    }

    let mut realigned: u32 = 0;
    for (k, &src) in REALIGN.iter().enumerate() {
        let b = (a >> src) & 1;
        realigned |= b << (11 - k);
    }

    let lsb_raw = realigned & 0x7;
    let msb_raw = (realigned >> 3) & 0x1FF;
    let lsb = gray_decode(lsb_raw);
    let msb = gray_decode(msb_raw);

    let mut lsb = match lsb {
        0 | 5 | 6 => return None,
        7 => 5,
        other => other,
    };
    if msb % 2 == 1 {
        lsb = 6 - lsb;
    }
    Some(feet_to_meters(-1300.0 + 100.0 * lsb as f64 + 500.0 * msb as f64))
}

fn decode_airborne_position(raw: &RawMessage, payload: u64) -> Option<TypedMessage> {
    let lon_raw = bits(payload, 0, 17);
    let lat_raw = bits(payload, 17, 34);
    let parity = if bit(payload, 34) {
        Parity::Odd
    } else {
        Parity::Even
    };
    let alt_raw = bits(payload, 36, 48);
    let altitude_m = decode_altitude(alt_raw)?;

    let x = lon_raw as f64 / 131072.0;
    let y = lat_raw as f64 / 131072.0;

    Some(TypedMessage::AirbornePosition {
        ts: raw.timestamp_ns,
        icao: raw.icao_address(),
        altitude_m,
        parity,
        x,
        y,
    })
}

fn decode_airborne_velocity(raw: &RawMessage, payload: u64) -> Option<TypedMessage> {
    let subtype = bits(payload, 48, 51);
    let useful = bits(payload, 21, 43);

    let (speed_mps, track_or_heading_rad) = match subtype {
        1 | 2 => {
            let vns_raw = bits(useful, 0, 10);
            let vew_raw = bits(useful, 11, 21);
            if vns_raw == 0 || vew_raw == 0 {
                return None;
            }
            let mut vns = vns_raw as f64 - 1.0;
            let mut vew = vew_raw as f64 - 1.0;
            if bit(useful, 10) {
                vns = -vns;
            }
            if bit(useful, 21) {
                vew = -vew;
            }
            let speed_raw = vew.hypot(vns);
            let knots = if subtype == 2 { speed_raw * 4.0 } else { speed_raw };
            let mut track = vew.atan2(vns);
            if track < 0.0 {
                track += std::f64::consts::TAU;
            }
            (knots_to_mps(knots), track)
        }
        3 | 4 => {
            if !bit(useful, 21) {
                return None;
            }
            let heading_raw = bits(useful, 11, 21);
            let heading_rad = (heading_raw as f64 / 1024.0) * std::f64::consts::TAU;
            let speed_raw = bits(useful, 0, 10);
            if speed_raw == 0 {
                return None;
            }
            let knots_base = speed_raw as f64 - 1.0;
            let knots = if subtype == 4 { knots_base * 4.0 } else { knots_base };
            (knots_to_mps(knots), heading_rad)
        }
        _ => return None,
    };

    Some(TypedMessage::AirborneVelocity {
        ts: raw.timestamp_ns,
        icao: raw.icao_address(),
        speed_mps,
        track_or_heading_rad,
    })
}
