//! Shared error type, value types, and aircraft state record.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::geo::GeoPosition;

/// All errors produced by mode1090-core.
#[derive(Debug, Error)]
pub enum AdsbError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("zip archive error: {0}")]
    Archive(String),
}

pub type Result<T> = std::result::Result<T, AdsbError>;

// ---------------------------------------------------------------------------
// Value types (see SPEC_FULL.md §6 for the governing regexes)
// ---------------------------------------------------------------------------

static ICAO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-F]{6}$").unwrap());
static CALLSIGN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9 ]{0,8}$").unwrap());
static TYPE_DESIGNATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z0-9]{2,4})?$").unwrap());
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ABDGHLPRSTV-][0123468][EJPT-])?$").unwrap());
static REGISTRATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9 .?/_+-]+$").unwrap());

/// 24-bit ICAO aircraft address, rendered as six uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IcaoAddress([u8; 3]);

impl IcaoAddress {
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        IcaoAddress(bytes)
    }

    pub fn parse(hex: &str) -> Result<Self> {
        if !ICAO_RE.is_match(hex) {
            return Err(AdsbError::InvalidArgument(format!(
                "invalid ICAO address: {hex}"
            )));
        }
        let val = u32::from_str_radix(hex, 16).unwrap();
        Ok(IcaoAddress([
            ((val >> 16) & 0xFF) as u8,
            ((val >> 8) & 0xFF) as u8,
            (val & 0xFF) as u8,
        ]))
    }

    pub fn as_bytes(&self) -> [u8; 3] {
        self.0
    }

    /// Last two hex digits, used to locate the metadata archive's CSV shard.
    pub fn last_two_hex(&self) -> String {
        format!("{:02X}", self.0[2])
    }
}

impl std::fmt::Display for IcaoAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// Aircraft callsign: up to 8 characters from `[A-Z0-9 ]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Callsign(String);

impl Callsign {
    pub fn parse(s: &str) -> Result<Self> {
        if !CALLSIGN_RE.is_match(s) {
            return Err(AdsbError::InvalidArgument(format!("invalid callsign: {s}")));
        }
        Ok(Callsign(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Callsign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ICAO aircraft type designator, e.g. `"B738"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDesignator(String);

impl TypeDesignator {
    pub fn parse(s: &str) -> Result<Self> {
        if !TYPE_DESIGNATOR_RE.is_match(s) {
            return Err(AdsbError::InvalidArgument(format!(
                "invalid type designator: {s}"
            )));
        }
        Ok(TypeDesignator(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Wake turbulence description code, e.g. `"L2J"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description(String);

impl Description {
    pub fn parse(s: &str) -> Result<Self> {
        if !DESCRIPTION_RE.is_match(s) {
            return Err(AdsbError::InvalidArgument(format!(
                "invalid description: {s}"
            )));
        }
        Ok(Description(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form aircraft registration / tail number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration(String);

impl Registration {
    pub fn parse(s: &str) -> Result<Self> {
        if !REGISTRATION_RE.is_match(s) {
            return Err(AdsbError::InvalidArgument(format!(
                "invalid registration: {s}"
            )));
        }
        Ok(Registration(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ICAO wake turbulence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WakeCategory {
    Light,
    Medium,
    Heavy,
    Unknown,
}

impl From<&str> for WakeCategory {
    fn from(s: &str) -> Self {
        match s {
            "L" => WakeCategory::Light,
            "M" => WakeCategory::Medium,
            "H" => WakeCategory::Heavy,
            _ => WakeCategory::Unknown,
        }
    }
}

/// Static metadata looked up once, at accumulator-creation time, from the
/// external aircraft archive (see [`crate::aircraft_db`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AircraftMetadata {
    pub registration: Registration,
    pub type_designator: TypeDesignator,
    pub model: String,
    pub description: Description,
    pub wake_category: WakeCategory,
}

// ---------------------------------------------------------------------------
// Aircraft state (SPEC_FULL.md §3)
// ---------------------------------------------------------------------------

/// Sentinel for "not yet known" scalar observations — negative infinity reads
/// naturally as "lower than anything real" without an `Option` at every call
/// site in the hot update path.
pub const UNKNOWN_SCALAR: f64 = f64::NEG_INFINITY;

/// A single trajectory sample: the position and altitude observed together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub position: GeoPosition,
    pub altitude_m: f64,
}

/// Mutable per-aircraft record. See the trajectory invariant in
/// SPEC_FULL.md §3: at most one trajectory point is recorded per unique
/// message timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct AircraftState {
    pub icao: IcaoAddress,
    pub metadata: Option<AircraftMetadata>,

    pub last_message_ts: i64,
    pub category: Option<u8>,
    pub callsign: Option<Callsign>,
    pub position: Option<GeoPosition>,
    pub altitude_m: f64,
    pub velocity_mps: f64,
    pub track_or_heading_rad: f64,

    pub trajectory: Vec<TrajectoryPoint>,
    last_trajectory_ts: Option<i64>,
}

impl AircraftState {
    pub fn new(icao: IcaoAddress, metadata: Option<AircraftMetadata>, ts: i64) -> Self {
        AircraftState {
            icao,
            metadata,
            last_message_ts: ts,
            category: None,
            callsign: None,
            position: None,
            altitude_m: UNKNOWN_SCALAR,
            velocity_mps: UNKNOWN_SCALAR,
            track_or_heading_rad: UNKNOWN_SCALAR,
            trajectory: Vec::new(),
            last_trajectory_ts: None,
        }
    }

    pub fn altitude_known(&self) -> bool {
        self.altitude_m != UNKNOWN_SCALAR
    }

    pub fn set_category(&mut self, ts: i64, category: u8) {
        self.last_message_ts = ts;
        self.category = Some(category);
    }

    pub fn set_callsign(&mut self, ts: i64, callsign: Callsign) {
        self.last_message_ts = ts;
        self.callsign = Some(callsign);
    }

    pub fn set_velocity(&mut self, ts: i64, speed_mps: f64, track_or_heading_rad: f64) {
        self.last_message_ts = ts;
        self.velocity_mps = speed_mps;
        self.track_or_heading_rad = track_or_heading_rad;
    }

    pub fn set_altitude(&mut self, ts: i64, altitude_m: f64) {
        self.last_message_ts = ts;
        self.altitude_m = altitude_m;
        self.refresh_trajectory_point(ts);
    }

    pub fn set_position(&mut self, ts: i64, position: GeoPosition) {
        self.last_message_ts = ts;
        self.position = Some(position);
        self.append_trajectory_point(ts);
    }

    /// Appends a trajectory point for a new position fix, provided altitude
    /// is already known. This is the only path that grows the trajectory.
    fn append_trajectory_point(&mut self, ts: i64) {
        if !self.altitude_known() {
            return;
        }
        self.trajectory.push(TrajectoryPoint {
            position: self.position.unwrap(),
            altitude_m: self.altitude_m,
        });
        self.last_trajectory_ts = Some(ts);
    }

    /// Updates the last trajectory point's altitude in place when it was
    /// produced by the same message; never appends.
    fn refresh_trajectory_point(&mut self, ts: i64) {
        if self.last_trajectory_ts != Some(ts) {
            return;
        }
        if let Some(last) = self.trajectory.last_mut() {
            last.altitude_m = self.altitude_m;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
