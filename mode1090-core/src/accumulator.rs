//! State accumulator — wraps one aircraft's state and pairs CPR frames.

use crate::cpr::{self, MAX_PAIR_AGE_NS};
use crate::message::{Parity, TypedMessage};
use crate::types::AircraftState;

/// A single airborne-position report, held until its opposite-parity
/// counterpart arrives (or goes stale).
#[derive(Debug, Clone, Copy)]
struct PositionReport {
    ts: i64,
    x: f64,
    y: f64,
}

/// Wraps one aircraft's observable state, holding the two most recent
/// position reports (one per CPR parity) needed for global decode.
pub struct AircraftAccumulator {
    pub state: AircraftState,
    last_pos: [Option<PositionReport>; 2],
}

impl AircraftAccumulator {
    pub fn new(state: AircraftState) -> Self {
        AircraftAccumulator {
            state,
            last_pos: [None, None],
        }
    }

    /// Apply a typed message, dispatching by variant.
    pub fn update(&mut self, message: &TypedMessage) {
        match message {
            TypedMessage::Identification {
                ts,
                category,
                callsign,
                ..
            } => {
                self.state.set_category(*ts, *category);
                self.state.set_callsign(*ts, callsign.clone());
            }
            TypedMessage::AirbornePosition {
                ts,
                altitude_m,
                parity,
                x,
                y,
                ..
            } => {
                self.state.set_altitude(*ts, *altitude_m);
                self.update_position(*ts, *parity, *x, *y);
            }
            TypedMessage::AirborneVelocity {
                ts,
                speed_mps,
                track_or_heading_rad,
                ..
            } => {
                self.state.set_velocity(*ts, *speed_mps, *track_or_heading_rad);
            }
        }
    }

    fn update_position(&mut self, ts: i64, parity: Parity, x: f64, y: f64) {
        let idx = match parity {
            Parity::Even => 0,
            Parity::Odd => 1,
        };
        self.last_pos[idx] = Some(PositionReport { ts, x, y });

        let Some(other) = self.last_pos[1 - idx] else {
            return;
        };
        if (ts - other.ts).abs() > MAX_PAIR_AGE_NS {
            return;
        }

        let (even, odd) = match parity {
            Parity::Even => ((x, y), (other.x, other.y)),
            Parity::Odd => ((other.x, other.y), (x, y)),
        };
        if let Some(position) = cpr::global_decode(even, odd, parity) {
            self.state.set_position(ts, position);
        }
    }
}
