//! mode1090-core: decode 1090 MHz ADS-B extended squitter transmissions into
//! aircraft state.
//!
//! No async, no sockets — just algorithms over bytes. Everything from raw
//! IQ samples down to the live aircraft set lives here; wiring it to a real
//! radio or a UI is somebody else's crate.

pub mod accumulator;
pub mod aircraft_db;
pub mod bytes;
pub mod config;
pub mod cpr;
pub mod crc;
pub mod demod;
pub mod frame;
pub mod geo;
pub mod manager;
pub mod message;
pub mod power;
pub mod sample;
pub mod types;
pub mod units;
pub mod window;

pub use accumulator::AircraftAccumulator;
pub use frame::RawMessage;
pub use geo::GeoPosition;
pub use manager::StateManager;
pub use message::TypedMessage;
pub use types::{AdsbError, AircraftState, Result};
