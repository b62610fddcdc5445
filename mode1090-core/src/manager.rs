//! State manager — ICAO-keyed aircraft state with lazy metadata lookup and
//! staleness purge.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};

use crate::accumulator::AircraftAccumulator;
use crate::aircraft_db::MetadataStore;
use crate::message::TypedMessage;
use crate::types::{AircraftState, IcaoAddress};

/// Aircraft whose last message is older than this (relative to the most
/// recently processed message) are dropped on the next [`StateManager::purge`].
pub const STALE_TIMEOUT_NS: i64 = 60_000_000_000;

/// Owns every tracked aircraft's accumulator, keyed by ICAO address, plus
/// the subset that has resolved a position and is therefore "known".
pub struct StateManager<R> {
    accumulators: HashMap<IcaoAddress, AircraftAccumulator>,
    known: HashSet<IcaoAddress>,
    metadata: Option<MetadataStore<R>>,
    last_update_ts: i64,
}

impl<R: Read + Seek> StateManager<R> {
    pub fn new(metadata: Option<MetadataStore<R>>) -> Self {
        StateManager {
            accumulators: HashMap::new(),
            known: HashSet::new(),
            metadata,
            last_update_ts: 0,
        }
    }

    /// Dispatch a decoded message to its aircraft's accumulator, creating
    /// one (with a metadata lookup) on first sighting.
    pub fn update_with_message(&mut self, message: &TypedMessage) {
        self.last_update_ts = message.timestamp_ns();
        let icao = message.icao_address();

        let metadata = &mut self.metadata;
        self.accumulators
            .entry(icao)
            .or_insert_with(|| {
                let looked_up = metadata.as_mut().and_then(|store| store.lookup(icao));
                AircraftAccumulator::new(AircraftState::new(icao, looked_up, message.timestamp_ns()))
            })
            .update(message);

        let has_position = self
            .accumulators
            .get(&icao)
            .map(|acc| acc.state.position.is_some())
            .unwrap_or(false);
        if has_position {
            self.known.insert(icao);
        }
    }

    /// Drop every aircraft whose last message predates the staleness cutoff
    /// from both the accumulator map and the known set.
    pub fn purge(&mut self) {
        let cutoff = self.last_update_ts - STALE_TIMEOUT_NS;
        let stale: Vec<IcaoAddress> = self
            .accumulators
            .iter()
            .filter(|(_, acc)| acc.state.last_message_ts < cutoff)
            .map(|(icao, _)| *icao)
            .collect();
        for icao in stale {
            self.accumulators.remove(&icao);
            self.known.remove(&icao);
        }
    }

    /// The live, observable set of aircraft known to have a resolved
    /// position.
    pub fn known_aircraft(&self) -> impl Iterator<Item = &AircraftState> {
        self.known
            .iter()
            .filter_map(move |icao| self.accumulators.get(icao).map(|acc| &acc.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Parity;
    use std::io::Cursor;

    fn icao(s: &str) -> IcaoAddress {
        IcaoAddress::parse(s).unwrap()
    }

    fn position_message(ts: i64, addr: &str, parity: Parity) -> TypedMessage {
        TypedMessage::AirbornePosition {
            ts,
            icao: icao(addr),
            altitude_m: 1000.0,
            parity,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn admits_aircraft_once_position_resolves() {
        let mut manager: StateManager<Cursor<Vec<u8>>> = StateManager::new(None);
        manager.update_with_message(&position_message(0, "4840D6", Parity::Even));
        assert_eq!(manager.known_aircraft().count(), 0);
        manager.update_with_message(&position_message(1_000_000_000, "4840D6", Parity::Odd));
        assert_eq!(manager.known_aircraft().count(), 1);
    }

    #[test]
    fn purge_drops_stale_aircraft_but_keeps_fresh_ones() {
        let mut manager: StateManager<Cursor<Vec<u8>>> = StateManager::new(None);
        manager.update_with_message(&position_message(0, "4840D6", Parity::Even));
        manager.update_with_message(&position_message(1_000_000_000, "4840D6", Parity::Odd));
        manager.update_with_message(&position_message(70_000_000_000, "112233", Parity::Even));
        manager.purge();
        assert!(manager.known_aircraft().all(|ac| ac.icao != icao("4840D6")));
    }
}
