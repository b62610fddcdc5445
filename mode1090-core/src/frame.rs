//! Raw Mode S extended squitter frames and the type-code dispatch table.

use crate::bytes::{bits, ByteString};
use crate::crc;
use crate::types::IcaoAddress;

/// A CRC-validated 14-byte downlink-format-17 frame with its capture
/// timestamp.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub timestamp_ns: i64,
    bytes: ByteString,
}

impl RawMessage {
    /// Construct from a 14-byte frame, validating CRC. Returns `None` on any
    /// soft rejection (wrong length or CRC mismatch).
    pub fn of(timestamp_ns: i64, bytes: Vec<u8>) -> Option<Self> {
        if bytes.len() != 14 || crc::crc24(&bytes) != 0 {
            return None;
        }
        Some(RawMessage {
            timestamp_ns,
            bytes: ByteString::new(bytes),
        })
    }

    /// Expected frame size in bytes for a message whose first byte is
    /// `byte0`. Only downlink format 17 (extended squitter) is recognized;
    /// every other format yields 0 (skip without decoding).
    pub fn size(byte0: u8) -> usize {
        if (byte0 >> 3) & 0x1F == 17 {
            14
        } else {
            0
        }
    }

    pub fn downlink_format(&self) -> u8 {
        bits(self.bytes.byte(0) as u64, 3, 8) as u8
    }

    pub fn icao_address(&self) -> IcaoAddress {
        IcaoAddress::from_bytes([self.bytes.byte(1), self.bytes.byte(2), self.bytes.byte(3)])
    }

    pub fn payload(&self) -> u64 {
        self.bytes.bytes_in_range(4, 11)
    }

    pub fn type_code(&self) -> u8 {
        bits(self.payload(), 51, 56) as u8
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

/// Coarse message category, used to dispatch into [`crate::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Identification,
    AirbornePosition,
    AirborneVelocity,
}

/// Classify a raw message's type code. `None` means unrecognized — the
/// message is dropped without further decoding.
pub fn classify(type_code: u8) -> Option<MessageCategory> {
    match type_code {
        1..=4 => Some(MessageCategory::Identification),
        9..=18 | 20..=22 => Some(MessageCategory::AirbornePosition),
        19 => Some(MessageCategory::AirborneVelocity),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_decode(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    #[test]
    fn accepts_valid_frame() {
        let bytes = hex_decode("8D4840D6202CC371C32CE0576098");
        let msg = RawMessage::of(0, bytes).unwrap();
        assert_eq!(msg.downlink_format(), 17);
        assert_eq!(msg.icao_address().to_string(), "4840D6");
    }

    #[test]
    fn rejects_corrupted_frame() {
        let mut bytes = hex_decode("8D4840D6202CC371C32CE0576098");
        bytes[5] ^= 0x01;
        assert!(RawMessage::of(0, bytes).is_none());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(RawMessage::of(0, vec![0; 13]).is_none());
    }

    #[test]
    fn size_is_14_only_for_df17() {
        assert_eq!(RawMessage::size(17 << 3), 14);
        assert_eq!(RawMessage::size(0), 0);
    }

    #[test]
    fn classify_dispatch_table() {
        assert_eq!(classify(2), Some(MessageCategory::Identification));
        assert_eq!(classify(11), Some(MessageCategory::AirbornePosition));
        assert_eq!(classify(21), Some(MessageCategory::AirbornePosition));
        assert_eq!(classify(19), Some(MessageCategory::AirborneVelocity));
        assert_eq!(classify(0), None);
        assert_eq!(classify(23), None);
    }
}
