//! Capture-file reader — pre-demodulated, timestamped frames.
//!
//! Used by `replay` mode to exercise the state-accumulation logic against a
//! recorded frame corpus without a real IQ source, skipping the
//! demodulator (and components A-E) entirely.

use std::io::Read;

use mode1090_core::types::AdsbError;
use mode1090_core::{RawMessage, Result};

/// Reads `(timestamp_ns: i64 BE, 14-byte frame)` records until EOF.
pub struct CaptureReader<R> {
    reader: R,
}

impl<R: Read> CaptureReader<R> {
    pub fn new(reader: R) -> Self {
        CaptureReader { reader }
    }

    /// Read the next record, skipping any whose CRC fails to validate.
    /// Returns `None` at a clean end of stream.
    pub fn next_message(&mut self) -> Result<Option<RawMessage>> {
        loop {
            let mut ts_bytes = [0u8; 8];
            if !self.fill_or_eof(&mut ts_bytes)? {
                return Ok(None);
            }
            let ts = i64::from_be_bytes(ts_bytes);

            let mut frame_bytes = vec![0u8; 14];
            if !self.fill_or_eof(&mut frame_bytes)? {
                // A trailing partial record at EOF is not an error.
                return Ok(None);
            }

            if let Some(message) = RawMessage::of(ts, frame_bytes) {
                return Ok(Some(message));
            }
        }
    }

    /// Fill `buf` completely, returning `Ok(true)`. Any EOF reached partway
    /// through — including immediately — is a clean end of stream, not an
    /// I/O error.
    fn fill_or_eof(&mut self, buf: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .reader
                .read(&mut buf[filled..])
                .map_err(AdsbError::Io)?;
            if n == 0 {
                return Ok(false);
            }
            filled += n;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: i64, byte0: u8, icao: [u8; 3]) -> Vec<u8> {
        let mut frame = vec![byte0, icao[0], icao[1], icao[2]];
        frame.extend_from_slice(&[0u8; 7]);
        let crc = mode1090_core::crc::crc24(&frame[..11]);
        frame.push(((crc >> 16) & 0xFF) as u8);
        frame.push(((crc >> 8) & 0xFF) as u8);
        frame.push((crc & 0xFF) as u8);

        let mut record = ts.to_be_bytes().to_vec();
        record.extend_from_slice(&frame);
        record
    }

    #[test]
    fn reads_a_single_valid_record() {
        let bytes = record(1234, 0x8D, [0x11, 0x22, 0x33]);
        let mut reader = CaptureReader::new(&bytes[..]);
        let message = reader.next_message().unwrap().unwrap();
        assert_eq!(message.timestamp_ns, 1234);
        assert_eq!(message.icao_address().to_string(), "112233");
        assert!(reader.next_message().unwrap().is_none());
    }

    #[test]
    fn truncated_trailing_record_is_clean_eof() {
        let mut bytes = record(1234, 0x8D, [0x11, 0x22, 0x33]);
        bytes.truncate(bytes.len() - 3);
        let mut reader = CaptureReader::new(&bytes[..]);
        assert!(reader.next_message().unwrap().is_none());
    }

    #[test]
    fn skips_records_with_bad_crc() {
        let mut bytes = record(1234, 0x8D, [0x11, 0x22, 0x33]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        bytes.extend_from_slice(&record(5678, 0x8D, [0x44, 0x55, 0x66]));
        let mut reader = CaptureReader::new(&bytes[..]);
        let message = reader.next_message().unwrap().unwrap();
        assert_eq!(message.timestamp_ns, 5678);
    }
}
