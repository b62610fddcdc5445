//! Demodulator — locates Mode S extended squitter preambles in the power
//! stream and recovers 14-byte downlink-format-17 frames.
//!
//! Sampling rate is fixed at 10 power samples per bit (1 sample = 100 ns).
//! The demodulator pulls from a [`PowerWindow`] one sample at a time,
//! tracking a correlator peak across steps, and only materializes bytes once
//! a preamble candidate is confirmed.

use std::io::Read;

use crate::frame::RawMessage;
use crate::types::Result;
use crate::window::PowerWindow;

/// Window width: 8 µs preamble + 112 µs payload, at 10 samples/bit.
pub const WINDOW_SIZE: usize = 1200;

/// Offset (in power samples) where bit 0 of the payload begins.
const PAYLOAD_START: usize = 80;
const SAMPLES_PER_BIT: usize = 10;

fn peak_sum(window: &PowerWindow<impl Read>, k: usize) -> i64 {
    window.get(k) + window.get(k + 10) + window.get(k + 35) + window.get(k + 45)
}

fn valley_sum(window: &PowerWindow<impl Read>, k: usize) -> i64 {
    window.get(k + 5)
        + window.get(k + 15)
        + window.get(k + 20)
        + window.get(k + 25)
        + window.get(k + 30)
        + window.get(k + 40)
}

/// Whether the correlator has found a local peak that is at least twice the
/// surrounding valley energy — the signature of a Mode S preamble.
fn is_candidate(p_prev: i64, p_cur: i64, p_next: i64, valley: i64) -> bool {
    p_prev < p_cur && p_cur > p_next && p_cur >= 2 * valley
}

/// Pulls 14-byte DF17 frames out of a power sample stream.
pub struct Demodulator<R> {
    window: PowerWindow<R>,
    p_prev: i64,
}

impl<R: Read> Demodulator<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Demodulator {
            window: PowerWindow::new(reader, WINDOW_SIZE)?,
            p_prev: i64::MIN,
        })
    }

    fn decode_bit(&self, b: usize) -> u8 {
        let lo = self.window.get(PAYLOAD_START + SAMPLES_PER_BIT * b);
        let hi = self.window.get(PAYLOAD_START + SAMPLES_PER_BIT * b + 5);
        if lo < hi {
            0
        } else {
            1
        }
    }

    fn decode_byte(&self, byte_index: usize) -> u8 {
        let mut byte = 0u8;
        for k in 0..8 {
            byte = (byte << 1) | self.decode_bit(byte_index * 8 + k);
        }
        byte
    }

    /// Decode the 14 bytes currently aligned at the front of the window,
    /// bailing out early on a non-DF17 first byte.
    fn try_decode_frame(&self) -> Option<RawMessage> {
        let byte0 = self.decode_byte(0);
        if (byte0 >> 3) & 0x1F != 17 {
            return None;
        }
        let mut bytes = Vec::with_capacity(14);
        bytes.push(byte0);
        for i in 1..14 {
            bytes.push(self.decode_byte(i));
        }
        let timestamp_ns = self.window.position() as i64 * 100;
        RawMessage::of(timestamp_ns, bytes)
    }

    /// Returns the next CRC-valid DF17 frame, or `None` once the stream is
    /// exhausted.
    pub fn next_message(&mut self) -> Result<Option<RawMessage>> {
        loop {
            if !self.window.is_full() {
                return Ok(None);
            }
            let p_cur = peak_sum(&self.window, 0);
            let p_next = peak_sum(&self.window, 1);
            let valley = valley_sum(&self.window, 0);

            if is_candidate(self.p_prev, p_cur, p_next, valley) {
                if let Some(message) = self.try_decode_frame() {
                    self.window.advance_by(WINDOW_SIZE)?;
                    self.p_prev = i64::MIN;
                    return Ok(Some(message));
                }
            }

            self.p_prev = p_cur;
            self.window.advance()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_boundary_at_exactly_twice_valley() {
        assert!(is_candidate(0, 100, 50, 50));
    }

    #[test]
    fn candidate_rejected_just_below_threshold() {
        assert!(!is_candidate(0, 99, 50, 50));
    }

    #[test]
    fn candidate_requires_local_peak() {
        assert!(!is_candidate(100, 100, 50, 10));
        assert!(!is_candidate(0, 100, 100, 10));
    }

    #[test]
    fn next_message_none_on_short_stream() {
        let bytes = vec![0u8; 64];
        let mut demod = Demodulator::new(&bytes[..]).unwrap();
        assert!(demod.next_message().unwrap().is_none());
    }
}
