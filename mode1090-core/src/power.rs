//! Power computer — turns signed IQ samples into power samples.
//!
//! Power is the squared magnitude of an I/Q vector reconstructed from a
//! short history of samples, following the single-sideband combination used
//! by direct-sampling 1090 MHz front ends (see SPEC_FULL.md §4.B).

use std::io::Read;

use crate::sample::SampleDecoder;
use crate::types::{AdsbError, Result};

/// History depth: the last 8 samples are enough to reconstruct one I/Q pair.
const HISTORY: usize = 8;
const HISTORY_MASK: usize = HISTORY - 1;

/// Computes power samples from a stream of signed samples, `2` samples at a
/// time, maintaining a rolling 8-sample history across batches.
pub struct PowerComputer<R> {
    decoder: SampleDecoder<R>,
    history: [i32; HISTORY],
    /// Index one past the most recently written history slot.
    next: usize,
    raw_buf: Vec<i32>,
}

impl<R: Read> PowerComputer<R> {
    /// `batch_size` is the number of power samples produced per
    /// [`Self::read_batch`] call; it must be nonzero and a multiple of 8.
    pub fn new(reader: R, batch_size: usize) -> Result<Self> {
        if batch_size == 0 || batch_size % HISTORY != 0 {
            return Err(AdsbError::InvalidArgument(format!(
                "power batch size {} must be nonzero and divisible by {}",
                batch_size, HISTORY
            )));
        }
        Ok(PowerComputer {
            decoder: SampleDecoder::new(reader, 2 * batch_size),
            history: [0; HISTORY],
            next: 0,
            raw_buf: vec![0; 2 * batch_size],
        })
    }

    fn push(&mut self, sample: i32) {
        self.history[self.next & HISTORY_MASK] = sample;
        self.next = self.next.wrapping_add(1);
    }

    /// Most recent 8 samples, oldest first.
    fn ordered_history(&self) -> [i32; HISTORY] {
        let mut out = [0i32; HISTORY];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.history[(self.next + k) & HISTORY_MASK];
        }
        out
    }

    /// Read the next batch of power samples, returning the count produced
    /// (less than the configured batch size only at EOF). Each power sample
    /// consumes two raw samples.
    pub fn read_batch(&mut self, out: &mut [i64]) -> Result<usize> {
        let raw_n = self.decoder.read_batch(&mut self.raw_buf)?;
        let pairs = raw_n / 2;
        for i in 0..pairs {
            self.push(self.raw_buf[2 * i]);
            self.push(self.raw_buf[2 * i + 1]);
            let h = self.ordered_history();
            let in_phase = h[6] - h[4] + h[2] - h[0];
            let quadrature = h[7] - h[5] + h[3] - h[1];
            out[i] = (in_phase as i64) * (in_phase as i64) + (quadrature as i64) * (quadrature as i64);
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_pair(sample: u16) -> [u8; 2] {
        [(sample & 0xFF) as u8, (sample >> 8) as u8]
    }

    #[test]
    fn rejects_batch_size_not_divisible_by_eight() {
        let bytes: [u8; 0] = [];
        assert!(PowerComputer::new(&bytes[..], 5).is_err());
    }

    #[test]
    fn produces_power_from_history_window() {
        // 16 raw samples (8 I/Q pairs) all equal to the bias value decode to
        // all-zero signed samples, so every component of I and Q is zero.
        let mut bytes = Vec::new();
        for _ in 0..16 {
            bytes.extend_from_slice(&le_pair(2048));
        }
        let mut computer = PowerComputer::new(&bytes[..], 8).unwrap();
        let mut out = [0i64; 8];
        let n = computer.read_batch(&mut out).unwrap();
        assert_eq!(n, 8);
        assert!(out.iter().all(|&p| p == 0));
    }
}
