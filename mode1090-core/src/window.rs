//! Power window — a sliding, double-buffered view over the power stream.
//!
//! The demodulator inspects up to 1200 power samples at a time while the
//! underlying stream arrives in large batches. Rather than copy on every
//! advance, two `B`-sized buffers are kept: `cur` backs the active window,
//! `next` is filled ahead of time and swapped in once the window walks off
//! the end of `cur`.

use std::io::Read;

use crate::power::PowerComputer;
use crate::types::{AdsbError, Result};

/// Batch size backing each of the two buffers.
pub const B: usize = 65536;

/// A fixed-width window sliding over an unbounded power stream.
pub struct PowerWindow<R> {
    computer: PowerComputer<R>,
    cur: Vec<i64>,
    next: Vec<i64>,
    window_size: usize,
    position: usize,
    total_read: usize,
}

impl<R: Read> PowerWindow<R> {
    /// `window_size` must be nonzero and no larger than [`B`].
    pub fn new(reader: R, window_size: usize) -> Result<Self> {
        if window_size == 0 || window_size > B {
            return Err(AdsbError::InvalidArgument(format!(
                "window size {} must be in 1..={}",
                window_size, B
            )));
        }
        let mut computer = PowerComputer::new(reader, B)?;
        let mut cur = vec![0i64; B];
        let total_read = computer.read_batch(&mut cur)?;
        Ok(PowerWindow {
            computer,
            cur,
            next: vec![0i64; B],
            window_size,
            position: 0,
            total_read,
        })
    }

    pub fn size(&self) -> usize {
        self.window_size
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// True only when the window is entirely backed by real stream data.
    pub fn is_full(&self) -> bool {
        self.position + self.window_size <= self.total_read
    }

    /// Power sample at `position + i`, for `0 <= i < size()`.
    pub fn get(&self, i: usize) -> i64 {
        let idx = self.position + i;
        if idx / B == self.position / B {
            self.cur[idx % B]
        } else {
            self.next[idx % B]
        }
    }

    /// Advance the window by one sample, pulling in and swapping buffers at
    /// the `B`-aligned boundaries.
    pub fn advance(&mut self) -> Result<()> {
        self.position += 1;
        if (self.position % B) + self.window_size - 1 == B {
            let n = self.computer.read_batch(&mut self.next)?;
            self.total_read += n;
        }
        if self.position % B == 0 {
            std::mem::swap(&mut self.cur, &mut self.next);
        }
        Ok(())
    }

    pub fn advance_by(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.advance()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_window_larger_than_batch() {
        let bytes: [u8; 0] = [];
        assert!(PowerWindow::new(&bytes[..], B + 1).is_err());
    }

    #[test]
    fn is_full_false_past_stream_end() {
        // Two power samples worth of zero IQ data: far short of a full window.
        let bytes = vec![0u8; 64];
        let window = PowerWindow::new(&bytes[..], 16).unwrap();
        assert!(!window.is_full());
    }

    #[test]
    fn advance_tracks_position() {
        let bytes = vec![0u8; 64];
        let mut window = PowerWindow::new(&bytes[..], 4).unwrap();
        window.advance_by(3).unwrap();
        assert_eq!(window.position(), 3);
    }
}
