//! Sample decoder — raw IQ bytes to signed samples.
//!
//! Input is interleaved unsigned 12-bit samples packed little-endian into
//! byte pairs (the native output of many 1090 MHz front ends). Each pair
//! decodes to one signed sample by subtracting the DC bias of a 12-bit
//! unsigned range.

use std::io::Read;

use crate::types::{AdsbError, Result};

/// DC bias subtracted from each unsigned 12-bit sample to center it on zero.
const BIAS: i32 = 2048;

/// Decodes a byte stream into fixed-size batches of signed samples.
pub struct SampleDecoder<R> {
    reader: R,
    batch_size: usize,
}

impl<R: Read> SampleDecoder<R> {
    /// `batch_size` is the number of samples produced per [`Self::read_batch`]
    /// call; each sample consumes two input bytes.
    pub fn new(reader: R, batch_size: usize) -> Self {
        SampleDecoder { reader, batch_size }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fill `out` with up to `batch_size` decoded samples, returning the
    /// number actually produced (less than `batch_size` only at EOF).
    ///
    /// Fails with [`AdsbError::InvalidArgument`] if `out.len() != batch_size`.
    pub fn read_batch(&mut self, out: &mut [i32]) -> Result<usize> {
        if out.len() != self.batch_size {
            return Err(AdsbError::InvalidArgument(format!(
                "output buffer length {} does not match batch size {}",
                out.len(),
                self.batch_size
            )));
        }

        let mut pair = [0u8; 2];
        let mut produced = 0;
        for slot in out.iter_mut() {
            match read_exact_or_eof(&mut self.reader, &mut pair)? {
                true => break,
                false => {
                    let unsigned = (pair[1] as i32) << 8 | pair[0] as i32;
                    *slot = unsigned - BIAS;
                    produced += 1;
                }
            }
        }
        Ok(produced)
    }
}

/// Like `read_exact`, but treats a zero-byte read at the very start of the
/// call as a clean EOF (returns `Ok(true)`) instead of an error. A partial
/// read mid-pair is still a hard I/O error.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(true);
            }
            return Err(AdsbError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "truncated sample pair",
            )));
        }
        filled += n;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_biased_little_endian_pairs() {
        // Unsigned 0 -> -2048, unsigned 4095 -> 2047, unsigned 2048 -> 0.
        let bytes: [u8; 6] = [0x00, 0x00, 0xFF, 0x0F, 0x00, 0x08];
        let mut decoder = SampleDecoder::new(&bytes[..], 3);
        let mut out = [0i32; 3];
        let n = decoder.read_batch(&mut out).unwrap();
        assert_eq!(n, 3);
        assert_eq!(out, [-2048, 2047, 0]);
    }

    #[test]
    fn partial_batch_at_eof() {
        let bytes: [u8; 2] = [0x00, 0x08];
        let mut decoder = SampleDecoder::new(&bytes[..], 3);
        let mut out = [0i32; 3];
        let n = decoder.read_batch(&mut out).unwrap();
        assert_eq!(n, 1);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn rejects_mismatched_buffer_length() {
        let bytes: [u8; 4] = [0, 0, 0, 0];
        let mut decoder = SampleDecoder::new(&bytes[..], 3);
        let mut out = [0i32; 2];
        assert!(decoder.read_batch(&mut out).is_err());
    }
}
