//! Golomb-Rice signature compression
//!
//! Signature coefficients follow a narrow discrete Gaussian, so each one
//! is stored as a sign bit, its 7 low magnitude bits, and the remaining
//! high bits in unary with a 1 terminator. The encoding is canonical:
//! decompression rejects a negative zero, an out-of-range magnitude and
//! any nonzero padding bit, so every valid byte string decodes to exactly
//! one coefficient vector.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use super::params::COEFF_BOUND;
use crate::{Error, Result};

/// Number of magnitude bits stored in binary before the unary part
const LOW_BITS: u32 = 7;

/// MSB-first bit writer over a growing byte buffer
struct BitWriter {
    bytes: Vec<u8>,
    acc: u32,
    acc_len: u32,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            acc: 0,
            acc_len: 0,
        }
    }

    fn push_bits(&mut self, value: u32, count: u32) {
        debug_assert!(count <= 16);
        self.acc = (self.acc << count) | (value & ((1 << count) - 1));
        self.acc_len += count;
        while self.acc_len >= 8 {
            self.acc_len -= 8;
            self.bytes.push((self.acc >> self.acc_len) as u8);
        }
    }

    fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.acc_len as usize
    }

    /// Flush, padding the final partial byte with zero bits
    fn finish(mut self) -> Vec<u8> {
        if self.acc_len > 0 {
            let pad = 8 - self.acc_len;
            self.bytes.push((self.acc << pad) as u8);
        }
        self.bytes
    }
}

/// MSB-first bit reader over a byte slice
struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, pos: 0 }
    }

    fn read_bit(&mut self) -> Option<u32> {
        let byte = *self.bytes.get(self.pos >> 3)?;
        let bit = (byte >> (7 - (self.pos & 7))) & 1;
        self.pos += 1;
        Some(bit as u32)
    }

    fn read_bits(&mut self, count: u32) -> Option<u32> {
        let mut value = 0;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()?;
        }
        Some(value)
    }
}

/// Compress signature coefficients into exactly `payload_len` bytes.
///
/// Fails with [`Error::SignatureTooLarge`] when the encoding does not fit
/// in the fixed payload or a coefficient magnitude exceeds the codec
/// range; the signing loop reacts by drawing a fresh candidate.
pub fn compress(coeffs: &[i16], payload_len: usize) -> Result<Vec<u8>> {
    let capacity = payload_len * 8;
    let mut writer = BitWriter::new();

    for &c in coeffs {
        if c < -COEFF_BOUND || c > COEFF_BOUND {
            return Err(Error::SignatureTooLarge);
        }
        let magnitude = c.unsigned_abs() as u32;

        writer.push_bits((c < 0) as u32, 1);
        writer.push_bits(magnitude, LOW_BITS);
        for _ in 0..(magnitude >> LOW_BITS) {
            writer.push_bits(0, 1);
        }
        writer.push_bits(1, 1);

        if writer.bit_len() > capacity {
            return Err(Error::SignatureTooLarge);
        }
    }

    let mut bytes = writer.finish();
    bytes.resize(payload_len, 0);
    Ok(bytes)
}

/// Decompress `n` signature coefficients from a fixed-size payload.
///
/// Rejects a negative zero, a magnitude above the codec range, a stream
/// that ends before `n` coefficients are read, and any set padding bit.
pub fn decompress(bytes: &[u8], n: usize) -> Result<Vec<i16>> {
    let mut reader = BitReader::new(bytes);
    let mut coeffs = vec![0i16; n];

    for coeff in coeffs.iter_mut() {
        let sign = reader.read_bit().ok_or(Error::InvalidSignature)?;
        let low = reader.read_bits(LOW_BITS).ok_or(Error::InvalidSignature)?;

        let mut high = 0u32;
        loop {
            match reader.read_bit().ok_or(Error::InvalidSignature)? {
                1 => break,
                _ => {
                    high += 1;
                    if (high << LOW_BITS) > COEFF_BOUND as u32 {
                        return Err(Error::InvalidSignature);
                    }
                }
            }
        }

        let magnitude = (high << LOW_BITS) | low;
        if magnitude == 0 && sign == 1 {
            return Err(Error::InvalidSignature);
        }
        *coeff = if sign == 1 {
            -(magnitude as i16)
        } else {
            magnitude as i16
        };
    }

    // All padding bits up to the end of the payload must be zero
    while let Some(bit) = reader.read_bit() {
        if bit != 0 {
            return Err(Error::InvalidSignature);
        }
    }

    Ok(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fndsa::params::FALCON_512;
    use proptest::prelude::*;

    #[test]
    fn test_known_encodings() {
        // +1: sign 0, low 0000001, stop 1
        assert_eq!(compress(&[1], 2).unwrap(), vec![0x01, 0x80]);
        // -1: sign 1, low 0000001, stop 1
        assert_eq!(compress(&[-1], 2).unwrap(), vec![0x81, 0x80]);
        // 128: sign 0, low 0000000, one unary zero, stop 1
        assert_eq!(compress(&[128], 2).unwrap(), vec![0x00, 0x40]);
    }

    #[test]
    fn test_roundtrip_small_vector() {
        let coeffs = [0i16, 1, -1, 127, -128, 300, -2047, 2047];
        let payload = compress(&coeffs, 24).unwrap();
        assert_eq!(payload.len(), 24);
        assert_eq!(decompress(&payload, coeffs.len()).unwrap(), coeffs);
    }

    #[test]
    fn test_out_of_range_coefficient_rejected() {
        assert!(compress(&[2048], 16).is_err());
        assert!(compress(&[-2048], 16).is_err());
    }

    #[test]
    fn test_overflowing_payload_rejected() {
        // 2047 takes 1 + 7 + 15 + 1 = 24 bits
        let coeffs = [2047i16; 8];
        assert!(compress(&coeffs, 8).is_err());
        assert!(compress(&coeffs, 24).is_ok());
    }

    #[test]
    fn test_minus_zero_rejected() {
        // sign 1, low 0000000, stop 1, then zero padding
        let payload = [0x80, 0x80, 0x00];
        assert!(decompress(&payload, 1).is_err());
    }

    #[test]
    fn test_nonzero_padding_rejected() {
        let mut payload = compress(&[5], 4).unwrap();
        assert_eq!(decompress(&payload, 1).unwrap(), vec![5]);
        *payload.last_mut().unwrap() |= 1;
        assert!(decompress(&payload, 1).is_err());
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let payload = compress(&[1, 2, 3], 4).unwrap();
        assert!(decompress(&payload, 4).is_err());
    }

    #[test]
    fn test_unary_run_past_range_rejected() {
        // 16 unary zeros would push the magnitude above 2047
        let payload = [0x00, 0x00, 0x00, 0x80];
        assert!(decompress(&payload, 1).is_err());
    }

    proptest! {
        #[test]
        // uniform +-200 keeps the expected encoding safely inside the
        // fixed payload, like the Gaussian signatures the codec carries
        fn prop_roundtrip_gaussian_like(coeffs in prop::collection::vec(-200i16..=200, 512)) {
            let payload = compress(&coeffs, FALCON_512.sig_payload_len()).unwrap();
            prop_assert_eq!(payload.len(), FALCON_512.sig_payload_len());
            prop_assert_eq!(decompress(&payload, 512).unwrap(), coeffs);
        }
    }
}
