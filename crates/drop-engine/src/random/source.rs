//! Unbiased random integers and strings drawn from an entropy source.
//!
//! Every draw uses rejection sampling: raw bytes that would make
//! `value % range` favour the low end of the range are discarded and redrawn.

use rand::rngs::OsRng;
use rand::RngCore;

/// Output alphabet of [`RandomSource::random_alphanumeric`].
pub const ALPHANUMERIC: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of 62 that fits in a byte: 256 - (256 % 62).
const ALPHANUMERIC_MAX_VALID: u8 = 248;

/// Errors raised while setting up a random source.
#[derive(Debug, thiserror::Error)]
pub enum RandomError {
    /// The OS / browser entropy source could not produce bytes.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}

/// Uniform random source over any `RngCore` entropy stream.
///
/// Production code uses [`RandomSource::from_os`]; tests seed a
/// `rand::rngs::StdRng` for reproducible runs.
pub struct RandomSource {
    entropy: Box<dyn RngCore>,
}

impl RandomSource {
    /// Wrap an arbitrary entropy stream.
    pub fn new(entropy: impl RngCore + 'static) -> Self {
        Self {
            entropy: Box::new(entropy),
        }
    }

    /// Use the operating system CSPRNG (`crypto.getRandomValues` on wasm).
    ///
    /// One byte is drawn here so a missing entropy backend is reported
    /// to the caller instead of panicking mid-session.
    pub fn from_os() -> Result<Self, RandomError> {
        let mut byte = [0u8; 1];
        OsRng
            .try_fill_bytes(&mut byte)
            .map_err(|e| RandomError::EntropyUnavailable(e.to_string()))?;
        Ok(Self::new(OsRng))
    }

    /// Uniform integer in `[min, max]`, both inclusive.
    ///
    /// `min == max` returns `min` without consuming entropy.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn random_int(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "random_int: empty range {min}..={max}");

        let range = (max as i128 - min as i128 + 1) as u128;
        if range == 1 {
            return min;
        }

        // Smallest byte count whose value space covers the range.
        let mut byte_count = 1usize;
        while (1u128 << (8 * byte_count)) < range {
            byte_count += 1;
        }
        let space = 1u128 << (8 * byte_count);
        let max_valid = space - space % range;

        let mut buf = [0u8; 8];
        loop {
            let bytes = &mut buf[..byte_count];
            self.entropy.fill_bytes(bytes);
            let value = bytes
                .iter()
                .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
            if value < max_valid {
                return (min as i128 + (value % range) as i128) as i64;
            }
        }
    }

    /// Uniform index in `[0, len)`.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`.
    pub fn random_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "random_index: empty collection");
        self.random_int(0, len as i64 - 1) as usize
    }

    /// String of exactly `length` characters drawn uniformly from
    /// [`ALPHANUMERIC`]. Rejected bytes are dropped, never reused.
    pub fn random_alphanumeric(&mut self, length: usize) -> String {
        let mut out = String::with_capacity(length);
        let mut buf = vec![0u8; length];

        while out.len() < length {
            let batch = &mut buf[..length - out.len()];
            self.entropy.fill_bytes(batch);
            for &byte in batch.iter() {
                if byte < ALPHANUMERIC_MAX_VALID {
                    out.push(ALPHANUMERIC[usize::from(byte % 62)] as char);
                }
            }
        }

        out
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource").finish_non_exhaustive()
    }
}
