use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{EngineError, Result};

/// Bounded integer draws backed by a cryptographically secure generator.
///
/// Draws are single bytes, rejection-sampled into the requested range, so the
/// range is capped at `0..=255` and carries no modulo bias.
#[derive(Debug, Clone)]
pub struct RandomSource<R = OsRng> {
    rng: R,
}

impl RandomSource<OsRng> {
    /// Source backed by the operating system CSPRNG.
    pub fn new() -> Self {
        RandomSource { rng: OsRng }
    }
}

impl Default for RandomSource<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> RandomSource<R> {
    /// Wrap a caller-supplied CSPRNG (e.g. a seeded `StdRng` for reproducible runs).
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use slide_2048::random::RandomSource;
    /// let mut src = RandomSource::from_rng(StdRng::seed_from_u64(7));
    /// let v = src.next_in_range(1, 8).unwrap();
    /// assert!((1..=8).contains(&v));
    /// ```
    pub fn from_rng(rng: R) -> Self {
        RandomSource { rng }
    }

    /// Uniform draw over `[min, max]` inclusive.
    ///
    /// Fails with `InvalidRange` unless `0 <= min <= max <= 255`. When
    /// `min == max` no byte is drawn.
    pub fn next_in_range(&mut self, min: i32, max: i32) -> Result<u8> {
        if min < 0 || max > 255 || min > max {
            return Err(EngineError::InvalidRange { min, max });
        }
        let (lo, hi) = (min as u8, max as u8);
        if lo == hi {
            return Ok(lo);
        }
        let mut byte = [0u8; 1];
        loop {
            self.rng.fill_bytes(&mut byte);
            if (lo..=hi).contains(&byte[0]) {
                return Ok(byte[0]);
            }
        }
    }
}
