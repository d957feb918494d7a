//! Seed expansion into deterministic random streams.
//!
//! A seed string is hashed with SHA-256 into a 32-byte key, and each game
//! derives its own stream by HMAC-SHA256 over a domain tag. Streams are
//! `ChaCha20Rng` instances: their output is a pure function of the key and
//! the word position, so every platform observes the same sequence.

use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Longest seed accepted when no configuration overrides it.
pub const DEFAULT_MAX_SEED_LEN: usize = 256;

/// Reasons a seed cannot be expanded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("seed must not be empty")]
    Empty,
    #[error("seed length {len} exceeds maximum {max}")]
    TooLong { len: usize, max: usize },
}

/// Check the shape constraints on a seed.
///
/// # Errors
///
/// Returns [`SeedError`] when the seed is empty or longer than `max_len` bytes.
pub fn validate_seed(seed: &str, max_len: usize) -> Result<(), SeedError> {
    if seed.is_empty() {
        return Err(SeedError::Empty);
    }
    if seed.len() > max_len {
        return Err(SeedError::TooLong {
            len: seed.len(),
            max: max_len,
        });
    }
    Ok(())
}

/// Expand a seed into its root stream using the default length limit.
///
/// # Errors
///
/// Returns [`SeedError`] when the seed is empty or too long.
pub fn expand(seed: &str) -> Result<RandomStream, SeedError> {
    expand_with_limit(seed, DEFAULT_MAX_SEED_LEN)
}

/// Expand a seed into its root stream using an explicit length limit.
///
/// # Errors
///
/// Returns [`SeedError`] when the seed is empty or longer than `max_len`.
pub fn expand_with_limit(seed: &str, max_len: usize) -> Result<RandomStream, SeedError> {
    validate_seed(seed, max_len)?;
    let digest = Sha256::digest(seed.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    Ok(RandomStream::from_key(key))
}

/// Counter-based pseudo-random stream with draw accounting.
#[derive(Debug, Clone)]
pub struct RandomStream {
    key: [u8; 32],
    rng: ChaCha20Rng,
    draws: u64,
}

impl RandomStream {
    /// Build a stream positioned at word zero of the given key.
    #[must_use]
    pub fn from_key(key: [u8; 32]) -> Self {
        Self {
            key,
            rng: ChaCha20Rng::from_seed(key),
            draws: 0,
        }
    }

    /// Derive an independent child stream for a domain tag.
    ///
    /// The child depends only on this stream's key, never on how many values
    /// have been drawn from it.
    #[must_use]
    pub fn derive(&self, domain_tag: &[u8]) -> Self {
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&self.key) else {
            // HMAC accepts keys of any length.
            return Self::from_key(self.key);
        };
        mac.update(domain_tag);
        let digest = mac.finalize().into_bytes();
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self::from_key(key)
    }

    /// Next raw 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    /// Uniform value in `[0, bound)` via multiply-shift; `0` when `bound` is zero.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let wide = u64::from(self.next_u32()) * u64::from(bound);
        // The high word is always below `bound`.
        u32::try_from(wide >> 32).unwrap_or(0)
    }

    /// Uniform integer in the inclusive range `[lo, hi]`.
    ///
    /// Spans wider than `u32::MAX` are clamped; an inverted range yields `lo`
    /// without consuming a draw.
    pub fn next_in_range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        let span = u32::try_from(hi - lo + 1).unwrap_or(u32::MAX);
        lo + i64::from(self.next_below(span))
    }

    /// Bernoulli draw succeeding with probability `per_mille / 1000`.
    pub fn chance(&mut self, per_mille: u32) -> bool {
        self.next_below(1000) < per_mille
    }

    /// Uniform float in `[lo, hi)` built from a single 32-bit draw.
    ///
    /// Only IEEE basic operations are involved, so results are reproducible,
    /// but generators and simulators stay on the integer helpers.
    pub fn next_float_in_range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = f64::from(self.next_u32()) / 4_294_967_296.0;
        lo + (hi - lo) * unit
    }

    /// Word position of the underlying ChaCha block counter.
    #[must_use]
    pub fn counter(&self) -> u128 {
        self.rng.get_word_pos()
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}
