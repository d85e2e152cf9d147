use crate::Generator;
use burrow_core::shortcode::{ALPHABET, CODE_LENGTH};
use burrow_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// Total number of distinct codes, 62^6.
const CODE_SPACE: u64 = 56_800_235_584;

/// A deterministic generator encoding a counter in base62.
///
/// Produces "000000", "000001", ... "00000z", "000010", and wraps around after
/// 62^6 codes. Useful for tests and reproducible local runs; production
/// deployments should use [`RandomGenerator`](crate::RandomGenerator).
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
        }
    }
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator starting from a specific counter value.
    ///
    /// Useful for resuming from a known state or splitting the code space
    /// between nodes (e.g., node 1 starts at 0, node 2 at 1_000_000).
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_base62(mut value: u64) -> String {
    value %= CODE_SPACE;
    let mut buf = [ALPHABET[0]; CODE_LENGTH];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(value % 62) as usize];
        value /= 62;
    }
    buf.iter().map(|&b| char::from(b)).collect()
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(encode_base62(count))
    }
}
