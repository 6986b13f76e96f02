//! Randomness capability.

use rand::RngCore;
use rand::rngs::OsRng;

/// Source of cryptographically secure random bytes.
///
/// Verifiers and DPoP `jti` values draw from this, so tests can substitute a
/// deterministic source.
pub trait RandomSource: Send + Sync {
    /// Fills `dest` with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]);

    /// Returns one random 32-bit value.
    fn next_u32(&self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_be_bytes(buf)
    }
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}
