//! Seed derivation
//!
//! A user seed is never used directly: it is hashed with SHA-512 so nearby
//! seeds give unrelated streams, and a second seed for the emulator side is
//! derived from the next integer.

use rand::SeedableRng;
use rand_pcg::Pcg64;
use sha2::{Digest, Sha512};

/// Secondary seeds are reduced into `[0, 2^31)`
const SECONDARY_MODULUS: u64 = 1 << 31;

/// Seeds returned by `RetroEnv::seed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPair {
    /// The seed as given (or drawn from OS entropy)
    pub primary: u64,
    /// Hash of `primary + 1`, reduced below `2^31`
    pub secondary: u64,
}

/// First 8 bytes (little-endian) of SHA-512 over the decimal digits of `value`
pub fn hash_seed(value: u128) -> u64 {
    let digest = Sha512::digest(value.to_string().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Fresh seed from OS entropy
pub fn create_seed() -> u64 {
    rand::random()
}

/// Resolve a seed pair and the RNG stream seeded from the hashed primary
pub fn derive(seed: Option<u64>) -> (SeedPair, Pcg64) {
    let primary = seed.unwrap_or_else(create_seed);
    let rng = Pcg64::seed_from_u64(hash_seed(primary as u128));
    let secondary = hash_seed(primary as u128 + 1) % SECONDARY_MODULUS;
    (SeedPair { primary, secondary }, rng)
}
