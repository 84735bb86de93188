//! Pluggable key-routing hash strategy (spec §9 REDESIGN FLAGS: "HAMT generic
//! over value type with a pluggable hash function").
//!
//! This is the 64-bit, non-cryptographic hash used purely to route a key to
//! a slot at each trie level (spec §4.1: "a 64-bit non-cryptographic hash
//! family (xxhash-compatible) parametrized by a seed"). It is unrelated to
//! the Keccak-256 content digest computed by [`crate::Hamt::hash`].

use twox_hash::XxHash64;
use std::hash::Hasher as _;

/// Strategy for routing a key to a slot at a given trie level.
pub trait HamtHasher {
    /// Hashes `key` under `seed`, returning a 64-bit value whose low bits are
    /// consumed 5 at a time while descending the trie.
    fn hash64(&self, key: &[u8], seed: u64) -> u64;
}

/// The default production hasher: seeded xxHash64.
#[derive(Debug, Clone, Copy, Default)]
pub struct XxHasher;

impl HamtHasher for XxHasher {
    fn hash64(&self, key: &[u8], seed: u64) -> u64 {
        let mut hasher = XxHash64::with_seed(seed);
        hasher.write(key);
        hasher.finish()
    }
}

/// A test-only hasher that returns the same value for every key in a chosen
/// set, used to exercise the forced-collision fallback path (spec §8
/// property 5: "Collision safety").
#[derive(Debug, Clone)]
pub struct ConstantHasher {
    /// Keys that should collide under this hasher.
    pub forced_collisions: Vec<Vec<u8>>,
    /// The constant value returned for keys in `forced_collisions`.
    pub constant: u64,
}

impl HamtHasher for ConstantHasher {
    fn hash64(&self, key: &[u8], seed: u64) -> u64 {
        if self.forced_collisions.iter().any(|k| k == key) {
            // Still vary by seed so the reseed fallback in the trie can
            // eventually separate colliding keys rather than immediately
            // requiring the bucket fallback.
            self.constant ^ seed
        } else {
            let mut hasher = XxHash64::with_seed(seed);
            hasher.write(key);
            hasher.finish()
        }
    }
}

/// A test-only hasher that returns a truly seed-invariant constant for a
/// chosen key set, forcing the trie's terminal bucket fallback (spec §4.1:
/// "if even that exhausts, fall back to a linear bucket at the terminal
/// node") rather than the reseed path that [`ConstantHasher`] exercises.
#[derive(Debug, Clone)]
pub struct AlwaysCollideHasher {
    /// Keys that collide under every seed.
    pub forced_collisions: Vec<Vec<u8>>,
    /// The constant value returned for keys in `forced_collisions`, under
    /// every seed.
    pub constant: u64,
}

impl HamtHasher for AlwaysCollideHasher {
    fn hash64(&self, key: &[u8], seed: u64) -> u64 {
        if self.forced_collisions.iter().any(|k| k == key) {
            self.constant
        } else {
            let mut hasher = XxHash64::with_seed(seed);
            hasher.write(key);
            hasher.finish()
        }
    }
}
