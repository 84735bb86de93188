//! Error taxonomy for the trie crate (spec §4.1 "Failure semantics", §7).

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
///
/// `shop-hamt` is intentionally dependency-light (no `shop-types`), so it
/// keeps its own copy of this tiny trait rather than pull in the types crate
/// for one trait; `shop-types::error::ErrorCode` has the identical shape.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Failures surfaced by trie (de)serialization and mutation.
#[derive(Error, Debug)]
pub enum TrieError {
    /// A decoded node violated `popcount(bitmap) == len(entries)`.
    #[error("corrupt trie: invalid slot index")]
    InvalidSlotIndex,
    /// The CBOR payload did not have the shape a trie node requires.
    #[error("corrupt trie: {0}")]
    CorruptTrie(String),
    /// `insert` was called with a zero-length key (spec §3.4 invariant 2:
    /// "HAMT rejects zero-length keys").
    #[error("hamt key must not be empty")]
    EmptyKey,
}

impl ErrorCode for TrieError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidSlotIndex => "TRIE_INVALID_SLOT_INDEX",
            Self::CorruptTrie(_) => "TRIE_CORRUPT",
            Self::EmptyKey => "TRIE_EMPTY_KEY",
        }
    }
}
