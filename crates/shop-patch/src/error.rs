//! Error taxonomy for the patch engine (spec §7).

use shop_hamt::ErrorCode as _;
use shop_hamt::TrieError;
use shop_types::error::CodecError;
use thiserror::Error;

pub use shop_types::error::ErrorCode;

/// Errors raised while applying a [`crate::envelope::Patch`] to a
/// [`shop_core::Shop`].
#[derive(Error, Debug)]
pub enum PatchError {
    /// The wrong discriminator was present for the declared object type, or
    /// the path was otherwise malformed.
    #[error("invalid path: {reason}")]
    InvalidPath {
        /// What about the path was invalid.
        reason: String,
    },
    /// The op is not valid at the given location (e.g. `increment` on a
    /// non-whitelisted scalar).
    #[error("unsupported op: {op} at {location}")]
    UnsupportedOp {
        /// The attempted op, as its wire string.
        op: String,
        /// A human-readable description of where it was attempted.
        location: String,
    },
    /// The path named a field this object type does not have.
    #[error("unsupported field: {field}")]
    UnsupportedField {
        /// The unrecognized field token.
        field: String,
    },
    /// An array index was out of `[0, len)` (and not the `"-"` append
    /// sentinel where that's accepted).
    #[error("index out of bounds: {idx}")]
    IndexOutOfBounds {
        /// The offending index.
        idx: usize,
    },
    /// An array index token did not parse as a decimal integer or `"-"`.
    #[error("index parse error: {token}")]
    IndexParse {
        /// The token that failed to parse.
        token: String,
    },
    /// A map lookup (`replace`/`remove`) found no entry for the given key.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// The kind of thing being looked up (e.g. `payee`, `listing`).
        kind: &'static str,
        /// The missing key.
        key: String,
    },
    /// An `add` targeted a key that already exists.
    #[error("{kind} already exists: {key}")]
    Duplicate {
        /// The kind of thing being added (e.g. `payee`, `tag`).
        kind: &'static str,
        /// The duplicated key.
        key: String,
    },
    /// Post-patch structural validation failed; the patch was not committed.
    #[error("validation failed: {detail}")]
    ValidationFailed {
        /// What failed validation.
        detail: String,
    },
    /// The patch's `value` payload failed to decode into the expected shape.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A HAMT invariant was violated while publishing the new collection
    /// root.
    #[error(transparent)]
    Trie(#[from] TrieError),
}

impl ErrorCode for PatchError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "PATCH_INVALID_PATH",
            Self::UnsupportedOp { .. } => "PATCH_UNSUPPORTED_OP",
            Self::UnsupportedField { .. } => "PATCH_UNSUPPORTED_FIELD",
            Self::IndexOutOfBounds { .. } => "PATCH_INDEX_OUT_OF_BOUNDS",
            Self::IndexParse { .. } => "PATCH_INDEX_PARSE",
            Self::NotFound { .. } => "PATCH_NOT_FOUND",
            Self::Duplicate { .. } => "PATCH_DUPLICATE",
            Self::ValidationFailed { .. } => "PATCH_VALIDATION_FAILED",
            Self::Codec(inner) => inner.code(),
            Self::Trie(inner) => inner.code(),
        }
    }
}
