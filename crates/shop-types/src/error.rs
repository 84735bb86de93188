//! Shared error taxonomy for the codec layer.
//!
//! Other crates in the workspace (`shop-hamt`, `shop-patch`) define their own
//! focused error enums for their own concern, following the same pattern:
//! one `thiserror::Error` enum per kind of failure, each implementing
//! [`ErrorCode`] so callers get a stable, machine-readable string without
//! parsing `Display` output.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised while encoding or decoding canonical CBOR.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A fixed-size byte field did not decode to its expected length.
    #[error("bytes too short: want {want}, got {got}")]
    BytesTooShort {
        /// Expected length in bytes.
        want: usize,
        /// Observed length in bytes.
        got: usize,
    },
    /// A required field was absent from the decoded map.
    #[error("missing required field {field}")]
    RequiredFieldMissing {
        /// The field's canonical name.
        field: &'static str,
    },
    /// An enum discriminant decoded outside its valid range.
    #[error("invalid enum value: {value}")]
    InvalidEnum {
        /// The out-of-range integer that was decoded.
        value: i64,
    },
    /// A "exactly one of" invariant was violated (e.g. `PriceModifier`).
    #[error("invalid one-of: {detail}")]
    InvalidOneOf {
        /// Human-readable description of which invariant failed.
        detail: String,
    },
    /// A lower-level decode failure (malformed CBOR, wrong major type, etc).
    #[error("decode error: {inner}")]
    Decode {
        /// The underlying decode failure.
        inner: String,
    },
}

impl ErrorCode for CodecError {
    fn code(&self) -> &'static str {
        match self {
            Self::BytesTooShort { .. } => "CODEC_BYTES_TOO_SHORT",
            Self::RequiredFieldMissing { .. } => "CODEC_REQUIRED_FIELD_MISSING",
            Self::InvalidEnum { .. } => "CODEC_INVALID_ENUM",
            Self::InvalidOneOf { .. } => "CODEC_INVALID_ONE_OF",
            Self::Decode { .. } => "CODEC_DECODE_ERROR",
        }
    }
}
