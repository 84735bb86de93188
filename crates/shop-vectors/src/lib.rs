//! Signer collaborator and golden-vector schema for the shop patch engine
//! (spec §4.4, §6.2).
//!
//! This crate is deliberately thin: the spec treats key generation and
//! signature verification as an opaque collaborator (spec §1 Non-goals), so
//! [`signer`] exists only to produce self-consistent `(address, signature)`
//! pairs for test vectors, not to be a production custody solution. The
//! actual vector generators live under `tests/`, following the teacher's
//! convention of keeping fixture-producing code out of `src/` when nothing
//! else in the workspace depends on it.

pub mod config;
pub mod schema;
pub mod signer;

pub use schema::{Snap, VectorsError, VectorsOkay};
pub use signer::Signer;
