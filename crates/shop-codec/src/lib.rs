//! Canonical, deterministic CBOR codec for the shop object graph (spec §4.2).
//!
//! Canonicalization rules (enforced throughout this crate rather than left to
//! a general-purpose CBOR writer's default behavior):
//!
//! 1. Map keys are sorted by length, then lexicographically.
//! 2. Integers and big integers use their shortest form.
//! 3. Timestamps are RFC3339 strings.
//! 4. Fixed-size byte fields are rejected if decoded at the wrong length.
//! 5. `ListingViewState` is wrapped in application tag `1000`.
//! 6. Optional fields are omitted entirely when absent, and every object is
//!    decoded into a generic map first so required-field validation happens
//!    before the strongly-typed shape is built.

pub mod account;
pub mod listing;
pub mod manifest;
pub mod order;
pub mod schema;
pub mod tag;
pub mod typed;
pub mod wire;

pub use schema::{canonical_map, from_bytes_canonical, to_bytes_canonical, CanonicalCodec, DecodedMap};
pub use typed::{HamtKey, TypedHamt};
