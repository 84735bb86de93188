//! The `Inventory` collection's key construction (spec §3.3, §3.5 glossary).
//!
//! Inventory stores quantities keyed by a pre-computed byte sequence rather
//! than by a pointer back into a listing's variations, which is how the
//! source's cyclic inventory->listing reference is broken (spec §9).

use crate::primitives::ObjectId;

/// A byte concatenation of a listing's [`ObjectId`] and a variation chain,
/// used as the HAMT key in the `Inventory` collection.
///
/// Wire form: `id (big-endian, 8 bytes) ‖ 0x00 ‖ variation tokens joined with
/// 0x00`. A listing with no variation chain still carries the single
/// separator byte, so `(9000, [])` and `(9000, ["r"])` never collide as
/// prefixes of one another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinedKey {
    /// The listing this inventory row tracks stock for.
    pub listing_id: ObjectId,
    /// The variation ids selecting a specific stock cell, outermost first.
    pub variation_ids: Vec<String>,
}

impl CombinedKey {
    /// Builds a combined key for a bare listing (no variation chain).
    pub fn listing(listing_id: ObjectId) -> Self {
        Self {
            listing_id,
            variation_ids: Vec::new(),
        }
    }

    /// Builds a combined key for a specific variation chain.
    pub fn variation(listing_id: ObjectId, variation_ids: Vec<String>) -> Self {
        Self {
            listing_id,
            variation_ids,
        }
    }

    /// Renders the canonical byte encoding used as the HAMT key.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(9 + self.variation_ids.iter().map(|t| t.len() + 1).sum::<usize>());
        out.extend_from_slice(&self.listing_id.to_be_bytes());
        out.push(0u8);
        for (i, token) in self.variation_ids.iter().enumerate() {
            if i > 0 {
                out.push(0u8);
            }
            out.extend_from_slice(token.as_bytes());
        }
        out
    }
}
