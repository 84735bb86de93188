//! Tag entity (spec §3.3): a named grouping of listings.

use crate::primitives::ObjectId;

/// A named collection of listing ids, used for catalog grouping/filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Display name. `shop-patch` only permits `replace` on this field.
    pub name: String,
    /// Member listing ids, in insertion order.
    pub listing_ids: Vec<ObjectId>,
}
