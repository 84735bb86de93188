//! Listing entity and subordinate records (spec §3.3).

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::enums::ListingViewState;
use crate::manifest::PriceModifier;
use crate::primitives::{ObjectId, Uint256};

/// A sellable item in the shop's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Catalog-unique identifier.
    pub id: ObjectId,
    /// Base price before any variation/shipping modifiers.
    pub price: Uint256,
    /// Human-facing copy.
    pub metadata: ListingMetadata,
    /// Whether the listing is visible, published, or soft-deleted.
    pub view_state: ListingViewState,
    /// Named option groups (e.g. "color", "size").
    pub options: BTreeMap<String, ListingOption>,
    /// Per-variation-combination stock state.
    pub stock_statuses: Vec<ListingStockStatus>,
}

/// Human-facing listing or variation copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingMetadata {
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Image URLs, in display order.
    pub images: Vec<String>,
}

/// A named option group, e.g. "size" with variations "s"/"m"/"l".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingOption {
    /// Display title for the option group.
    pub title: String,
    /// Named variations within this option group.
    pub variations: BTreeMap<String, ListingVariation>,
}

/// One concrete variation within an option group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingVariation {
    /// Display copy specific to this variation.
    pub variation_info: ListingMetadata,
    /// An optional price delta relative to the listing's base price.
    pub price_modifier: Option<PriceModifier>,
    /// An optional stock-keeping unit code.
    pub sku: Option<String>,
}

/// Stock state for one combination of variation ids (spec §3.3 invariant 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingStockStatus {
    /// The variation ids this stock entry describes, taken together.
    pub variation_ids: Vec<String>,
    /// Exactly one of a known boolean in-stock state or a restock estimate.
    pub detail: StockDetail,
}

/// The "exactly one of" payload of a [`ListingStockStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockDetail {
    /// A definite in-stock/out-of-stock flag.
    InStock(bool),
    /// An estimated restock timestamp.
    ExpectedInStockBy(OffsetDateTime),
}
