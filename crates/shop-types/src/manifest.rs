//! The shop's singleton `Manifest` and its subordinate records (spec §3.3).

use std::collections::BTreeMap;

use crate::primitives::{ChainAddress, Uint256};

/// The shop-wide configuration singleton: currencies, payees, and shipping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Arbitrary-precision identifier for the shop itself.
    pub shop_id: Uint256,
    /// Named payout recipients, keyed by an operator-chosen label.
    pub payees: BTreeMap<String, Payee>,
    /// Currencies this shop will accept payment in.
    pub accepted_currencies: Vec<ChainAddress>,
    /// The currency listing prices are denominated in.
    pub pricing_currency: ChainAddress,
    /// Named shipping regions, keyed by an operator-chosen label.
    pub shipping_regions: BTreeMap<String, ShippingRegion>,
}

/// A named payout recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payee {
    /// The chain-qualified address funds are sent to.
    pub address: ChainAddress,
    /// Whether the address should be treated as a contract (forwarding call)
    /// rather than a plain EOA transfer.
    pub call_as_contract: bool,
}

/// A shippable region and the price modifiers that apply within it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingRegion {
    /// ISO-ish country filter; empty matches any.
    pub country: String,
    /// Postcode filter; empty matches any.
    pub postcode: String,
    /// City filter; empty matches any.
    pub city: String,
    /// Named price modifiers applicable within this region.
    pub price_modifiers: BTreeMap<String, PriceModifier>,
}

/// A price adjustment, expressed as exactly one of a percentage or an
/// absolute amount (spec §3.3 invariant 4). Modeled as an enum so the
/// "exactly one of" invariant is enforced by construction rather than by a
/// post-hoc check over two `Option` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceModifier {
    /// A percentage adjustment (e.g. `500` meaning 5.00%, units defined by
    /// the caller).
    Percent(Uint256),
    /// An absolute adjustment, optionally a deduction rather than an
    /// addition.
    Absolute {
        /// Magnitude of the adjustment.
        amount: Uint256,
        /// `true` to add the amount, `false` to subtract it.
        plus: bool,
    },
}
