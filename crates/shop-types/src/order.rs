//! Order entity and subordinate records (spec §3.3).

use time::OffsetDateTime;

use crate::enums::OrderState;
use crate::primitives::{ChainAddress, ContentId, Hash, ObjectId, Signature, Uint256};

/// A customer order against the shop's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Catalog-unique identifier.
    pub id: ObjectId,
    /// Current lifecycle state. `spec.md` §9 leaves transitions
    /// unvalidated: the engine accepts any `replace`.
    pub state: OrderState,
    /// Line items.
    pub items: Vec<OrderedItem>,
    /// Billing address, once supplied.
    pub invoice_address: Option<AddressDetails>,
    /// Shipping address, once supplied.
    pub shipping_address: Option<AddressDetails>,
    /// Timestamp the order was canceled, if it was.
    pub canceled_at: Option<OffsetDateTime>,
    /// The payee the customer chose to pay, once chosen.
    pub chosen_payee: Option<ChainAddress>,
    /// The currency the customer chose to pay in, once chosen.
    pub chosen_currency: Option<ChainAddress>,
    /// Finalized payment parameters, once computed.
    pub payment_details: Option<PaymentDetails>,
    /// On-chain settlement details, once observed.
    pub tx_details: Option<OrderPaid>,
}

/// One line item within an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedItem {
    /// The listing this line item is for.
    pub listing_id: ObjectId,
    /// The chosen variation ids, if the listing has option groups.
    pub variation_ids: Option<Vec<String>>,
    /// Number of units ordered.
    pub quantity: u32,
}

/// A postal/contact address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDetails {
    /// Recipient name.
    pub name: String,
    /// Primary address line.
    pub address1: String,
    /// Secondary address line.
    pub address2: Option<String>,
    /// City.
    pub city: String,
    /// Postal code, where applicable.
    pub postal_code: Option<String>,
    /// Country.
    pub country: String,
    /// Contact email.
    pub email_address: String,
    /// Contact phone number.
    pub phone_number: Option<String>,
}

/// Finalized payment parameters for an [`Order`], signed by the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Unique payment identifier.
    pub payment_id: Hash,
    /// Total amount due, in the order's chosen currency's smallest unit.
    pub total: Uint256,
    /// Content ids of the listings priced into this total, at the time of
    /// computation.
    pub listing_hashes: Vec<ContentId>,
    /// Seconds this payment request remains valid for.
    pub ttl: u64,
    /// The shop's signature over the payment request.
    pub shop_signature: Signature,
}

/// On-chain settlement evidence for a paid [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPaid {
    /// The settling transaction's hash, once indexed.
    pub tx_hash: Option<Hash>,
    /// The hash of the block the settling transaction landed in.
    pub block_hash: Hash,
}
