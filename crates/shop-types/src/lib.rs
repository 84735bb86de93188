//! Core data structures and error types for the shop state engine.
//!
//! This crate stays dependency-light by design, mirroring the teacher
//! repo's convention of a base `types` crate that every other crate depends
//! on but which depends on almost nothing itself.

pub mod account;
pub mod enums;
pub mod error;
pub mod inventory;
pub mod listing;
pub mod manifest;
pub mod order;
pub mod primitives;
pub mod tag;

pub use account::Account;
pub use enums::{ObjectType, OpString, OrderState, ListingViewState};
pub use error::{CodecError, ErrorCode};
pub use inventory::CombinedKey;
pub use listing::{Listing, ListingMetadata, ListingOption, ListingStockStatus, ListingVariation, StockDetail};
pub use manifest::{Manifest, Payee, PriceModifier, ShippingRegion};
pub use order::{AddressDetails, Order, OrderPaid, OrderedItem, PaymentDetails};
pub use primitives::{ChainAddress, ContentId, EthereumAddress, Hash, ObjectId, PublicKey, Signature, Uint256};
pub use tag::Tag;
