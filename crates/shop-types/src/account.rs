//! Account entity (spec §3.3): a shop-scoped identity keyed by its address.

use crate::primitives::PublicKey;

/// A shop-scoped account, keyed externally by its [`crate::primitives::EthereumAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Account {
    /// Public keys authorized to act as this account (multi-device support).
    pub key_cards: Vec<PublicKey>,
    /// Whether this is an ephemeral guest account rather than a registered
    /// one.
    pub guest: bool,
}
