//! Primitive semantic types shared across the shop object graph (spec §3.1).

use crate::error::CodecError;
use serde::{Deserialize, Serialize};

/// A 64-bit unsigned identifier for listings, orders, and inventory rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Returns the big-endian byte representation used when building a
    /// [`crate::inventory::CombinedKey`].
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl From<u64> for ObjectId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arbitrary-precision non-negative integer. Canonicalized to its shortest
/// big-integer form on encode (handled in `shop-codec`, not here).
pub type Uint256 = alloy_primitives::U256;

/// A 32-byte content or block hash.
pub type Hash = alloy_primitives::B256;

/// A 20-byte Ethereum-style address.
pub type EthereumAddress = alloy_primitives::Address;

/// A content-addressed identifier referencing an encoded listing (used by
/// [`crate::order::PaymentDetails::listing_hashes`]).
pub type ContentId = alloy_primitives::B256;

macro_rules! define_fixed_bytes {
    ($name:ident, $len:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Fixed size of this byte type, in bytes.
            pub const LEN: usize = $len;

            /// Borrows the inner bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(self.0))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = CodecError;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                if bytes.len() != $len {
                    return Err(CodecError::BytesTooShort {
                        want: $len,
                        got: bytes.len(),
                    });
                }
                let mut arr = [0u8; $len];
                arr.copy_from_slice(bytes);
                Ok(Self(arr))
            }
        }
    };
}

define_fixed_bytes!(Signature, 64, "A 64-byte detached signature.");
define_fixed_bytes!(PublicKey, 32, "A 32-byte public key.");

/// A chain-qualified address: an EVM chain id paired with a 20-byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainAddress {
    /// The EIP-155 chain id the address is valid on.
    pub chain_id: u64,
    /// The 20-byte address itself.
    pub address: EthereumAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bytes_reject_wrong_length() {
        let short = [0u8; 10];
        let err = PublicKey::try_from(&short[..]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::BytesTooShort { want: 32, got: 10 }
        ));
    }

    #[test]
    fn fixed_bytes_accept_exact_length() {
        let bytes = [7u8; 64];
        let sig = Signature::try_from(&bytes[..]).unwrap();
        assert_eq!(sig.as_bytes(), &bytes);
    }
}
