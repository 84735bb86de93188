//! The `Shop` aggregate (spec §3.3): a `Manifest` singleton plus five
//! HAMT-backed collections, with a deterministic whole-shop encoding.

use ciborium::value::Value;
use tiny_keccak::{Hasher as _, Keccak};

use shop_codec::schema::{canonical_map, CanonicalCodec};
use shop_codec::typed::TypedHamt;
use shop_hamt::XxHasher;
use shop_types::error::CodecError;
use shop_types::{Account, ChainAddress, CombinedKey, EthereumAddress, Listing, Manifest, ObjectId, Order, Tag};

/// The shop-wide aggregate state. Field names on the wire are, in this exact
/// order, `Tags, Orders, Accounts, Listings, Manifest, Inventory` — the
/// length-then-lexicographic ordering of those names happens to match this
/// declaration order, which is not a coincidence this type relies on: the
/// ordering is enforced by `canonical_map`, not by field declaration order.
#[derive(Debug, Clone)]
pub struct Shop {
    /// Shop-wide configuration: currencies, payees, shipping.
    pub manifest: Manifest,
    /// Catalog entries, keyed by [`ObjectId`].
    pub listings: TypedHamt<ObjectId, Listing>,
    /// Customer orders, keyed by [`ObjectId`].
    pub orders: TypedHamt<ObjectId, Order>,
    /// Named listing groupings, keyed by their name.
    pub tags: TypedHamt<String, Tag>,
    /// Shop-scoped identities, keyed by their on-chain address.
    pub accounts: TypedHamt<EthereumAddress, Account>,
    /// Stock counts, keyed by [`CombinedKey`].
    pub inventory: TypedHamt<CombinedKey, u64>,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}

impl Shop {
    /// Builds a freshly constructed shop: empty collections, a zero-valued
    /// manifest (spec §3.5: "the shop itself is created once, by
    /// construction, with empty HAMTs and an empty Manifest").
    pub fn new() -> Self {
        Self {
            manifest: Manifest::default(),
            listings: TypedHamt::new(),
            orders: TypedHamt::new(),
            tags: TypedHamt::new(),
            accounts: TypedHamt::new(),
            inventory: TypedHamt::new(),
        }
    }

    /// Canonically encodes the whole shop to bytes (spec §6.1).
    pub fn to_bytes_canonical(&self) -> Vec<u8> {
        let value = self.to_value();
        let mut out = Vec::new();
        ciborium::into_writer(&value, &mut out).expect("canonical Value trees always encode");
        out
    }

    /// Decodes a whole shop from its canonical bytes.
    pub fn from_bytes_canonical(bytes: &[u8]) -> Result<Self, CodecError> {
        let value: Value = ciborium::from_reader(bytes).map_err(|e| CodecError::Decode {
            inner: e.to_string(),
        })?;
        Self::from_value(&value)
    }

    /// Keccak-256 over the shop's canonical encoding (spec §6.2: `hash` is
    /// Keccak-256 over `encoded`).
    pub fn snapshot_hash(&self) -> [u8; 32] {
        let bytes = self.to_bytes_canonical();
        let mut hasher = Keccak::v256();
        hasher.update(&bytes);
        let mut out = [0u8; 32];
        hasher.finalize(&mut out);
        out
    }
}

impl CanonicalCodec for Shop {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("Tags", self.tags.to_value()),
            ("Orders", self.orders.to_value()),
            ("Accounts", self.accounts.to_value()),
            ("Listings", self.listings.to_value()),
            ("Manifest", self.manifest.to_value()),
            ("Inventory", self.inventory.to_value()),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = shop_codec::schema::DecodedMap::new(value)?;
        let tags = TypedHamt::from_value(map.require("Tags")?, XxHasher)?;
        let orders = TypedHamt::from_value(map.require("Orders")?, XxHasher)?;
        let accounts = TypedHamt::from_value(map.require("Accounts")?, XxHasher)?;
        let listings = TypedHamt::from_value(map.require("Listings")?, XxHasher)?;
        let manifest = Manifest::from_value(map.require("Manifest")?)?;
        let inventory = TypedHamt::from_value(map.require("Inventory")?, XxHasher)?;
        Ok(Shop {
            manifest,
            listings,
            orders,
            tags,
            accounts,
            inventory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_shop_encodes_to_a_six_entry_map_led_by_tags() {
        let shop = Shop::new();
        let bytes = shop.to_bytes_canonical();
        // 0xA6 = map(6), 0x64 = text(4), then "Tags", then the empty-trie
        // encoding 0x82 0x00 0xF6 (spec §8 scenario A).
        assert_eq!(&bytes[..8], [0xA6, 0x64, b'T', b'a', b'g', b's', 0x82, 0x00]);
    }

    #[test]
    fn empty_shop_round_trips_through_canonical_bytes() {
        let shop = Shop::new();
        let bytes = shop.to_bytes_canonical();
        let decoded = Shop::from_bytes_canonical(&bytes).unwrap();
        assert_eq!(decoded.snapshot_hash(), shop.snapshot_hash());
        assert_eq!(decoded.manifest, shop.manifest);
    }

    #[test]
    fn snapshot_hash_is_a_pure_function_of_contents() {
        let a = Shop::new();
        let mut b = Shop::new();
        b.manifest.shop_id = shop_types::Uint256::from(1u64);
        assert_ne!(a.snapshot_hash(), b.snapshot_hash());

        let mut c = Shop::new();
        c.manifest.shop_id = shop_types::Uint256::from(1u64);
        assert_eq!(b.snapshot_hash(), c.snapshot_hash());
    }
}
