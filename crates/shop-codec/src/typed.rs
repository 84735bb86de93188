//! A typed façade over [`shop_hamt::Hamt`], bridging domain key/value types
//! to the trie's raw `Vec<u8>` keys and canonical-CBOR-encoded values.
//!
//! `shop-hamt` stays decoupled from the domain model by design; this module
//! is where that boundary gets crossed, following the same "encode at the
//! edge" shape the teacher's state crate uses for its own typed tree
//! wrappers.

use std::marker::PhantomData;

use shop_hamt::{Hamt, HamtHasher, XxHasher};
use shop_types::error::CodecError;
use shop_types::{CombinedKey, EthereumAddress, ObjectId};

use crate::schema::{from_bytes_canonical, to_bytes_canonical, CanonicalCodec};

/// A domain key type that has a canonical byte encoding suitable for use as
/// a HAMT key.
pub trait HamtKey {
    /// Renders this key's canonical byte encoding.
    fn to_key_bytes(&self) -> Vec<u8>;
}

impl HamtKey for ObjectId {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl HamtKey for EthereumAddress {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}

impl HamtKey for String {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl HamtKey for CombinedKey {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

/// A HAMT over typed keys and canonically-CBOR-encoded values.
#[derive(Debug, Clone)]
pub struct TypedHamt<K, V, H: HamtHasher = XxHasher> {
    inner: Hamt<H>,
    _key: PhantomData<K>,
    _value: PhantomData<V>,
}

impl<K, V> Default for TypedHamt<K, V, XxHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TypedHamt<K, V, XxHasher> {
    /// Builds an empty trie using the default production hasher.
    pub fn new() -> Self {
        Self {
            inner: Hamt::new(),
            _key: PhantomData,
            _value: PhantomData,
        }
    }
}

impl<K: HamtKey, V: CanonicalCodec, H: HamtHasher> TypedHamt<K, V, H> {
    /// Builds an empty trie using a caller-supplied hashing strategy.
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            inner: Hamt::with_hasher(hasher),
            _key: PhantomData,
            _value: PhantomData,
        }
    }

    /// Number of entries currently stored.
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Looks up and decodes the value stored under `key`, if present.
    pub fn get(&self, key: &K) -> Result<Option<V>, CodecError> {
        match self.inner.get(&key.to_key_bytes()) {
            Some(bytes) => Ok(Some(from_bytes_canonical(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Encodes and inserts `value` under `key`, overwriting any prior value.
    /// Rejects a `key` whose canonical byte encoding is empty (spec §3.4
    /// invariant 2).
    pub fn insert(&mut self, key: &K, value: &V) -> Result<(), CodecError> {
        self.inner
            .insert(&key.to_key_bytes(), &to_bytes_canonical(value))
            .map_err(|e| CodecError::Decode { inner: e.to_string() })
    }

    /// Removes the entry stored under `key`. Returns whether one was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.inner.delete(&key.to_key_bytes())
    }

    /// The trie's order-independent content digest.
    pub fn hash(&self) -> [u8; 32] {
        self.inner.hash()
    }

    /// The underlying canonical CBOR `Value` of the whole trie.
    pub fn to_value(&self) -> ciborium::value::Value {
        self.inner.to_value()
    }

    /// Rebuilds a trie from its encoded `Value` form, using `hasher` for
    /// subsequent mutations. Stored values are not decoded eagerly; each
    /// `get`/`try_for_each` call decodes lazily.
    pub fn from_value(value: &ciborium::value::Value, hasher: H) -> Result<Self, CodecError> {
        let inner = Hamt::from_value(value, hasher).map_err(|e| CodecError::Decode {
            inner: e.to_string(),
        })?;
        Ok(Self {
            inner,
            _key: PhantomData,
            _value: PhantomData,
        })
    }

    /// Decodes values out of the trie in trie-traversal order, stopping early
    /// if `f` returns `false`. Errors from decoding a stored value abort the
    /// walk and are surfaced to the caller.
    pub fn try_for_each(&self, mut f: impl FnMut(&[u8], V) -> Result<bool, CodecError>) -> Result<(), CodecError> {
        let mut first_error = None;
        self.inner.iterate(|key, value_bytes| match from_bytes_canonical::<V>(value_bytes) {
            Ok(value) => match f(key, value) {
                Ok(keep_going) => keep_going,
                Err(e) => {
                    first_error = Some(e);
                    false
                }
            },
            Err(e) => {
                first_error = Some(e);
                false
            }
        });
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
