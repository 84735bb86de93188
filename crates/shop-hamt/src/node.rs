//! Node layout and canonical CBOR (de)serialization (spec §4.1 "Node layout",
//! "Serialization").

use std::sync::Arc;

use ciborium::value::Value;

use crate::error::TrieError;

/// One level of the trie: a sparse, bitmap-indexed array of entries.
///
/// The index in `entries` for a logical slot `i` is
/// `popcount(bitmap & ((1 << i) - 1))`; bit `i` is set iff that slot is
/// occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub bitmap: u32,
    pub entries: Vec<Entry>,
}

/// One occupied slot within a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A terminal key/value pair.
    Leaf { key: Vec<u8>, value: Vec<u8> },
    /// A pointer to a deeper level of the trie.
    Branch(Arc<Node>),
    /// A linear fallback bucket for keys that still collide after every
    /// reseed attempt (spec §4.1: "fall back to a linear bucket at the
    /// terminal node"). Not part of the source format; an addition
    /// required to make the fallback rule concretely serializable.
    Bucket(Vec<(Vec<u8>, Vec<u8>)>),
}

impl Node {
    /// The empty node: zero bitmap, zero entries.
    pub fn empty() -> Self {
        Self {
            bitmap: 0,
            entries: Vec::new(),
        }
    }

    /// The array index within `entries` the given slot bit maps to.
    pub fn slot_index(bitmap: u32, slot: usize) -> usize {
        (bitmap & ((1u32 << slot).wrapping_sub(1))).count_ones() as usize
    }

    /// Encodes this node as `[bitmap, [Entry]]` (spec §4.1 "Serialization").
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::Integer(self.bitmap.into()),
            Value::Array(self.entries.iter().map(Entry::to_value).collect()),
        ])
    }

    /// Decodes a node from its `[bitmap, [Entry]]` form, rejecting any input
    /// that violates `popcount(bitmap) == len(entries)`.
    pub fn from_value(value: &Value) -> Result<Self, TrieError> {
        let arr = value
            .as_array()
            .ok_or_else(|| TrieError::CorruptTrie("node is not an array".into()))?;
        if arr.len() != 2 {
            return Err(TrieError::CorruptTrie("node array must have 2 elements".into()));
        }
        let bitmap_int = arr[0]
            .as_integer()
            .ok_or_else(|| TrieError::CorruptTrie("node bitmap is not an integer".into()))?;
        let bitmap_u64: u64 = bitmap_int
            .try_into()
            .map_err(|_| TrieError::CorruptTrie("node bitmap out of range".into()))?;
        let bitmap_u32: u32 = u32::try_from(bitmap_u64)
            .map_err(|_| TrieError::CorruptTrie("node bitmap out of range".into()))?;
        let entries_raw = arr[1]
            .as_array()
            .ok_or_else(|| TrieError::CorruptTrie("node entries is not an array".into()))?;
        let entries = entries_raw
            .iter()
            .map(Entry::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        if bitmap_u32.count_ones() as usize != entries.len() {
            return Err(TrieError::InvalidSlotIndex);
        }
        Ok(Self {
            bitmap: bitmap_u32,
            entries,
        })
    }
}

impl Entry {
    /// Encodes this entry as `[key, value, child-or-nil]`. For a `Branch`,
    /// `key`/`value` are empty byte strings and `child` is the nested node.
    /// For a `Bucket`, `key`/`value` are empty and `child` holds an array of
    /// `[key, value]` pairs rather than a node.
    pub fn to_value(&self) -> Value {
        match self {
            Entry::Leaf { key, value } => Value::Array(vec![
                Value::Bytes(key.clone()),
                Value::Bytes(value.clone()),
                Value::Null,
            ]),
            Entry::Branch(child) => Value::Array(vec![
                Value::Bytes(Vec::new()),
                Value::Bytes(Vec::new()),
                child.to_value(),
            ]),
            Entry::Bucket(items) => Value::Array(vec![
                Value::Bytes(Vec::new()),
                Value::Bytes(Vec::new()),
                Value::Array(
                    items
                        .iter()
                        .map(|(k, v)| Value::Array(vec![Value::Bytes(k.clone()), Value::Bytes(v.clone())]))
                        .collect(),
                ),
            ]),
        }
    }

    /// Decodes an entry, disambiguating branch/bucket by payload shape: a
    /// node's third slot is always `[bitmap: Integer, entries: Array]`,
    /// while a bucket's is an array of two-element `[key, value]` arrays.
    pub fn from_value(value: &Value) -> Result<Self, TrieError> {
        let arr = value
            .as_array()
            .ok_or_else(|| TrieError::CorruptTrie("entry is not an array".into()))?;
        if arr.len() != 3 {
            return Err(TrieError::CorruptTrie("entry array must have 3 elements".into()));
        }
        let child_slot = &arr[2];
        match child_slot {
            Value::Null => {
                let key = arr[0]
                    .as_bytes()
                    .ok_or_else(|| TrieError::CorruptTrie("leaf key is not bytes".into()))?
                    .clone();
                let value = arr[1]
                    .as_bytes()
                    .ok_or_else(|| TrieError::CorruptTrie("leaf value is not bytes".into()))?
                    .clone();
                Ok(Entry::Leaf { key, value })
            }
            Value::Array(inner) if is_node_shape(inner) => {
                Ok(Entry::Branch(Arc::new(Node::from_value(child_slot)?)))
            }
            Value::Array(pairs) => {
                let items = pairs
                    .iter()
                    .map(|pair| {
                        let pair_arr = pair
                            .as_array()
                            .ok_or_else(|| TrieError::CorruptTrie("bucket item is not an array".into()))?;
                        if pair_arr.len() != 2 {
                            return Err(TrieError::CorruptTrie("bucket item must be [key, value]".into()));
                        }
                        let k = pair_arr[0]
                            .as_bytes()
                            .ok_or_else(|| TrieError::CorruptTrie("bucket key is not bytes".into()))?
                            .clone();
                        let v = pair_arr[1]
                            .as_bytes()
                            .ok_or_else(|| TrieError::CorruptTrie("bucket value is not bytes".into()))?
                            .clone();
                        Ok((k, v))
                    })
                    .collect::<Result<Vec<_>, TrieError>>()?;
                Ok(Entry::Bucket(items))
            }
            _ => Err(TrieError::CorruptTrie("unrecognized entry child slot".into())),
        }
    }
}

/// A node's encoded shape is exactly `[Integer, Array]`; a bucket's payload
/// is an array of two-element arrays, which never starts with an integer.
fn is_node_shape(inner: &[Value]) -> bool {
    inner.len() == 2 && matches!(inner[0], Value::Integer(_)) && matches!(inner[1], Value::Array(_))
}
