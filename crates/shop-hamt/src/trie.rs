//! The persistent HAMT itself: insert/get/delete/hash/iterate (spec §4.1).

use std::sync::Arc;

use ciborium::value::Value;
use tiny_keccak::{Hasher as _, Keccak};

use crate::error::TrieError;
use crate::hasher::{HamtHasher, XxHasher};
use crate::node::{Entry, Node};

/// Bits consumed from the routing hash at each trie level.
pub const BITS_PER_STEP: u32 = 5;
/// `ceil(64 / BITS_PER_STEP)`: levels available before a reseed is needed.
pub const MAX_DEPTH: usize = 13;
/// How many times the trie will reseed before falling back to a bucket.
const MAX_SEED_ATTEMPTS: usize = 4;
const SLOT_MASK: u64 = (1u64 << BITS_PER_STEP) - 1;

fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

fn chunk_at(hasher: &impl HamtHasher, key: &[u8], chunk_index: usize) -> usize {
    let seed = (chunk_index / MAX_DEPTH) as u64;
    let local_depth = (chunk_index % MAX_DEPTH) as u32;
    let h = hasher.hash64(key, seed);
    ((h >> (local_depth * BITS_PER_STEP)) & SLOT_MASK) as usize
}

/// A persistent map of `bytes -> bytes`, digestible to a stable,
/// order-independent Keccak-256 root hash.
#[derive(Debug, Clone)]
pub struct Hamt<H: HamtHasher = XxHasher> {
    root: Node,
    size: usize,
    hasher: H,
}

impl Default for Hamt<XxHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl Hamt<XxHasher> {
    /// Builds an empty trie using the default production hasher.
    pub fn new() -> Self {
        Self {
            root: Node::empty(),
            size: 0,
            hasher: XxHasher,
        }
    }
}

impl<H: HamtHasher> Hamt<H> {
    /// Builds an empty trie using a caller-supplied hash strategy (spec §9:
    /// "expose the hash function as a strategy with a default, to support
    /// test-time injection of collision-forcing variants").
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            root: Node::empty(),
            size: 0,
            hasher,
        }
    }

    /// Number of distinct keys currently stored.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Looks up `key`, returning its value if present.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        get_rec(&self.root, key, 0, &self.hasher)
    }

    /// Inserts or overwrites `key` with `value`. Reinserting the same
    /// `(key, value)` pair leaves size and hash unchanged (spec §8 property
    /// 3). Rejects a zero-length `key` (spec §3.4 invariant 2).
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        if key.is_empty() {
            return Err(TrieError::EmptyKey);
        }
        let (new_root, grew) = insert_rec(&self.root, key, value, 0, &self.hasher);
        self.root = new_root;
        if grew {
            self.size += 1;
        }
        Ok(())
    }

    /// Removes `key` if present. A no-op (and returns `false`) if absent.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        let (new_root, removed) = delete_rec(&self.root, key, 0, &self.hasher);
        if removed {
            self.root = new_root;
            self.size -= 1;
        }
        removed
    }

    /// Pre-order walk over all `(key, value)` pairs. `f` returning `false`
    /// stops the walk early.
    pub fn iterate(&self, mut f: impl FnMut(&[u8], &[u8]) -> bool) {
        iterate_rec(&self.root, &mut f);
    }

    /// Computes the canonical, order-independent root digest (spec §4.1
    /// "hash()"). The empty trie hashes to `keccak256(bitmap_be32(0))`.
    pub fn hash(&self) -> [u8; 32] {
        node_hash(&self.root)
    }

    /// Encodes the whole trie per spec §4.1: `[0, nil]` when empty,
    /// `[1, Node]` otherwise.
    pub fn to_value(&self) -> Value {
        if self.size == 0 {
            Value::Array(vec![Value::Integer(0.into()), Value::Null])
        } else {
            Value::Array(vec![Value::Integer(1.into()), self.root.to_value()])
        }
    }

    /// Decodes a whole trie from its `[flag, rootOrNil]` wrapper.
    pub fn from_value(value: &Value, hasher: H) -> Result<Self, TrieError> {
        let arr = value
            .as_array()
            .ok_or_else(|| TrieError::CorruptTrie("trie is not an array".into()))?;
        if arr.len() != 2 {
            return Err(TrieError::CorruptTrie("trie array must have 2 elements".into()));
        }
        let flag = arr[0]
            .as_integer()
            .and_then(|i| u64::try_from(i).ok())
            .ok_or_else(|| TrieError::CorruptTrie("trie flag is not an integer".into()))?;
        match flag {
            0 => Ok(Self {
                root: Node::empty(),
                size: 0,
                hasher,
            }),
            1 => {
                let root = Node::from_value(&arr[1])?;
                let mut size = 0usize;
                count_rec(&root, &mut size);
                Ok(Self { root, size, hasher })
            }
            _ => Err(TrieError::CorruptTrie(format!("unknown trie flag {flag}"))),
        }
    }
}

fn count_rec(node: &Node, size: &mut usize) {
    for entry in &node.entries {
        match entry {
            Entry::Leaf { .. } => *size += 1,
            Entry::Branch(child) => count_rec(child, size),
            Entry::Bucket(items) => *size += items.len(),
        }
    }
}

fn get_rec(node: &Node, key: &[u8], chunk_index: usize, hasher: &impl HamtHasher) -> Option<Vec<u8>> {
    let slot = chunk_at(hasher, key, chunk_index);
    let bit = 1u32 << slot;
    if node.bitmap & bit == 0 {
        return None;
    }
    let idx = Node::slot_index(node.bitmap, slot);
    match &node.entries[idx] {
        Entry::Leaf { key: ekey, value } => (ekey == key).then(|| value.clone()),
        Entry::Branch(child) => get_rec(child, key, chunk_index + 1, hasher),
        Entry::Bucket(items) => items.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()),
    }
}

fn insert_rec(
    node: &Node,
    key: &[u8],
    value: &[u8],
    chunk_index: usize,
    hasher: &impl HamtHasher,
) -> (Node, bool) {
    let slot = chunk_at(hasher, key, chunk_index);
    let bit = 1u32 << slot;

    if node.bitmap & bit == 0 {
        let idx = Node::slot_index(node.bitmap, slot);
        let mut entries = node.entries.clone();
        entries.insert(
            idx,
            Entry::Leaf {
                key: key.to_vec(),
                value: value.to_vec(),
            },
        );
        return (
            Node {
                bitmap: node.bitmap | bit,
                entries,
            },
            true,
        );
    }

    let idx = Node::slot_index(node.bitmap, slot);
    let mut entries = node.entries.clone();
    match &node.entries[idx] {
        Entry::Leaf { key: ekey, .. } if ekey == key => {
            entries[idx] = Entry::Leaf {
                key: key.to_vec(),
                value: value.to_vec(),
            };
            (
                Node {
                    bitmap: node.bitmap,
                    entries,
                },
                false,
            )
        }
        Entry::Leaf {
            key: ekey,
            value: evalue,
        } => {
            if chunk_index + 1 >= MAX_DEPTH * MAX_SEED_ATTEMPTS {
                tracing::trace!(chunk_index, "hamt: falling back to terminal bucket");
                entries[idx] = Entry::Bucket(vec![
                    (ekey.clone(), evalue.clone()),
                    (key.to_vec(), value.to_vec()),
                ]);
                return (
                    Node {
                        bitmap: node.bitmap,
                        entries,
                    },
                    true,
                );
            }
            if chunk_index > 0 && (chunk_index % MAX_DEPTH) == 0 {
                tracing::trace!(chunk_index, "hamt: reseeding on collision");
            }
            let (child1, _) = insert_rec(&Node::empty(), ekey, evalue, chunk_index + 1, hasher);
            let (child2, _) = insert_rec(&child1, key, value, chunk_index + 1, hasher);
            entries[idx] = Entry::Branch(Arc::new(child2));
            (
                Node {
                    bitmap: node.bitmap,
                    entries,
                },
                true,
            )
        }
        Entry::Branch(child) => {
            let (new_child, grew) = insert_rec(child, key, value, chunk_index + 1, hasher);
            entries[idx] = Entry::Branch(Arc::new(new_child));
            (
                Node {
                    bitmap: node.bitmap,
                    entries,
                },
                grew,
            )
        }
        Entry::Bucket(items) => {
            let mut new_items = items.clone();
            let grew = match new_items.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => {
                    slot.1 = value.to_vec();
                    false
                }
                None => {
                    new_items.push((key.to_vec(), value.to_vec()));
                    true
                }
            };
            entries[idx] = Entry::Bucket(new_items);
            (
                Node {
                    bitmap: node.bitmap,
                    entries,
                },
                grew,
            )
        }
    }
}

fn delete_rec(node: &Node, key: &[u8], chunk_index: usize, hasher: &impl HamtHasher) -> (Node, bool) {
    let slot = chunk_at(hasher, key, chunk_index);
    let bit = 1u32 << slot;
    if node.bitmap & bit == 0 {
        return (node.clone(), false);
    }
    let idx = Node::slot_index(node.bitmap, slot);

    match &node.entries[idx] {
        Entry::Leaf { key: ekey, .. } => {
            if ekey != key {
                return (node.clone(), false);
            }
            let mut entries = node.entries.clone();
            entries.remove(idx);
            (
                Node {
                    bitmap: node.bitmap & !bit,
                    entries,
                },
                true,
            )
        }
        Entry::Branch(child) => {
            let (new_child, removed) = delete_rec(child, key, chunk_index + 1, hasher);
            if !removed {
                return (node.clone(), false);
            }
            let mut entries = node.entries.clone();
            if new_child.entries.is_empty() {
                entries.remove(idx);
                (
                    Node {
                        bitmap: node.bitmap & !bit,
                        entries,
                    },
                    true,
                )
            } else if new_child.entries.len() == 1 {
                // Collapse: promote the sole remaining child into this slot.
                match &new_child.entries[0] {
                    Entry::Leaf { key: lk, value: lv } => {
                        entries[idx] = Entry::Leaf {
                            key: lk.clone(),
                            value: lv.clone(),
                        };
                    }
                    other => entries[idx] = other.clone(),
                }
                (
                    Node {
                        bitmap: node.bitmap,
                        entries,
                    },
                    true,
                )
            } else {
                entries[idx] = Entry::Branch(Arc::new(new_child));
                (
                    Node {
                        bitmap: node.bitmap,
                        entries,
                    },
                    true,
                )
            }
        }
        Entry::Bucket(items) => {
            let mut new_items = items.clone();
            let Some(pos) = new_items.iter().position(|(k, _)| k == key) else {
                return (node.clone(), false);
            };
            new_items.remove(pos);
            let mut entries = node.entries.clone();
            if new_items.is_empty() {
                entries.remove(idx);
                return (
                    Node {
                        bitmap: node.bitmap & !bit,
                        entries,
                    },
                    true,
                );
            }
            if new_items.len() == 1 {
                let (k, v) = new_items.into_iter().next().unwrap();
                entries[idx] = Entry::Leaf { key: k, value: v };
            } else {
                entries[idx] = Entry::Bucket(new_items);
            }
            (
                Node {
                    bitmap: node.bitmap,
                    entries,
                },
                true,
            )
        }
    }
}

fn iterate_rec(node: &Node, f: &mut impl FnMut(&[u8], &[u8]) -> bool) -> bool {
    for entry in &node.entries {
        let keep_going = match entry {
            Entry::Leaf { key, value } => f(key, value),
            Entry::Branch(child) => iterate_rec(child, f),
            Entry::Bucket(items) => {
                let mut keep_going = true;
                for (k, v) in items {
                    if !f(k, v) {
                        keep_going = false;
                        break;
                    }
                }
                keep_going
            }
        };
        if !keep_going {
            return false;
        }
    }
    true
}

/// `H(bitmap_be32 ‖ concat_i H_i)` (spec §4.1 "hash()"). Slot order is
/// determined entirely by bitmap position (itself a function of key hash),
/// so this digest does not depend on insertion order.
fn node_hash(node: &Node) -> [u8; 32] {
    let mut buf = Vec::with_capacity(4 + node.entries.len() * 32);
    buf.extend_from_slice(&node.bitmap.to_be_bytes());
    for entry in &node.entries {
        let h = match entry {
            Entry::Leaf { key, value } => {
                keccak256(&[key.as_slice(), value.as_slice()].concat())
            }
            Entry::Branch(child) => node_hash(child),
            Entry::Bucket(items) => {
                // Bucket order is an artifact of insertion, not content; sort
                // the per-item digests before combining so the bucket's
                // contribution stays order-independent like the rest of the
                // trie.
                let mut item_hashes: Vec<[u8; 32]> = items
                    .iter()
                    .map(|(k, v)| keccak256(&[k.as_slice(), v.as_slice()].concat()))
                    .collect();
                item_hashes.sort_unstable();
                keccak256(&item_hashes.concat())
            }
        };
        buf.extend_from_slice(&h);
    }
    keccak256(&buf)
}
