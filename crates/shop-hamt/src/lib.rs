//! Persistent Hash Array Mapped Trie providing a map-like container whose
//! root digest is a stable, order-independent hash of its contents
//! (spec §4.1).
//!
//! This crate is deliberately type-erased: it stores `Vec<u8> -> Vec<u8>`.
//! Typed, domain-aware wrappers live in `shop-codec`/`shop-core`, which
//! encode keys and values before delegating here.

pub mod error;
pub mod hasher;
pub mod node;
pub mod trie;

pub use error::{ErrorCode, TrieError};
pub use hasher::{AlwaysCollideHasher, ConstantHasher, HamtHasher, XxHasher};
pub use node::{Entry, Node};
pub use trie::{Hamt, BITS_PER_STEP, MAX_DEPTH};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_trie_encodes_to_canonical_three_bytes() {
        let hamt = Hamt::new();
        let value = hamt.to_value();
        let mut bytes = Vec::new();
        ciborium::into_writer(&value, &mut bytes).unwrap();
        assert_eq!(bytes, vec![0x82, 0x00, 0xF6]);
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut hamt = Hamt::new();
        hamt.insert(b"alpha", b"1").unwrap();
        hamt.insert(b"beta", b"2").unwrap();
        assert_eq!(hamt.get(b"alpha"), Some(b"1".to_vec()));
        assert_eq!(hamt.get(b"beta"), Some(b"2".to_vec()));
        assert_eq!(hamt.get(b"gamma"), None);
        assert_eq!(hamt.size(), 2);
    }

    #[test]
    fn idempotent_insert_preserves_size_and_hash() {
        let mut hamt = Hamt::new();
        hamt.insert(b"k", b"v").unwrap();
        let size_before = hamt.size();
        let hash_before = hamt.hash();
        hamt.insert(b"k", b"v").unwrap();
        assert_eq!(hamt.size(), size_before);
        assert_eq!(hamt.hash(), hash_before);
    }

    #[test]
    fn insert_delete_inverse_restores_hash() {
        let mut hamt = Hamt::new();
        hamt.insert(b"a", b"1").unwrap();
        hamt.insert(b"b", b"2").unwrap();
        let before = hamt.hash();
        hamt.insert(b"c", b"3").unwrap();
        assert!(hamt.delete(b"c"));
        assert_eq!(hamt.hash(), before);
    }

    #[test]
    fn delete_of_absent_key_is_a_no_op() {
        let mut hamt = Hamt::new();
        hamt.insert(b"a", b"1").unwrap();
        assert!(!hamt.delete(b"nope"));
        assert_eq!(hamt.size(), 1);
    }

    #[test]
    fn insert_rejects_zero_length_key() {
        let mut hamt = Hamt::new();
        assert!(matches!(hamt.insert(b"", b"v"), Err(TrieError::EmptyKey)));
        assert_eq!(hamt.size(), 0);
    }

    #[test]
    fn order_independent_hash_for_fixed_key_set() {
        let pairs: Vec<(&[u8], &[u8])> = vec![
            (b"one", b"1"),
            (b"two", b"2"),
            (b"three", b"3"),
            (b"four", b"4"),
        ];

        let mut forward = Hamt::new();
        for (k, v) in &pairs {
            forward.insert(k, v).unwrap();
        }

        let mut reversed = Hamt::new();
        for (k, v) in pairs.iter().rev() {
            reversed.insert(k, v).unwrap();
        }

        assert_eq!(forward.hash(), reversed.hash());
        assert_eq!(forward.size(), reversed.size());
    }

    #[test]
    fn forced_collisions_remain_independently_retrievable() {
        let forced: Vec<Vec<u8>> = vec![b"x".to_vec(), b"y".to_vec(), b"z".to_vec()];
        let hasher = ConstantHasher {
            forced_collisions: forced.clone(),
            constant: 42,
        };
        let mut hamt = Hamt::with_hasher(hasher);
        for (i, k) in forced.iter().enumerate() {
            hamt.insert(k, format!("v{i}").as_bytes()).unwrap();
        }
        assert_eq!(hamt.size(), forced.len());
        for (i, k) in forced.iter().enumerate() {
            assert_eq!(hamt.get(k), Some(format!("v{i}").into_bytes()));
        }
    }

    #[test]
    fn always_colliding_keys_fall_back_to_bucket_and_stay_retrievable() {
        let forced: Vec<Vec<u8>> = vec![b"p".to_vec(), b"q".to_vec(), b"r".to_vec()];
        let hasher = AlwaysCollideHasher {
            forced_collisions: forced.clone(),
            constant: 1,
        };
        let mut hamt = Hamt::with_hasher(hasher);
        for (i, k) in forced.iter().enumerate() {
            hamt.insert(k, format!("v{i}").as_bytes()).unwrap();
        }
        assert_eq!(hamt.size(), forced.len());
        for (i, k) in forced.iter().enumerate() {
            assert_eq!(hamt.get(k), Some(format!("v{i}").into_bytes()));
        }
        // One bucket collapsed to a leaf after removing down to one item.
        assert!(hamt.delete(&forced[0]));
        assert!(hamt.delete(&forced[1]));
        assert_eq!(hamt.get(&forced[2]), Some(b"v2".to_vec()));
    }

    proptest! {
        #[test]
        fn prop_order_independence(mut pairs in proptest::collection::vec((proptest::collection::vec(any::<u8>(), 1..16), proptest::collection::vec(any::<u8>(), 0..16)), 0..64)) {
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs.dedup_by(|a, b| a.0 == b.0);

            let mut forward = Hamt::new();
            for (k, v) in &pairs {
                forward.insert(k, v).unwrap();
            }

            let mut shuffled = pairs.clone();
            // Reverse is a cheap deterministic permutation that still
            // exercises a different insertion order without pulling in an
            // RNG dependency just for this test.
            shuffled.reverse();
            let mut backward = Hamt::new();
            for (k, v) in &shuffled {
                backward.insert(k, v).unwrap();
            }

            prop_assert_eq!(forward.hash(), backward.hash());
            prop_assert_eq!(forward.size(), backward.size());
        }

        #[test]
        fn prop_insert_delete_inverse(key in proptest::collection::vec(any::<u8>(), 1..16), value in proptest::collection::vec(any::<u8>(), 0..16), base in proptest::collection::vec((proptest::collection::vec(any::<u8>(), 1..16), proptest::collection::vec(any::<u8>(), 0..16)), 0..32)) {
            let mut hamt = Hamt::new();
            for (k, v) in &base {
                if k != &key {
                    hamt.insert(k, v).unwrap();
                }
            }
            let before = hamt.hash();
            hamt.insert(&key, &value).unwrap();
            prop_assert!(hamt.delete(&key));
            prop_assert_eq!(hamt.hash(), before);
        }
    }
}
