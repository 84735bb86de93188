//! Typed `(op, path, value)` mutation engine over the shop object graph
//! (spec §4.3).
//!
//! The engine itself is a free function, `engine::apply`, dispatching on
//! [`shop_types::ObjectType`] to a focused per-type field walker (spec §9
//! REDESIGN FLAGS: flatten "deep nested closure-based patch handlers" into
//! per-(object-type, field-path) dispatch tables). [`ShopPatchExt`] wraps
//! that free function as the `Shop::apply`/`Shop::apply_all` convenience the
//! expanded spec calls for, kept as an extension trait so `shop-core` itself
//! stays free of any dependency on the patch engine.

pub mod engine;
pub mod envelope;
pub mod error;
pub mod path;
pub mod validator;

pub use envelope::{Patch, PatchSet, PatchSetHeader};
pub use error::{ErrorCode, PatchError};
pub use path::{ArrayIndex, Discriminator, PatchPath};

use shop_core::Shop;

/// `Shop::apply`/`Shop::apply_all`, added as a convenience over the engine's
/// free `apply` function (spec §3-5 supplement: a patch set's patches are
/// applied in array order and the shop is left untouched if any fails,
/// which per-patch atomicity already implies is safe).
pub trait ShopPatchExt {
    /// Applies one patch. On error, `self` is left exactly as it was before
    /// the call (spec §4.3.7: "errors in any prior state abort with no state
    /// mutation").
    fn apply(&mut self, patch: &Patch) -> Result<(), PatchError>;

    /// Applies a [`PatchSet`]'s patches in array order (spec §5 ordering
    /// guarantee). Stops and leaves `self` untouched at the first failing
    /// patch.
    fn apply_all(&mut self, patches: &[Patch]) -> Result<(), PatchError>;
}

impl ShopPatchExt for Shop {
    fn apply(&mut self, patch: &Patch) -> Result<(), PatchError> {
        engine::apply(self, patch)
    }

    fn apply_all(&mut self, patches: &[Patch]) -> Result<(), PatchError> {
        let candidate_bytes = self.to_bytes_canonical();
        let mut candidate = Shop::from_bytes_canonical(&candidate_bytes).expect("just-encoded shop decodes");
        for patch in patches {
            candidate.apply(patch)?;
        }
        *self = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::{ObjectType, OpString};

    #[test]
    fn apply_all_leaves_shop_untouched_on_mid_batch_failure() {
        let mut shop = Shop::new();
        let before = shop.snapshot_hash();

        let patches = vec![
            Patch {
                op: OpString::Replace,
                path: PatchPath::manifest(vec!["shopId".into()]),
                value: Some(shop_codec::wire::uint256_to_value(&shop_types::Uint256::from(7u64))),
            },
            Patch {
                op: OpString::Remove,
                path: PatchPath::with_object_id(ObjectType::Listing, shop_types::ObjectId(404), vec![]),
                value: None,
            },
        ];

        let err = shop.apply_all(&patches).unwrap_err();
        assert!(matches!(err, PatchError::NotFound { kind: "listing", .. }));
        assert_eq!(shop.snapshot_hash(), before);
    }

    #[test]
    fn apply_all_commits_every_patch_in_order_on_success() {
        let mut shop = Shop::new();
        let patches = vec![
            Patch {
                op: OpString::Replace,
                path: PatchPath::manifest(vec!["shopId".into()]),
                value: Some(shop_codec::wire::uint256_to_value(&shop_types::Uint256::from(9u64))),
            },
            Patch {
                op: OpString::Replace,
                path: PatchPath::manifest(vec!["shopId".into()]),
                value: Some(shop_codec::wire::uint256_to_value(&shop_types::Uint256::from(10u64))),
            },
        ];
        shop.apply_all(&patches).unwrap();
        assert_eq!(shop.manifest.shop_id, shop_types::Uint256::from(10u64));
    }
}
