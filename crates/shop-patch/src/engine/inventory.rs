//! Inventory field walker (spec §4.3.5 "Inventory").
//!
//! Unlike the other collections, an inventory path's `fields` are not a
//! struct's field names: they're the variation chain that, together with
//! the path's `object_id` discriminator, builds the
//! [`shop_types::CombinedKey`] selecting one stock cell (spec §3.3
//! glossary, §4.3.5). There is no intermediate object to decode into and
//! re-encode — `add`/`replace`/`remove`/`increment`/`decrement` all operate
//! directly on the `u64` stored under that key.

use shop_core::Shop;
use shop_types::{CombinedKey, OpString};

use crate::envelope::Patch;
use crate::error::PatchError;

pub(super) fn apply(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let listing_id = patch.path.object_id()?;
    let key = CombinedKey {
        listing_id,
        variation_ids: patch.path.fields.clone(),
    };
    validate_variation_chain(shop, &key)?;

    match patch.op {
        OpString::Add => {
            if shop.inventory.get(&key)?.is_some() {
                return Err(PatchError::Duplicate {
                    kind: "inventory",
                    key: inventory_key_label(&key),
                });
            }
            let count = decode_count(patch)?;
            shop.inventory.insert(&key, &count)?;
            Ok(())
        }
        OpString::Replace => {
            if shop.inventory.get(&key)?.is_none() {
                return Err(PatchError::NotFound {
                    kind: "inventory",
                    key: inventory_key_label(&key),
                });
            }
            let count = decode_count(patch)?;
            shop.inventory.insert(&key, &count)?;
            Ok(())
        }
        OpString::Remove => {
            if !shop.inventory.delete(&key) {
                return Err(PatchError::NotFound {
                    kind: "inventory",
                    key: inventory_key_label(&key),
                });
            }
            Ok(())
        }
        OpString::Increment | OpString::Decrement => {
            let delta = decode_count(patch)?;
            let current = shop.inventory.get(&key)?.unwrap_or(0);
            let updated = match patch.op {
                OpString::Increment => current.saturating_add(delta),
                OpString::Decrement => current.saturating_sub(delta),
                _ => unreachable!(),
            };
            shop.inventory.insert(&key, &updated)?;
            Ok(())
        }
    }
}

fn decode_count(patch: &Patch) -> Result<u64, PatchError> {
    let v = super::require_value(&patch.value, "inventory count")?;
    shop_codec::schema::value_to_u64(v).map_err(PatchError::from)
}

fn inventory_key_label(key: &CombinedKey) -> String {
    if key.variation_ids.is_empty() {
        key.listing_id.to_string()
    } else {
        format!("{}/{}", key.listing_id, key.variation_ids.join("/"))
    }
}

/// Enforces spec §3.4 invariant 6: a variation chain must name ids that
/// currently exist among the referenced listing's variations. Checked at
/// apply time against the live `shop.listings` HAMT, never cached, since
/// inventory stores the combined key rather than a pointer back into the
/// listing (spec §9: "no cycles; the inventory stores a pre-computed
/// combined key and does not reference listings by pointer").
///
/// The inventory HAMT is keyed independently of whether the listing it
/// names has been created yet (spec §8 scenario F sets inventory before any
/// listing exists), so this only cross-checks membership when the listing
/// is actually present; an absent listing is not itself an error here.
fn validate_variation_chain(shop: &Shop, key: &CombinedKey) -> Result<(), PatchError> {
    if key.variation_ids.is_empty() {
        return Ok(());
    }
    let Some(listing) = shop.listings.get(&key.listing_id)? else {
        return Ok(());
    };
    let known_variations: std::collections::HashSet<&str> = listing
        .options
        .values()
        .flat_map(|option| option.variations.keys())
        .map(String::as_str)
        .collect();
    for variation_id in &key.variation_ids {
        if !known_variations.contains(variation_id.as_str()) {
            return Err(PatchError::NotFound {
                kind: "variation",
                key: variation_id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::{Listing, ListingMetadata, ListingOption, ListingVariation, ListingViewState, ObjectId};

    fn listing_with_variations(id: u64) -> Listing {
        let mut options = std::collections::BTreeMap::new();
        let mut size_variations = std::collections::BTreeMap::new();
        size_variations.insert("xl".to_string(), ListingVariation::default());
        size_variations.insert("m".to_string(), ListingVariation::default());
        options.insert(
            "size".to_string(),
            ListingOption {
                title: "Size".into(),
                variations: size_variations,
            },
        );
        let mut color_variations = std::collections::BTreeMap::new();
        color_variations.insert("r".to_string(), ListingVariation::default());
        color_variations.insert("b".to_string(), ListingVariation::default());
        options.insert(
            "color".to_string(),
            ListingOption {
                title: "Color".into(),
                variations: color_variations,
            },
        );
        Listing {
            id: ObjectId(id),
            price: shop_types::Uint256::from(100u64),
            metadata: ListingMetadata {
                title: "Shirt".into(),
                description: "A shirt".into(),
                images: vec![],
            },
            view_state: ListingViewState::Published,
            options,
            stock_statuses: vec![],
        }
    }

    #[test]
    fn bare_add_then_variation_add_then_increment_builds_three_rows() {
        let mut shop = Shop::new();
        shop.listings.insert(&ObjectId(9000), &listing_with_variations(9000)).unwrap();

        let bare = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::with_object_id(shop_types::ObjectType::Inventory, ObjectId(9000), vec![]),
            value: Some(ciborium::value::Value::Integer(100.into())),
        };
        apply(&mut shop, &bare).unwrap();

        let variation = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::with_object_id(
                shop_types::ObjectType::Inventory,
                ObjectId(9000),
                vec!["r".into(), "xl".into()],
            ),
            value: Some(ciborium::value::Value::Integer(23.into())),
        };
        apply(&mut shop, &variation).unwrap();

        let increment = Patch {
            op: OpString::Increment,
            path: crate::path::PatchPath::with_object_id(
                shop_types::ObjectType::Inventory,
                ObjectId(9000),
                vec!["b".into(), "m".into()],
            ),
            value: Some(ciborium::value::Value::Integer(42.into())),
        };
        apply(&mut shop, &increment).unwrap();

        assert_eq!(shop.inventory.get(&CombinedKey::listing(ObjectId(9000))).unwrap(), Some(100));
        assert_eq!(
            shop.inventory
                .get(&CombinedKey::variation(ObjectId(9000), vec!["r".into(), "xl".into()]))
                .unwrap(),
            Some(23)
        );
        assert_eq!(
            shop.inventory
                .get(&CombinedKey::variation(ObjectId(9000), vec!["b".into(), "m".into()]))
                .unwrap(),
            Some(42)
        );
    }

    #[test]
    fn variation_chain_referencing_unknown_variation_is_rejected() {
        let mut shop = Shop::new();
        shop.listings.insert(&ObjectId(9000), &listing_with_variations(9000)).unwrap();

        let patch = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::with_object_id(
                shop_types::ObjectType::Inventory,
                ObjectId(9000),
                vec!["nonexistent".into()],
            ),
            value: Some(ciborium::value::Value::Integer(1.into())),
        };
        assert!(matches!(apply(&mut shop, &patch), Err(PatchError::NotFound { kind: "variation", .. })));
    }

    #[test]
    fn decrement_saturates_at_zero() {
        let mut shop = Shop::new();
        let key = CombinedKey::listing(ObjectId(1));
        shop.inventory.insert(&key, &5u64).unwrap();

        let patch = Patch {
            op: OpString::Decrement,
            path: crate::path::PatchPath::with_object_id(shop_types::ObjectType::Inventory, ObjectId(1), vec![]),
            value: Some(ciborium::value::Value::Integer(9.into())),
        };
        apply(&mut shop, &patch).unwrap();
        assert_eq!(shop.inventory.get(&key).unwrap(), Some(0));
    }
}
