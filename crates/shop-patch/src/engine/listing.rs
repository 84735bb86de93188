//! Listing field walker (spec §4.3.5 "Listing").

use shop_codec::schema::CanonicalCodec;
use shop_codec::wire::{value_to_listing_view_state, value_to_uint256};
use shop_core::Shop;
use shop_types::{Listing, ListingMetadata, ListingOption, ListingStockStatus, ListingVariation, OpString, PriceModifier};

use super::{array_mutate, decode, map_mutate, option_mutate, replace_only, unsupported_op};
use crate::envelope::Patch;
use crate::error::PatchError;
use crate::path::ArrayIndex;
use crate::validator::validate_listing;

pub(super) fn apply(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let id = patch.path.object_id()?;
    if patch.path.fields.is_empty() {
        return apply_whole(shop, patch);
    }
    let mut listing = shop.listings.get(&id)?.ok_or_else(|| PatchError::NotFound {
        kind: "listing",
        key: id.to_string(),
    })?;
    apply_fields(&mut listing, patch)?;
    validate_listing(&listing)?;
    shop.listings.insert(&id, &listing)?;
    Ok(())
}

fn apply_whole(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let id = patch.path.object_id()?;
    match patch.op {
        OpString::Add => {
            if shop.listings.get(&id)?.is_some() {
                return Err(PatchError::Duplicate {
                    kind: "listing",
                    key: id.to_string(),
                });
            }
            let listing = decode::<Listing>(&patch.value, "listing")?;
            validate_listing(&listing)?;
            shop.listings.insert(&id, &listing)?;
            Ok(())
        }
        OpString::Replace => {
            if shop.listings.get(&id)?.is_none() {
                return Err(PatchError::NotFound {
                    kind: "listing",
                    key: id.to_string(),
                });
            }
            let listing = decode::<Listing>(&patch.value, "listing")?;
            validate_listing(&listing)?;
            shop.listings.insert(&id, &listing)?;
            Ok(())
        }
        OpString::Remove => {
            if !shop.listings.delete(&id) {
                return Err(PatchError::NotFound {
                    kind: "listing",
                    key: id.to_string(),
                });
            }
            Ok(())
        }
        other => Err(unsupported_op(other, "listing")),
    }
}

fn apply_fields(listing: &mut Listing, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.first().map(String::as_str) {
        Some("price") => {
            let v = super::require_value(&patch.value, "listing.price")?;
            let decoded = value_to_uint256(v).map_err(PatchError::from)?;
            replace_only(&mut listing.price, patch.op, decoded, "listing.price")
        }
        Some("viewState") => {
            let v = super::require_value(&patch.value, "listing.viewState")?;
            let decoded = value_to_listing_view_state(v).map_err(PatchError::from)?;
            replace_only(&mut listing.view_state, patch.op, decoded, "listing.viewState")
        }
        Some("metadata") => apply_metadata(&mut listing.metadata, patch, &fields[1..]),
        Some("options") => apply_options(listing, patch),
        Some("stockStatuses") => apply_stock_statuses(listing, patch),
        Some(other) => Err(super::unsupported_field(other)),
        None => unreachable!("whole-listing ops are handled by apply_whole"),
    }
}

fn apply_metadata(metadata: &mut ListingMetadata, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    match fields.first().map(String::as_str) {
        None => {
            let decoded = decode::<ListingMetadata>(&patch.value, "metadata")?;
            replace_only(metadata, patch.op, decoded, "metadata")
        }
        Some("title") => replace_string(&mut metadata.title, patch, "metadata.title"),
        Some("description") => replace_string(&mut metadata.description, patch, "metadata.description"),
        Some("images") => {
            let index_token = fields.get(1).ok_or_else(|| PatchError::InvalidPath {
                reason: "images requires an index".into(),
            })?;
            let index = ArrayIndex::parse(index_token)?;
            let item = match patch.op {
                OpString::Remove => None,
                _ => {
                    let v = super::require_value(&patch.value, "metadata.images element")?
                        .as_text()
                        .ok_or_else(|| super::decode_error("expected a text string".into()))?
                        .to_string();
                    Some(v)
                }
            };
            array_mutate(&mut metadata.images, patch.op, index, item)
        }
        Some(other) => Err(super::unsupported_field(other)),
    }
}

fn replace_string(slot: &mut String, patch: &Patch, what: &str) -> Result<(), PatchError> {
    let v = super::require_value(&patch.value, what)?
        .as_text()
        .ok_or_else(|| super::decode_error("expected a text string".into()))?
        .to_string();
    replace_only(slot, patch.op, v, what)
}

fn apply_options(listing: &mut Listing, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.get(1) {
        None => Err(PatchError::InvalidPath {
            reason: "options: specify key".into(),
        }),
        Some(key) => {
            if fields.len() == 2 {
                let value = match patch.op {
                    OpString::Remove => None,
                    _ => Some(decode::<ListingOption>(&patch.value, "options element")?),
                };
                map_mutate(&mut listing.options, patch.op, key, "listing-option", value)
            } else {
                let option = listing.options.get_mut(key).ok_or_else(|| PatchError::NotFound {
                    kind: "listing-option",
                    key: key.clone(),
                })?;
                apply_option_subfield(option, patch, &fields[2..])
            }
        }
    }
}

fn apply_option_subfield(option: &mut ListingOption, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    match fields.first().map(String::as_str) {
        Some("title") => replace_string(&mut option.title, patch, "listing-option.title"),
        Some("variations") => apply_variations(option, patch, &fields[1..]),
        Some(other) => Err(super::unsupported_field(other)),
        None => Err(PatchError::InvalidPath {
            reason: "listing-option requires a sub-field".into(),
        }),
    }
}

fn apply_variations(option: &mut ListingOption, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    match fields.first() {
        None => Err(PatchError::InvalidPath {
            reason: "variations: specify key".into(),
        }),
        Some(key) => {
            if fields.len() == 1 {
                let value = match patch.op {
                    OpString::Remove => None,
                    _ => Some(decode::<ListingVariation>(&patch.value, "variations element")?),
                };
                map_mutate(&mut option.variations, patch.op, key, "variation", value)
            } else {
                let variation = option.variations.get_mut(key).ok_or_else(|| PatchError::NotFound {
                    kind: "variation",
                    key: key.clone(),
                })?;
                apply_variation_subfield(variation, patch, &fields[1..])
            }
        }
    }
}

fn apply_variation_subfield(variation: &mut ListingVariation, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    match fields.first().map(String::as_str) {
        Some("variationInfo") => apply_metadata(&mut variation.variation_info, patch, &fields[1..]),
        Some("priceModifier") => {
            let value = match patch.op {
                OpString::Remove => None,
                _ => Some(decode::<PriceModifier>(&patch.value, "variation.priceModifier")?),
            };
            option_mutate(&mut variation.price_modifier, patch.op, value, "variation.priceModifier")
        }
        Some("sku") => {
            let value = match patch.op {
                OpString::Remove => None,
                _ => {
                    let v = super::require_value(&patch.value, "variation.sku")?
                        .as_text()
                        .ok_or_else(|| super::decode_error("expected a text string".into()))?
                        .to_string();
                    Some(v)
                }
            };
            option_mutate(&mut variation.sku, patch.op, value, "variation.sku")
        }
        Some(other) => Err(super::unsupported_field(other)),
        None => Err(PatchError::InvalidPath {
            reason: "variation requires a sub-field".into(),
        }),
    }
}

fn apply_stock_statuses(listing: &mut Listing, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    let index_token = fields.get(1).ok_or_else(|| PatchError::InvalidPath {
        reason: "stockStatuses requires an index".into(),
    })?;
    if fields.len() > 2 {
        return Err(PatchError::InvalidPath {
            reason: "stockStatuses elements have no sub-fields".into(),
        });
    }
    let index = ArrayIndex::parse(index_token)?;
    let item = match patch.op {
        OpString::Remove => None,
        _ => Some(decode::<ListingStockStatus>(&patch.value, "stockStatuses element")?),
    };
    array_mutate(&mut listing.stock_statuses, patch.op, index, item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::{ListingViewState, ObjectId};

    fn sample_listing(id: u64) -> Listing {
        Listing {
            id: ObjectId(id),
            price: shop_types::Uint256::from(100u64),
            metadata: ListingMetadata {
                title: "Widget".into(),
                description: "A widget".into(),
                images: vec!["first.png".into()],
            },
            view_state: ListingViewState::Published,
            options: Default::default(),
            stock_statuses: vec![],
        }
    }

    #[test]
    fn price_replace_changes_price() {
        let mut shop = Shop::new();
        shop.listings.insert(&ObjectId(1), &sample_listing(1)).unwrap();

        let patch = Patch {
            op: OpString::Replace,
            path: crate::path::PatchPath::with_object_id(shop_types::ObjectType::Listing, ObjectId(1), vec!["price".into()]),
            value: Some(shop_codec::wire::uint256_to_value(&shop_types::Uint256::from(250u64))),
        };
        apply(&mut shop, &patch).unwrap();
        let listing = shop.listings.get(&ObjectId(1)).unwrap().unwrap();
        assert_eq!(listing.price, shop_types::Uint256::from(250u64));
    }

    #[test]
    fn image_prepend_then_shift_reorders_images() {
        let mut shop = Shop::new();
        shop.listings.insert(&ObjectId(1), &sample_listing(1)).unwrap();

        let prepend = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::with_object_id(
                shop_types::ObjectType::Listing,
                ObjectId(1),
                vec!["metadata".into(), "images".into(), "0".into()],
            ),
            value: Some(ciborium::value::Value::Text("hero.png".into())),
        };
        apply(&mut shop, &prepend).unwrap();
        let listing = shop.listings.get(&ObjectId(1)).unwrap().unwrap();
        assert_eq!(listing.metadata.images, vec!["hero.png".to_string(), "first.png".to_string()]);
    }

    #[test]
    fn adding_a_duplicate_listing_is_rejected() {
        let mut shop = Shop::new();
        shop.listings.insert(&ObjectId(1), &sample_listing(1)).unwrap();

        let patch = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::with_object_id(shop_types::ObjectType::Listing, ObjectId(1), vec![]),
            value: Some(sample_listing(1).to_value()),
        };
        let err = apply(&mut shop, &patch).unwrap_err();
        assert_eq!(err.to_string(), "listing already exists: 1");
    }
}
