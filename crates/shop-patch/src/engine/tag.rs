//! Tag field walker (spec §4.3.5 "Tag").

use shop_core::Shop;
use shop_types::{OpString, Tag};

use super::{array_mutate, replace_only, unsupported_op};
use crate::envelope::Patch;
use crate::error::PatchError;
use crate::path::ArrayIndex;
use crate::validator::validate_tag;

pub(super) fn apply(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let name = patch.path.tag_name()?.to_string();
    if patch.path.fields.is_empty() {
        return apply_whole(shop, patch, &name);
    }
    let mut tag = shop.tags.get(&name)?.ok_or_else(|| PatchError::NotFound {
        kind: "tag",
        key: name.clone(),
    })?;
    apply_fields(&mut tag, patch)?;
    validate_tag(&tag)?;
    shop.tags.insert(&name, &tag)?;
    Ok(())
}

fn apply_whole(shop: &mut Shop, patch: &Patch, name: &str) -> Result<(), PatchError> {
    match patch.op {
        OpString::Add => {
            if shop.tags.get(&name.to_string())?.is_some() {
                return Err(PatchError::Duplicate {
                    kind: "tag",
                    key: name.to_string(),
                });
            }
            let tag = super::decode::<Tag>(&patch.value, "tag")?;
            validate_tag(&tag)?;
            shop.tags.insert(&name.to_string(), &tag)?;
            Ok(())
        }
        OpString::Replace => {
            if shop.tags.get(&name.to_string())?.is_none() {
                return Err(PatchError::NotFound {
                    kind: "tag",
                    key: name.to_string(),
                });
            }
            let tag = super::decode::<Tag>(&patch.value, "tag")?;
            validate_tag(&tag)?;
            shop.tags.insert(&name.to_string(), &tag)?;
            Ok(())
        }
        OpString::Remove => {
            if !shop.tags.delete(&name.to_string()) {
                return Err(PatchError::NotFound {
                    kind: "tag",
                    key: name.to_string(),
                });
            }
            Ok(())
        }
        other => Err(unsupported_op(other, "tag")),
    }
}

fn apply_fields(tag: &mut Tag, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.first().map(String::as_str) {
        Some("name") => {
            let v = super::require_value(&patch.value, "tag.name")?
                .as_text()
                .ok_or_else(|| super::decode_error("expected a text string".into()))?
                .to_string();
            replace_only(&mut tag.name, patch.op, v, "tag.name")
        }
        Some("listingIds") => apply_listing_ids(tag, patch, &fields[1..]),
        Some(other) => Err(super::unsupported_field(other)),
        None => unreachable!("whole-tag ops are handled by apply_whole"),
    }
}

fn apply_listing_ids(tag: &mut Tag, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    let index_token = fields.first().ok_or_else(|| PatchError::InvalidPath {
        reason: "listingIds requires an index".into(),
    })?;
    if fields.len() > 1 {
        return Err(PatchError::InvalidPath {
            reason: "listingIds elements have no sub-fields".into(),
        });
    }
    let index = ArrayIndex::parse(index_token)?;
    let item = match patch.op {
        OpString::Remove => None,
        _ => {
            let v = super::require_value(&patch.value, "listingIds element")?;
            Some(shop_codec::wire::value_to_object_id(v).map_err(PatchError::from)?)
        }
    };
    array_mutate(&mut tag.listing_ids, patch.op, index, item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::ObjectId;

    fn sample_tag() -> Tag {
        Tag {
            name: "seasonal".into(),
            listing_ids: vec![ObjectId(1)],
        }
    }

    #[test]
    fn listing_ids_append_grows_the_list() {
        let mut shop = Shop::new();
        shop.tags.insert(&"seasonal".to_string(), &sample_tag()).unwrap();

        let patch = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::tag("seasonal", vec!["listingIds".into(), "-".into()]),
            value: Some(shop_codec::wire::object_id_to_value(ObjectId(2))),
        };
        apply(&mut shop, &patch).unwrap();
        let tag = shop.tags.get(&"seasonal".to_string()).unwrap().unwrap();
        assert_eq!(tag.listing_ids, vec![ObjectId(1), ObjectId(2)]);
    }

    #[test]
    fn name_increment_is_unsupported() {
        let mut shop = Shop::new();
        shop.tags.insert(&"seasonal".to_string(), &sample_tag()).unwrap();

        let patch = Patch {
            op: OpString::Increment,
            path: crate::path::PatchPath::tag("seasonal", vec!["name".into()]),
            value: None,
        };
        assert!(matches!(apply(&mut shop, &patch), Err(PatchError::UnsupportedOp { .. })));
    }

    #[test]
    fn adding_a_duplicate_tag_is_rejected() {
        let mut shop = Shop::new();
        shop.tags.insert(&"seasonal".to_string(), &sample_tag()).unwrap();

        let patch = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::tag("seasonal", vec![]),
            value: Some(shop_codec::schema::CanonicalCodec::to_value(&sample_tag())),
        };
        assert!(matches!(apply(&mut shop, &patch), Err(PatchError::Duplicate { kind: "tag", .. })));
    }
}
