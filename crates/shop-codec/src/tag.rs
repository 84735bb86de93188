//! Canonical encoding for [`Tag`].

use ciborium::value::Value;
use shop_types::error::CodecError;
use shop_types::Tag;

use crate::schema::{canonical_map, value_to_string, CanonicalCodec, DecodedMap};
use crate::wire::{object_id_to_value, value_to_object_id};

impl CanonicalCodec for Tag {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("Name", Value::Text(self.name.clone())),
            (
                "ListingIDs",
                Value::Array(self.listing_ids.iter().map(|id| object_id_to_value(*id)).collect()),
            ),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let name = value_to_string(map.require("Name")?)?;
        let listing_ids = map
            .require("ListingIDs")?
            .as_array()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected an array of listing ids".into(),
            })?
            .iter()
            .map(value_to_object_id)
            .collect::<Result<Vec<_>, CodecError>>()?;
        Ok(Tag { name, listing_ids })
    }
}
