//! Canonical encoding for [`Account`].

use ciborium::value::Value;
use shop_types::error::CodecError;
use shop_types::Account;

use crate::schema::{canonical_map, CanonicalCodec, DecodedMap};
use crate::wire::{public_key_to_value, value_to_public_key};

impl CanonicalCodec for Account {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            (
                "KeyCards",
                Value::Array(self.key_cards.iter().map(public_key_to_value).collect()),
            ),
            ("Guest", Value::Bool(self.guest)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let key_cards = map
            .require("KeyCards")?
            .as_array()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected an array of public keys".into(),
            })?
            .iter()
            .map(value_to_public_key)
            .collect::<Result<Vec<_>, CodecError>>()?;
        let guest = map
            .require("Guest")?
            .as_bool()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected a bool".into(),
            })?;
        Ok(Account { key_cards, guest })
    }
}
