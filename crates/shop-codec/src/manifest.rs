//! Canonical encoding for [`Manifest`] and its subordinate records.
//!
//! Wire field names follow the exported-struct-field spelling frozen by the
//! shop-level encoding scenario (`ShopID`, `PricingCurrency`, ...) rather than
//! the lower-`snake_case` used for patch-path tokens in `shop-patch`.

use std::collections::BTreeMap;

use ciborium::value::Value;
use shop_types::error::CodecError;
use shop_types::{ChainAddress, Manifest, Payee, PriceModifier, ShippingRegion};

use crate::schema::{canonical_map, value_to_string, CanonicalCodec, DecodedMap};
use crate::wire::{chain_address_to_value, uint256_to_value, value_to_chain_address, value_to_uint256};

fn map_to_value<V: CanonicalCodec>(map: &BTreeMap<String, V>) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, v)| (Value::Text(k.clone()), v.to_value()))
            .collect(),
    )
}

fn value_to_map<V: CanonicalCodec>(value: &Value) -> Result<BTreeMap<String, V>, CodecError> {
    let entries = value.as_map().ok_or_else(|| CodecError::Decode {
        inner: "expected a CBOR map".into(),
    })?;
    let mut out = BTreeMap::new();
    for (k, v) in entries {
        let key = value_to_string(k)?;
        out.insert(key, V::from_value(v)?);
    }
    Ok(out)
}

impl CanonicalCodec for Manifest {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("ShopID", uint256_to_value(&self.shop_id)),
            ("Payees", map_to_value(&self.payees)),
            (
                "AcceptedCurrencies",
                Value::Array(self.accepted_currencies.iter().map(chain_address_to_value).collect()),
            ),
            ("PricingCurrency", chain_address_to_value(&self.pricing_currency)),
            ("ShippingRegions", map_to_value(&self.shipping_regions)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let shop_id = value_to_uint256(map.require("ShopID")?)?;
        let payees = value_to_map(map.require("Payees")?)?;
        let accepted_currencies = map
            .require("AcceptedCurrencies")?
            .as_array()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected an array of chain addresses".into(),
            })?
            .iter()
            .map(value_to_chain_address)
            .collect::<Result<Vec<ChainAddress>, CodecError>>()?;
        let pricing_currency = value_to_chain_address(map.require("PricingCurrency")?)?;
        let shipping_regions = value_to_map(map.require("ShippingRegions")?)?;
        Ok(Manifest {
            shop_id,
            payees,
            accepted_currencies,
            pricing_currency,
            shipping_regions,
        })
    }
}

impl CanonicalCodec for Payee {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("Address", chain_address_to_value(&self.address)),
            ("CallAsContract", Value::Bool(self.call_as_contract)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let address = value_to_chain_address(map.require("Address")?)?;
        let call_as_contract = map
            .require("CallAsContract")?
            .as_bool()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected a bool".into(),
            })?;
        Ok(Payee {
            address,
            call_as_contract,
        })
    }
}

impl CanonicalCodec for ShippingRegion {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("Country", Value::Text(self.country.clone())),
            ("Postcode", Value::Text(self.postcode.clone())),
            ("City", Value::Text(self.city.clone())),
            ("PriceModifiers", map_to_value(&self.price_modifiers)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        Ok(ShippingRegion {
            country: value_to_string(map.require("Country")?)?,
            postcode: value_to_string(map.require("Postcode")?)?,
            city: value_to_string(map.require("City")?)?,
            price_modifiers: value_to_map(map.require("PriceModifiers")?)?,
        })
    }
}

impl CanonicalCodec for PriceModifier {
    fn to_value(&self) -> Value {
        match self {
            PriceModifier::Percent(pct) => canonical_map(vec![("ModificationPercents", uint256_to_value(pct))]),
            PriceModifier::Absolute { amount, plus } => canonical_map(vec![(
                "ModificationAbsolute",
                canonical_map(vec![("Amount", uint256_to_value(amount)), ("Plus", Value::Bool(*plus))]),
            )]),
        }
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        match (
            map.optional("ModificationPercents"),
            map.optional("ModificationAbsolute"),
        ) {
            (Some(pct), None) => Ok(PriceModifier::Percent(value_to_uint256(pct)?)),
            (None, Some(abs)) => {
                let abs_map = DecodedMap::new(abs)?;
                let amount = value_to_uint256(abs_map.require("Amount")?)?;
                let plus = abs_map
                    .require("Plus")?
                    .as_bool()
                    .ok_or_else(|| CodecError::Decode {
                        inner: "expected a bool".into(),
                    })?;
                Ok(PriceModifier::Absolute { amount, plus })
            }
            (None, None) => Err(CodecError::InvalidOneOf {
                detail: "PriceModifier requires exactly one of ModificationPercents or ModificationAbsolute, got neither".into(),
            }),
            (Some(_), Some(_)) => Err(CodecError::InvalidOneOf {
                detail: "PriceModifier requires exactly one of ModificationPercents or ModificationAbsolute, got both".into(),
            }),
        }
    }
}
