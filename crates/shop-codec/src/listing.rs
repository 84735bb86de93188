//! Canonical encoding for [`Listing`] and its subordinate records.

use std::collections::BTreeMap;

use ciborium::value::Value;
use shop_types::error::CodecError;
use shop_types::{Listing, ListingMetadata, ListingOption, ListingStockStatus, ListingVariation, StockDetail};

use crate::schema::{canonical_map, value_to_string, CanonicalCodec, DecodedMap};
use crate::wire::{
    listing_view_state_to_value, object_id_to_value, timestamp_to_value, uint256_to_value, value_to_listing_view_state,
    value_to_object_id, value_to_timestamp, value_to_uint256,
};

fn string_array_to_value(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::Text(s.clone())).collect())
}

fn value_to_string_array(value: &Value) -> Result<Vec<String>, CodecError> {
    value
        .as_array()
        .ok_or_else(|| CodecError::Decode {
            inner: "expected an array of strings".into(),
        })?
        .iter()
        .map(value_to_string)
        .collect()
}

impl CanonicalCodec for Listing {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("ID", object_id_to_value(self.id)),
            ("Price", uint256_to_value(&self.price)),
            ("Metadata", self.metadata.to_value()),
            ("ViewState", listing_view_state_to_value(self.view_state)),
            (
                "Options",
                Value::Map(
                    self.options
                        .iter()
                        .map(|(k, v)| (Value::Text(k.clone()), v.to_value()))
                        .collect(),
                ),
            ),
            (
                "StockStatuses",
                Value::Array(self.stock_statuses.iter().map(|s| s.to_value()).collect()),
            ),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let id = value_to_object_id(map.require("ID")?)?;
        let price = value_to_uint256(map.require("Price")?)?;
        let metadata = ListingMetadata::from_value(map.require("Metadata")?)?;
        let view_state = value_to_listing_view_state(map.require("ViewState")?)?;
        let options_value = map.require("Options")?;
        let options_entries = options_value.as_map().ok_or_else(|| CodecError::Decode {
            inner: "expected a CBOR map".into(),
        })?;
        let mut options = BTreeMap::new();
        for (k, v) in options_entries {
            options.insert(value_to_string(k)?, ListingOption::from_value(v)?);
        }
        let stock_statuses = map
            .require("StockStatuses")?
            .as_array()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected an array of stock statuses".into(),
            })?
            .iter()
            .map(ListingStockStatus::from_value)
            .collect::<Result<Vec<_>, CodecError>>()?;
        Ok(Listing {
            id,
            price,
            metadata,
            view_state,
            options,
            stock_statuses,
        })
    }
}

impl CanonicalCodec for ListingMetadata {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("Title", Value::Text(self.title.clone())),
            ("Description", Value::Text(self.description.clone())),
            ("Images", string_array_to_value(&self.images)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        Ok(ListingMetadata {
            title: value_to_string(map.require("Title")?)?,
            description: value_to_string(map.require("Description")?)?,
            images: value_to_string_array(map.require("Images")?)?,
        })
    }
}

impl CanonicalCodec for ListingOption {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("Title", Value::Text(self.title.clone())),
            (
                "Variations",
                Value::Map(
                    self.variations
                        .iter()
                        .map(|(k, v)| (Value::Text(k.clone()), v.to_value()))
                        .collect(),
                ),
            ),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let title = value_to_string(map.require("Title")?)?;
        let variations_value = map.require("Variations")?;
        let variations_entries = variations_value.as_map().ok_or_else(|| CodecError::Decode {
            inner: "expected a CBOR map".into(),
        })?;
        let mut variations = BTreeMap::new();
        for (k, v) in variations_entries {
            variations.insert(value_to_string(k)?, ListingVariation::from_value(v)?);
        }
        Ok(ListingOption { title, variations })
    }
}

impl CanonicalCodec for ListingVariation {
    fn to_value(&self) -> Value {
        let mut entries = vec![("VariationInfo", self.variation_info.to_value())];
        if let Some(pm) = &self.price_modifier {
            entries.push(("PriceModifier", pm.to_value()));
        }
        if let Some(sku) = &self.sku {
            entries.push(("SKU", Value::Text(sku.clone())));
        }
        canonical_map(entries)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let variation_info = ListingMetadata::from_value(map.require("VariationInfo")?)?;
        let price_modifier = map
            .optional("PriceModifier")
            .map(shop_types::PriceModifier::from_value)
            .transpose()?;
        let sku = map.optional("SKU").map(value_to_string).transpose()?;
        Ok(ListingVariation {
            variation_info,
            price_modifier,
            sku,
        })
    }
}

impl CanonicalCodec for ListingStockStatus {
    fn to_value(&self) -> Value {
        let mut entries = vec![("VariationIDs", string_array_to_value(&self.variation_ids))];
        match &self.detail {
            StockDetail::InStock(flag) => entries.push(("InStock", Value::Bool(*flag))),
            StockDetail::ExpectedInStockBy(ts) => entries.push(("ExpectedInStockBy", timestamp_to_value(ts))),
        }
        canonical_map(entries)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let variation_ids = value_to_string_array(map.require("VariationIDs")?)?;
        let detail = match (map.optional("InStock"), map.optional("ExpectedInStockBy")) {
            (Some(flag), None) => StockDetail::InStock(flag.as_bool().ok_or_else(|| CodecError::Decode {
                inner: "expected a bool".into(),
            })?),
            (None, Some(ts)) => StockDetail::ExpectedInStockBy(value_to_timestamp(ts)?),
            (None, None) => {
                return Err(CodecError::InvalidOneOf {
                    detail: "ListingStockStatus requires exactly one of InStock or ExpectedInStockBy, got neither".into(),
                })
            }
            (Some(_), Some(_)) => {
                return Err(CodecError::InvalidOneOf {
                    detail: "ListingStockStatus requires exactly one of InStock or ExpectedInStockBy, got both".into(),
                })
            }
        };
        Ok(ListingStockStatus { variation_ids, detail })
    }
}
