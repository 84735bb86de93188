//! Canonical encoding for [`Order`] and its subordinate records.

use ciborium::value::{Integer, Value};
use shop_types::error::CodecError;
use shop_types::{AddressDetails, Order, OrderPaid, OrderState, OrderedItem, PaymentDetails};

use crate::schema::{canonical_map, value_to_string, value_to_u32, value_to_u64, CanonicalCodec, DecodedMap};
use crate::wire::{
    chain_address_to_value, hash_to_value, object_id_to_value, signature_to_value, timestamp_to_value,
    uint256_to_value, value_to_chain_address, value_to_hash, value_to_object_id, value_to_signature,
    value_to_timestamp, value_to_uint256,
};

impl CanonicalCodec for Order {
    fn to_value(&self) -> Value {
        let mut entries = vec![
            ("ID", object_id_to_value(self.id)),
            ("State", Value::Integer(Integer::from(self.state as u32))),
            ("Items", Value::Array(self.items.iter().map(|i| i.to_value()).collect())),
        ];
        if let Some(addr) = &self.invoice_address {
            entries.push(("InvoiceAddress", addr.to_value()));
        }
        if let Some(addr) = &self.shipping_address {
            entries.push(("ShippingAddress", addr.to_value()));
        }
        if let Some(ts) = &self.canceled_at {
            entries.push(("CanceledAt", timestamp_to_value(ts)));
        }
        if let Some(payee) = &self.chosen_payee {
            entries.push(("ChosenPayee", chain_address_to_value(payee)));
        }
        if let Some(currency) = &self.chosen_currency {
            entries.push(("ChosenCurrency", chain_address_to_value(currency)));
        }
        if let Some(details) = &self.payment_details {
            entries.push(("PaymentDetails", details.to_value()));
        }
        if let Some(tx) = &self.tx_details {
            entries.push(("TxDetails", tx.to_value()));
        }
        canonical_map(entries)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let id = value_to_object_id(map.require("ID")?)?;
        let state_raw = value_to_u32(map.require("State")?)?;
        let state = OrderState::try_from(state_raw)?;
        let items = map
            .require("Items")?
            .as_array()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected an array of ordered items".into(),
            })?
            .iter()
            .map(OrderedItem::from_value)
            .collect::<Result<Vec<_>, CodecError>>()?;
        let invoice_address = map
            .optional("InvoiceAddress")
            .map(AddressDetails::from_value)
            .transpose()?;
        let shipping_address = map
            .optional("ShippingAddress")
            .map(AddressDetails::from_value)
            .transpose()?;
        let canceled_at = map.optional("CanceledAt").map(value_to_timestamp).transpose()?;
        let chosen_payee = map.optional("ChosenPayee").map(value_to_chain_address).transpose()?;
        let chosen_currency = map
            .optional("ChosenCurrency")
            .map(value_to_chain_address)
            .transpose()?;
        let payment_details = map
            .optional("PaymentDetails")
            .map(PaymentDetails::from_value)
            .transpose()?;
        let tx_details = map.optional("TxDetails").map(OrderPaid::from_value).transpose()?;
        Ok(Order {
            id,
            state,
            items,
            invoice_address,
            shipping_address,
            canceled_at,
            chosen_payee,
            chosen_currency,
            payment_details,
            tx_details,
        })
    }
}

impl CanonicalCodec for OrderedItem {
    fn to_value(&self) -> Value {
        let mut entries = vec![
            ("ListingID", object_id_to_value(self.listing_id)),
            ("Quantity", Value::Integer(Integer::from(self.quantity))),
        ];
        if let Some(variations) = &self.variation_ids {
            entries.push((
                "VariationIDs",
                Value::Array(variations.iter().map(|s| Value::Text(s.clone())).collect()),
            ));
        }
        canonical_map(entries)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let listing_id = value_to_object_id(map.require("ListingID")?)?;
        let quantity = value_to_u32(map.require("Quantity")?)?;
        let variation_ids = map
            .optional("VariationIDs")
            .map(|v| {
                v.as_array()
                    .ok_or_else(|| CodecError::Decode {
                        inner: "expected an array of variation ids".into(),
                    })?
                    .iter()
                    .map(value_to_string)
                    .collect::<Result<Vec<_>, CodecError>>()
            })
            .transpose()?;
        Ok(OrderedItem {
            listing_id,
            variation_ids,
            quantity,
        })
    }
}

impl CanonicalCodec for AddressDetails {
    fn to_value(&self) -> Value {
        let mut entries = vec![
            ("Name", Value::Text(self.name.clone())),
            ("Address1", Value::Text(self.address1.clone())),
            ("City", Value::Text(self.city.clone())),
            ("Country", Value::Text(self.country.clone())),
            ("EmailAddress", Value::Text(self.email_address.clone())),
        ];
        if let Some(address2) = &self.address2 {
            entries.push(("Address2", Value::Text(address2.clone())));
        }
        if let Some(postal_code) = &self.postal_code {
            entries.push(("PostalCode", Value::Text(postal_code.clone())));
        }
        if let Some(phone_number) = &self.phone_number {
            entries.push(("PhoneNumber", Value::Text(phone_number.clone())));
        }
        canonical_map(entries)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        Ok(AddressDetails {
            name: value_to_string(map.require("Name")?)?,
            address1: value_to_string(map.require("Address1")?)?,
            address2: map.optional("Address2").map(value_to_string).transpose()?,
            city: value_to_string(map.require("City")?)?,
            postal_code: map.optional("PostalCode").map(value_to_string).transpose()?,
            country: value_to_string(map.require("Country")?)?,
            email_address: value_to_string(map.require("EmailAddress")?)?,
            phone_number: map.optional("PhoneNumber").map(value_to_string).transpose()?,
        })
    }
}

impl CanonicalCodec for PaymentDetails {
    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("PaymentID", hash_to_value(&self.payment_id)),
            ("Total", uint256_to_value(&self.total)),
            (
                "ListingHashes",
                Value::Array(self.listing_hashes.iter().map(hash_to_value).collect()),
            ),
            ("TTL", Value::Integer(Integer::from(self.ttl))),
            ("ShopSignature", signature_to_value(&self.shop_signature)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let payment_id = value_to_hash(map.require("PaymentID")?)?;
        let total = value_to_uint256(map.require("Total")?)?;
        let listing_hashes = map
            .require("ListingHashes")?
            .as_array()
            .ok_or_else(|| CodecError::Decode {
                inner: "expected an array of content hashes".into(),
            })?
            .iter()
            .map(value_to_hash)
            .collect::<Result<Vec<_>, CodecError>>()?;
        let ttl = value_to_u64(map.require("TTL")?)?;
        let shop_signature = value_to_signature(map.require("ShopSignature")?)?;
        Ok(PaymentDetails {
            payment_id,
            total,
            listing_hashes,
            ttl,
            shop_signature,
        })
    }
}

impl CanonicalCodec for OrderPaid {
    fn to_value(&self) -> Value {
        let mut entries = vec![("BlockHash", hash_to_value(&self.block_hash))];
        if let Some(tx_hash) = &self.tx_hash {
            entries.push(("TxHash", hash_to_value(tx_hash)));
        }
        canonical_map(entries)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        Ok(OrderPaid {
            tx_hash: map.optional("TxHash").map(value_to_hash).transpose()?,
            block_hash: value_to_hash(map.require("BlockHash")?)?,
        })
    }
}
