//! Order field walker (spec §4.3.5 "Order").

use shop_codec::schema::CanonicalCodec;
use shop_codec::wire::{value_to_chain_address, value_to_object_id, value_to_timestamp};
use shop_core::Shop;
use shop_types::{AddressDetails, ChainAddress, Order, OrderPaid, OrderState, OrderedItem, PaymentDetails};
use shop_types::OpString;

use super::{arith_u32, array_index_mut, decode, option_mutate, replace_only, unsupported_op};
use crate::envelope::Patch;
use crate::error::PatchError;
use crate::path::ArrayIndex;
use crate::validator::validate_order;

pub(super) fn apply(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let id = patch.path.object_id()?;
    if patch.path.fields.is_empty() {
        return apply_whole(shop, patch);
    }
    let mut order = shop.orders.get(&id)?.ok_or_else(|| PatchError::NotFound {
        kind: "order",
        key: id.to_string(),
    })?;
    apply_fields(&mut order, patch)?;
    validate_order(&order)?;
    shop.orders.insert(&id, &order)?;
    Ok(())
}

fn apply_whole(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let id = patch.path.object_id()?;
    match patch.op {
        OpString::Add => {
            if shop.orders.get(&id)?.is_some() {
                return Err(PatchError::Duplicate {
                    kind: "order",
                    key: id.to_string(),
                });
            }
            let order = decode::<Order>(&patch.value, "order")?;
            validate_order(&order)?;
            shop.orders.insert(&id, &order)?;
            Ok(())
        }
        OpString::Replace => {
            if shop.orders.get(&id)?.is_none() {
                return Err(PatchError::NotFound {
                    kind: "order",
                    key: id.to_string(),
                });
            }
            let order = decode::<Order>(&patch.value, "order")?;
            validate_order(&order)?;
            shop.orders.insert(&id, &order)?;
            Ok(())
        }
        OpString::Remove => {
            if !shop.orders.delete(&id) {
                return Err(PatchError::NotFound {
                    kind: "order",
                    key: id.to_string(),
                });
            }
            Ok(())
        }
        other => Err(unsupported_op(other, "order")),
    }
}

fn apply_fields(order: &mut Order, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.first().map(String::as_str) {
        Some("state") => {
            let v = super::require_value(&patch.value, "order.state")?;
            let raw = shop_codec::schema::value_to_u32(v).map_err(PatchError::from)?;
            let decoded = OrderState::try_from(raw).map_err(PatchError::from)?;
            replace_only(&mut order.state, patch.op, decoded, "order.state")
        }
        Some("items") => apply_items(order, patch, &fields[1..]),
        Some("invoiceAddress") => apply_address(&mut order.invoice_address, patch, &fields[1..], "invoiceAddress"),
        Some("shippingAddress") => apply_address(&mut order.shipping_address, patch, &fields[1..], "shippingAddress"),
        Some("canceledAt") => {
            let value = match patch.op {
                OpString::Remove => None,
                _ => {
                    let v = super::require_value(&patch.value, "order.canceledAt")?;
                    Some(value_to_timestamp(v).map_err(PatchError::from)?)
                }
            };
            option_mutate(&mut order.canceled_at, patch.op, value, "order.canceledAt")
        }
        Some("chosenPayee") => apply_chain_address(&mut order.chosen_payee, patch, "order.chosenPayee"),
        Some("chosenCurrency") => apply_chain_address(&mut order.chosen_currency, patch, "order.chosenCurrency"),
        Some("paymentDetails") => {
            let value = match patch.op {
                OpString::Remove => None,
                _ => Some(decode::<PaymentDetails>(&patch.value, "order.paymentDetails")?),
            };
            option_mutate(&mut order.payment_details, patch.op, value, "order.paymentDetails")
        }
        Some("txDetails") => {
            let value = match patch.op {
                OpString::Remove => None,
                _ => Some(decode::<OrderPaid>(&patch.value, "order.txDetails")?),
            };
            option_mutate(&mut order.tx_details, patch.op, value, "order.txDetails")
        }
        Some(other) => Err(super::unsupported_field(other)),
        None => unreachable!("whole-order ops are handled by apply_whole"),
    }
}

fn apply_chain_address(slot: &mut Option<ChainAddress>, patch: &Patch, what: &'static str) -> Result<(), PatchError> {
    let value = match patch.op {
        OpString::Remove => None,
        _ => {
            let v = super::require_value(&patch.value, what)?;
            Some(value_to_chain_address(v).map_err(PatchError::from)?)
        }
    };
    option_mutate(slot, patch.op, value, what)
}

fn apply_items(order: &mut Order, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    let index_token = fields.first().ok_or_else(|| PatchError::InvalidPath {
        reason: "items requires an index".into(),
    })?;
    let index = ArrayIndex::parse(index_token)?;
    if fields.len() == 1 {
        let item = match patch.op {
            OpString::Remove => None,
            _ => Some(decode::<OrderedItem>(&patch.value, "items element")?),
        };
        return super::array_mutate(&mut order.items, patch.op, index, item);
    }
    let item = array_index_mut(&mut order.items, index)?;
    apply_item_subfield(item, patch, &fields[1..])
}

fn apply_item_subfield(item: &mut OrderedItem, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    match fields.first().map(String::as_str) {
        Some("quantity") => {
            let delta = match patch.op {
                OpString::Increment | OpString::Decrement => {
                    let v = super::require_value(&patch.value, "items[].quantity")?;
                    shop_codec::schema::value_to_u32(v).map_err(PatchError::from)?
                }
                _ => {
                    let v = super::require_value(&patch.value, "items[].quantity")?;
                    let decoded = shop_codec::schema::value_to_u32(v).map_err(PatchError::from)?;
                    return replace_only(&mut item.quantity, patch.op, decoded, "items[].quantity");
                }
            };
            arith_u32(&mut item.quantity, patch.op, delta)
        }
        Some("listingId") => {
            let v = super::require_value(&patch.value, "items[].listingId")?;
            let decoded = value_to_object_id(v).map_err(PatchError::from)?;
            replace_only(&mut item.listing_id, patch.op, decoded, "items[].listingId")
        }
        Some("variationIds") => {
            let value = match patch.op {
                OpString::Remove => None,
                _ => {
                    let v = super::require_value(&patch.value, "items[].variationIds")?;
                    let arr = v.as_array().ok_or_else(|| super::decode_error("expected an array of strings".into()))?;
                    let strings = arr
                        .iter()
                        .map(|t| {
                            t.as_text()
                                .map(str::to_string)
                                .ok_or_else(|| super::decode_error("expected a text string".into()))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Some(strings)
                }
            };
            option_mutate(&mut item.variation_ids, patch.op, value, "items[].variationIds")
        }
        Some(other) => Err(super::unsupported_field(other)),
        None => Err(PatchError::InvalidPath {
            reason: "order item requires a sub-field".into(),
        }),
    }
}

fn apply_address(
    slot: &mut Option<AddressDetails>,
    patch: &Patch,
    fields: &[String],
    what: &'static str,
) -> Result<(), PatchError> {
    match fields.first().map(String::as_str) {
        None => {
            let value = match patch.op {
                OpString::Remove => None,
                _ => Some(decode::<AddressDetails>(&patch.value, what)?),
            };
            option_mutate(slot, patch.op, value, what)
        }
        Some(field) => {
            let address = slot.as_mut().ok_or_else(|| PatchError::NotFound {
                kind: what,
                key: String::new(),
            })?;
            apply_address_subfield(address, patch, field)
        }
    }
}

fn apply_address_subfield(address: &mut AddressDetails, patch: &Patch, field: &str) -> Result<(), PatchError> {
    match field {
        "name" => replace_string(&mut address.name, patch, "address.name"),
        "address1" => replace_string(&mut address.address1, patch, "address.address1"),
        "city" => replace_string(&mut address.city, patch, "address.city"),
        "country" => replace_string(&mut address.country, patch, "address.country"),
        "emailAddress" => replace_string(&mut address.email_address, patch, "address.emailAddress"),
        "address2" => replace_optional_string(&mut address.address2, patch, "address.address2"),
        "postalCode" => replace_optional_string(&mut address.postal_code, patch, "address.postalCode"),
        "phoneNumber" => replace_optional_string(&mut address.phone_number, patch, "address.phoneNumber"),
        other => Err(super::unsupported_field(other)),
    }
}

fn replace_string(slot: &mut String, patch: &Patch, what: &str) -> Result<(), PatchError> {
    let v = super::require_value(&patch.value, what)?
        .as_text()
        .ok_or_else(|| super::decode_error("expected a text string".into()))?
        .to_string();
    replace_only(slot, patch.op, v, what)
}

fn replace_optional_string(slot: &mut Option<String>, patch: &Patch, what: &'static str) -> Result<(), PatchError> {
    let value = match patch.op {
        OpString::Remove => None,
        _ => {
            let v = super::require_value(&patch.value, what)?
                .as_text()
                .ok_or_else(|| super::decode_error("expected a text string".into()))?
                .to_string();
            Some(v)
        }
    };
    option_mutate(slot, patch.op, value, what)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::ObjectId;

    fn sample_order(id: u64) -> Order {
        Order {
            id: ObjectId(id),
            state: OrderState::Open,
            items: vec![OrderedItem {
                listing_id: ObjectId(1),
                variation_ids: None,
                quantity: 2,
            }],
            invoice_address: None,
            shipping_address: None,
            canceled_at: None,
            chosen_payee: None,
            chosen_currency: None,
            payment_details: None,
            tx_details: None,
        }
    }

    #[test]
    fn quantity_increments_then_decrements() {
        let mut shop = Shop::new();
        shop.orders.insert(&ObjectId(1), &sample_order(1)).unwrap();

        let inc = Patch {
            op: OpString::Increment,
            path: crate::path::PatchPath::with_object_id(
                shop_types::ObjectType::Order,
                ObjectId(1),
                vec!["items".into(), "0".into(), "quantity".into()],
            ),
            value: Some(ciborium::value::Value::Integer(3.into())),
        };
        apply(&mut shop, &inc).unwrap();
        let order = shop.orders.get(&ObjectId(1)).unwrap().unwrap();
        assert_eq!(order.items[0].quantity, 5);

        let dec = Patch {
            op: OpString::Decrement,
            path: crate::path::PatchPath::with_object_id(
                shop_types::ObjectType::Order,
                ObjectId(1),
                vec!["items".into(), "0".into(), "quantity".into()],
            ),
            value: Some(ciborium::value::Value::Integer(2.into())),
        };
        apply(&mut shop, &dec).unwrap();
        let order = shop.orders.get(&ObjectId(1)).unwrap().unwrap();
        assert_eq!(order.items[0].quantity, 3);
    }

    #[test]
    fn payment_details_requires_chosen_currency() {
        let mut shop = Shop::new();
        shop.orders.insert(&ObjectId(1), &sample_order(1)).unwrap();

        let patch = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::with_object_id(
                shop_types::ObjectType::Order,
                ObjectId(1),
                vec!["paymentDetails".into()],
            ),
            value: Some(
                PaymentDetails {
                    payment_id: Default::default(),
                    total: shop_types::Uint256::from(10u64),
                    listing_hashes: vec![],
                    ttl: 60,
                    shop_signature: shop_types::Signature([0u8; 64]),
                }
                .to_value(),
            ),
        };
        let err = apply(&mut shop, &patch).unwrap_err();
        assert_eq!(err.to_string(), "validation failed: paymentDetails requires chosenCurrency to be set");
    }
}
