//! Manifest field walker (spec §4.3.5 "Manifest").

use shop_codec::schema::CanonicalCodec;
use shop_codec::wire::{value_to_chain_address, value_to_uint256};
use shop_core::Shop;
use shop_types::{ChainAddress, Payee, PriceModifier, ShippingRegion};

use super::{decode, map_mutate, replace_only, unsupported_op};
use crate::envelope::Patch;
use crate::error::PatchError;
use crate::validator::validate_manifest;

pub(super) fn apply(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let mut manifest = shop.manifest.clone();
    apply_fields(&mut manifest, patch)?;
    validate_manifest(&manifest)?;
    shop.manifest = manifest;
    Ok(())
}

fn apply_fields(manifest: &mut shop_types::Manifest, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.first().map(String::as_str) {
        None => {
            let decoded = decode(&patch.value, "manifest")?;
            replace_only(manifest, patch.op, decoded, "manifest")
        }
        Some("shopId") => {
            let v = super::require_value(&patch.value, "manifest.shopId")?;
            let decoded = value_to_uint256(v).map_err(PatchError::from)?;
            replace_only(&mut manifest.shop_id, patch.op, decoded, "manifest.shopId")
        }
        Some("pricingCurrency") => {
            let v: ChainAddress = decode_chain_address(patch, "manifest.pricingCurrency")?;
            replace_only(&mut manifest.pricing_currency, patch.op, v, "manifest.pricingCurrency")
        }
        Some("acceptedCurrencies") => apply_accepted_currencies(manifest, patch, &fields[1..]),
        Some("payees") => apply_payees(manifest, patch),
        Some("shippingRegions") => apply_shipping_regions(manifest, patch),
        Some(other) => Err(super::unsupported_field(other)),
    }
}

fn decode_chain_address(patch: &Patch, what: &str) -> Result<ChainAddress, PatchError> {
    let v = super::require_value(&patch.value, what)?;
    value_to_chain_address(v).map_err(PatchError::from)
}

fn apply_accepted_currencies(manifest: &mut shop_types::Manifest, patch: &Patch, rest: &[String]) -> Result<(), PatchError> {
    let index_token = rest.first().ok_or_else(|| PatchError::InvalidPath {
        reason: "acceptedCurrencies requires an index".into(),
    })?;
    if rest.len() > 1 {
        return Err(PatchError::InvalidPath {
            reason: "acceptedCurrencies has no sub-fields".into(),
        });
    }
    let index = crate::path::ArrayIndex::parse(index_token)?;
    let item = match patch.op {
        shop_types::OpString::Remove => None,
        _ => Some(decode_chain_address(patch, "acceptedCurrencies element")?),
    };
    super::array_mutate(&mut manifest.accepted_currencies, patch.op, index, item)
}

fn apply_payees(manifest: &mut shop_types::Manifest, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.get(1) {
        None => match patch.op {
            shop_types::OpString::Add | shop_types::OpString::Replace | shop_types::OpString::Remove => {
                Err(PatchError::InvalidPath {
                    reason: "payees: specify key".into(),
                })
            }
            other => Err(unsupported_op(other, "manifest.payees")),
        },
        Some(key) => {
            if fields.len() == 2 {
                let value = match patch.op {
                    shop_types::OpString::Remove => None,
                    _ => Some(decode::<Payee>(&patch.value, "payees element")?),
                };
                map_mutate(&mut manifest.payees, patch.op, key, "payee", value)
            } else {
                let payee = manifest.payees.get_mut(key).ok_or_else(|| PatchError::NotFound {
                    kind: "payee",
                    key: key.clone(),
                })?;
                apply_payee_subfield(payee, patch, &fields[2..])
            }
        }
    }
}

fn apply_payee_subfield(payee: &mut Payee, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    match fields.first().map(String::as_str) {
        Some("address") => {
            let v = decode_chain_address(patch, "payee.address")?;
            replace_only(&mut payee.address, patch.op, v, "payee.address")
        }
        Some("callAsContract") => {
            let v = super::require_value(&patch.value, "payee.callAsContract")?
                .as_bool()
                .ok_or_else(|| super::decode_error("expected a bool".into()))?;
            replace_only(&mut payee.call_as_contract, patch.op, v, "payee.callAsContract")
        }
        Some(other) => Err(super::unsupported_field(other)),
        None => Err(PatchError::InvalidPath {
            reason: "payee requires a sub-field".into(),
        }),
    }
}

fn apply_shipping_regions(manifest: &mut shop_types::Manifest, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.get(1) {
        None => match patch.op {
            shop_types::OpString::Add | shop_types::OpString::Replace | shop_types::OpString::Remove => {
                Err(PatchError::InvalidPath {
                    reason: "shippingRegions: specify key".into(),
                })
            }
            other => Err(unsupported_op(other, "manifest.shippingRegions")),
        },
        Some(key) => {
            if fields.len() == 2 {
                let value = match patch.op {
                    shop_types::OpString::Remove => None,
                    _ => Some(decode::<ShippingRegion>(&patch.value, "shippingRegions element")?),
                };
                map_mutate(&mut manifest.shipping_regions, patch.op, key, "shipping-region", value)
            } else {
                let region = manifest
                    .shipping_regions
                    .get_mut(key)
                    .ok_or_else(|| PatchError::NotFound {
                        kind: "shipping-region",
                        key: key.clone(),
                    })?;
                apply_shipping_region_subfield(region, patch, &fields[2..])
            }
        }
    }
}

fn apply_shipping_region_subfield(
    region: &mut ShippingRegion,
    patch: &Patch,
    fields: &[String],
) -> Result<(), PatchError> {
    match fields.first().map(String::as_str) {
        Some("country") => replace_string(&mut region.country, patch, "shippingRegion.country"),
        Some("postcode") => replace_string(&mut region.postcode, patch, "shippingRegion.postcode"),
        Some("city") => replace_string(&mut region.city, patch, "shippingRegion.city"),
        Some("priceModifiers") => apply_price_modifiers(region, patch, &fields[1..]),
        Some(other) => Err(super::unsupported_field(other)),
        None => Err(PatchError::InvalidPath {
            reason: "shippingRegion requires a sub-field".into(),
        }),
    }
}

fn replace_string(slot: &mut String, patch: &Patch, what: &str) -> Result<(), PatchError> {
    let v = super::require_value(&patch.value, what)?
        .as_text()
        .ok_or_else(|| super::decode_error("expected a text string".into()))?
        .to_string();
    replace_only(slot, patch.op, v, what)
}

fn apply_price_modifiers(region: &mut ShippingRegion, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    match fields.first() {
        None => Err(PatchError::InvalidPath {
            reason: "priceModifiers: specify key".into(),
        }),
        Some(key) => {
            let value = match patch.op {
                shop_types::OpString::Remove => None,
                _ => Some(decode::<PriceModifier>(&patch.value, "priceModifiers element")?),
            };
            map_mutate(&mut region.price_modifiers, patch.op, key, "price-modifier", value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::{EthereumAddress, OpString};

    fn sample_payee() -> Payee {
        Payee {
            address: ChainAddress {
                chain_id: 1,
                address: EthereumAddress::repeat_byte(0x01),
            },
            call_as_contract: false,
        }
    }

    #[test]
    fn payee_add_then_remove_leaves_one_entry() {
        let mut shop = Shop::new();
        shop.manifest.payees.insert("default".into(), sample_payee());
        shop.manifest.payees.insert("with-escrow".into(), sample_payee());

        let add = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::manifest(vec!["payees".into(), "yet-another-payee".into()]),
            value: Some(sample_payee().to_value()),
        };
        apply(&mut shop, &add).unwrap();

        let remove = Patch {
            op: OpString::Remove,
            path: crate::path::PatchPath::manifest(vec!["payees".into(), "with-escrow".into()]),
            value: None,
        };
        apply(&mut shop, &remove).unwrap();

        let mut keys: Vec<&String> = shop.manifest.payees.keys().collect();
        keys.sort();
        assert_eq!(keys, vec![&"default".to_string(), &"yet-another-payee".to_string()]);
    }

    #[test]
    fn removing_nonexistent_payee_reports_its_key() {
        let mut shop = Shop::new();
        let remove = Patch {
            op: OpString::Remove,
            path: crate::path::PatchPath::manifest(vec!["payees".into(), "nonexistent".into()]),
            value: None,
        };
        let err = apply(&mut shop, &remove).unwrap_err();
        assert_eq!(err.to_string(), "payee not found: nonexistent");
    }

    #[test]
    fn incrementing_payees_root_is_unsupported() {
        let mut shop = Shop::new();
        let patch = Patch {
            op: OpString::Increment,
            path: crate::path::PatchPath::manifest(vec!["payees".into()]),
            value: None,
        };
        let err = apply(&mut shop, &patch).unwrap_err();
        assert_eq!(err.to_string(), "unsupported op: increment at manifest.payees");
    }
}
