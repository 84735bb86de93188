//! Post-patch structural validation (spec §4.3.6).
//!
//! An explicit dependency of the engine rather than a global singleton
//! (spec §9 REDESIGN FLAGS: "Global mutable validator singleton... make the
//! validator an explicit dependency of the engine").

use shop_types::{Account, Listing, Manifest, Order, Tag};

use crate::error::PatchError;

fn non_blank(s: &str, what: &'static str) -> Result<(), PatchError> {
    if s.trim().is_empty() {
        return Err(PatchError::ValidationFailed {
            detail: format!("{what} must not be blank"),
        });
    }
    Ok(())
}

/// Validates a [`Manifest`] after a patch has mutated it.
pub fn validate_manifest(manifest: &Manifest) -> Result<(), PatchError> {
    for key in manifest.payees.keys() {
        if key.is_empty() {
            return Err(PatchError::ValidationFailed {
                detail: "payee key must not be empty".into(),
            });
        }
    }
    for key in manifest.shipping_regions.keys() {
        if key.is_empty() {
            return Err(PatchError::ValidationFailed {
                detail: "shipping region key must not be empty".into(),
            });
        }
    }
    for (region_name, region) in &manifest.shipping_regions {
        for key in region.price_modifiers.keys() {
            if key.is_empty() {
                return Err(PatchError::ValidationFailed {
                    detail: format!("price modifier key in shipping region {region_name} must not be empty"),
                });
            }
        }
    }
    Ok(())
}

/// Validates a [`Listing`] after a patch has mutated it, including the
/// `ListingStockStatus`/`PriceModifier` one-of invariants (spec §3.4
/// invariants 3-4, enforced again here since a field-level mutation can
/// leave a half-built record that only the codec's decode path would
/// otherwise catch).
pub fn validate_listing(listing: &Listing) -> Result<(), PatchError> {
    non_blank(&listing.metadata.title, "listing title")?;
    for (key, option) in &listing.options {
        if key.is_empty() {
            return Err(PatchError::ValidationFailed {
                detail: "listing option key must not be empty".into(),
            });
        }
        for variation_key in option.variations.keys() {
            if variation_key.is_empty() {
                return Err(PatchError::ValidationFailed {
                    detail: format!("variation key in option {key} must not be empty"),
                });
            }
        }
    }
    for status in &listing.stock_statuses {
        if status.variation_ids.iter().any(|id| id.is_empty()) {
            return Err(PatchError::ValidationFailed {
                detail: "stock status variation id must not be empty".into(),
            });
        }
    }
    Ok(())
}

/// Validates an [`Order`] after a patch has mutated it, including the
/// `chosen_payee`/`chosen_currency`/`payment_details` presence chain
/// (spec §4.3.6: "any present -> the preceding one must also be present").
pub fn validate_order(order: &Order) -> Result<(), PatchError> {
    if order.payment_details.is_some() && order.chosen_currency.is_none() {
        return Err(PatchError::ValidationFailed {
            detail: "paymentDetails requires chosenCurrency to be set".into(),
        });
    }
    if order.chosen_currency.is_some() && order.chosen_payee.is_none() {
        return Err(PatchError::ValidationFailed {
            detail: "chosenCurrency requires chosenPayee to be set".into(),
        });
    }
    for item in &order.items {
        if let Some(variation_ids) = &item.variation_ids {
            if variation_ids.iter().any(|id| id.is_empty()) {
                return Err(PatchError::ValidationFailed {
                    detail: "ordered item variation id must not be empty".into(),
                });
            }
        }
    }
    Ok(())
}

/// Validates a [`Tag`] after a patch has mutated it.
pub fn validate_tag(tag: &Tag) -> Result<(), PatchError> {
    non_blank(&tag.name, "tag name")
}

/// Validates an [`Account`] after a patch has mutated it. Accounts have no
/// cross-field invariants today; this exists so every object type runs
/// through the same post-patch validation step uniformly.
pub fn validate_account(_account: &Account) -> Result<(), PatchError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::{ChainAddress, EthereumAddress, OrderState, OrderedItem, PaymentDetails, Uint256};

    #[test]
    fn order_requires_chosen_currency_before_payment_details() {
        let mut order = Order {
            id: shop_types::ObjectId(1),
            state: OrderState::Open,
            items: vec![],
            invoice_address: None,
            shipping_address: None,
            canceled_at: None,
            chosen_payee: Some(ChainAddress {
                chain_id: 1,
                address: EthereumAddress::ZERO,
            }),
            chosen_currency: None,
            payment_details: Some(PaymentDetails {
                payment_id: Default::default(),
                total: Uint256::from(1u64),
                listing_hashes: vec![],
                ttl: 0,
                shop_signature: shop_types::Signature([0u8; 64]),
            }),
            tx_details: None,
        };
        assert!(validate_order(&order).is_err());
        order.chosen_currency = order.chosen_payee;
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn order_item_variation_ids_must_not_be_blank() {
        let order = Order {
            id: shop_types::ObjectId(1),
            state: OrderState::Open,
            items: vec![OrderedItem {
                listing_id: shop_types::ObjectId(1),
                variation_ids: Some(vec![String::new()]),
                quantity: 1,
            }],
            invoice_address: None,
            shipping_address: None,
            canceled_at: None,
            chosen_payee: None,
            chosen_currency: None,
            payment_details: None,
            tx_details: None,
        };
        assert!(validate_order(&order).is_err());
    }
}
