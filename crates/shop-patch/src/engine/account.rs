//! Account field walker (spec §4.3.5 "Account").

use shop_core::Shop;
use shop_types::{Account, OpString};

use super::{array_mutate, decode, replace_only, unsupported_op};
use crate::envelope::Patch;
use crate::error::PatchError;
use crate::path::ArrayIndex;
use crate::validator::validate_account;

pub(super) fn apply(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let address = patch.path.account_id()?;
    if patch.path.fields.is_empty() {
        return apply_whole(shop, patch);
    }
    let mut account = shop.accounts.get(&address)?.ok_or_else(|| PatchError::NotFound {
        kind: "account",
        key: format!("{address:#x}"),
    })?;
    apply_fields(&mut account, patch)?;
    validate_account(&account)?;
    shop.accounts.insert(&address, &account)?;
    Ok(())
}

fn apply_whole(shop: &mut Shop, patch: &Patch) -> Result<(), PatchError> {
    let address = patch.path.account_id()?;
    match patch.op {
        OpString::Add => {
            if shop.accounts.get(&address)?.is_some() {
                return Err(PatchError::Duplicate {
                    kind: "account",
                    key: format!("{address:#x}"),
                });
            }
            let account = decode::<Account>(&patch.value, "account")?;
            validate_account(&account)?;
            shop.accounts.insert(&address, &account)?;
            Ok(())
        }
        OpString::Replace => {
            if shop.accounts.get(&address)?.is_none() {
                return Err(PatchError::NotFound {
                    kind: "account",
                    key: format!("{address:#x}"),
                });
            }
            let account = decode::<Account>(&patch.value, "account")?;
            validate_account(&account)?;
            shop.accounts.insert(&address, &account)?;
            Ok(())
        }
        OpString::Remove => {
            if !shop.accounts.delete(&address) {
                return Err(PatchError::NotFound {
                    kind: "account",
                    key: format!("{address:#x}"),
                });
            }
            Ok(())
        }
        other => Err(unsupported_op(other, "account")),
    }
}

fn apply_fields(account: &mut Account, patch: &Patch) -> Result<(), PatchError> {
    let fields = &patch.path.fields;
    match fields.first().map(String::as_str) {
        Some("keyCards") => apply_key_cards(account, patch, &fields[1..]),
        Some("guest") => {
            let v = super::require_value(&patch.value, "account.guest")?
                .as_bool()
                .ok_or_else(|| super::decode_error("expected a bool".into()))?;
            replace_only(&mut account.guest, patch.op, v, "account.guest")
        }
        Some(other) => Err(super::unsupported_field(other)),
        None => unreachable!("whole-account ops are handled by apply_whole"),
    }
}

fn apply_key_cards(account: &mut Account, patch: &Patch, fields: &[String]) -> Result<(), PatchError> {
    let index_token = fields.first().ok_or_else(|| PatchError::InvalidPath {
        reason: "keyCards requires an index".into(),
    })?;
    if fields.len() > 1 {
        return Err(PatchError::InvalidPath {
            reason: "keyCards elements have no sub-fields".into(),
        });
    }
    let index = ArrayIndex::parse(index_token)?;
    let item = match patch.op {
        OpString::Remove => None,
        _ => {
            let v = super::require_value(&patch.value, "keyCards element")?;
            Some(shop_codec::wire::value_to_public_key(v).map_err(PatchError::from)?)
        }
    };
    array_mutate(&mut account.key_cards, patch.op, index, item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::{EthereumAddress, PublicKey};

    fn sample_account() -> Account {
        Account {
            key_cards: vec![PublicKey([1u8; 32])],
            guest: false,
        }
    }

    #[test]
    fn guest_flag_is_replaceable() {
        let mut shop = Shop::new();
        let addr = EthereumAddress::repeat_byte(0xAB);
        shop.accounts.insert(&addr, &sample_account()).unwrap();

        let patch = Patch {
            op: OpString::Replace,
            path: crate::path::PatchPath::account(addr, vec!["guest".into()]),
            value: Some(ciborium::value::Value::Bool(true)),
        };
        apply(&mut shop, &patch).unwrap();
        assert!(shop.accounts.get(&addr).unwrap().unwrap().guest);
    }

    #[test]
    fn key_card_append_grows_the_list() {
        let mut shop = Shop::new();
        let addr = EthereumAddress::repeat_byte(0xCD);
        shop.accounts.insert(&addr, &sample_account()).unwrap();

        let patch = Patch {
            op: OpString::Add,
            path: crate::path::PatchPath::account(addr, vec!["keyCards".into(), "-".into()]),
            value: Some(shop_codec::wire::public_key_to_value(&PublicKey([2u8; 32]))),
        };
        apply(&mut shop, &patch).unwrap();
        let account = shop.accounts.get(&addr).unwrap().unwrap();
        assert_eq!(account.key_cards.len(), 2);
        assert_eq!(account.key_cards[1], PublicKey([2u8; 32]));
    }

    #[test]
    fn removing_an_unknown_account_reports_its_address() {
        let mut shop = Shop::new();
        let addr = EthereumAddress::repeat_byte(0xEF);
        let patch = Patch {
            op: OpString::Remove,
            path: crate::path::PatchPath::account(addr, vec![]),
            value: None,
        };
        assert!(matches!(apply(&mut shop, &patch), Err(PatchError::NotFound { kind: "account", .. })));
    }
}
