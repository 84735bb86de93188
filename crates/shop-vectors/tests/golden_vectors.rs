//! Golden test-vector generators for the concrete scenarios of spec §8.
//!
//! Each happy-path test builds a `before` shop, applies a `PatchSet` signed
//! by a fixed test signer, captures the `after` shop, and writes the
//! `VectorsOkay` artifact pair when `TEST_DATA_OUT` is set (spec §6.2). Each
//! error-scenario test captures the rejected patch and its literal error
//! substring into a `VectorsError` artifact.

use std::fs;

use shop_core::Shop;
use shop_patch::{Patch, PatchSet, PatchSetHeader, PatchPath, ShopPatchExt};
use shop_types::{
    ChainAddress, EthereumAddress, Listing, ListingMetadata, ListingViewState, ObjectId, ObjectType, OpString, Order,
    OrderState, OrderedItem, Payee,
};
use shop_vectors::config::test_data_out;
use shop_vectors::schema::{FailedPatch, NamedSnapshotPair, Snap, VectorsError, VectorsOkay};
use shop_vectors::Signer;

fn test_signer() -> Signer {
    Signer::from_secret_bytes([0x42; 32])
}

fn sample_payee(seed: u8) -> Payee {
    Payee {
        address: ChainAddress {
            chain_id: 1,
            address: EthereumAddress::repeat_byte(seed),
        },
        call_as_contract: false,
    }
}

fn header(shop: &Shop) -> PatchSetHeader {
    PatchSetHeader {
        key_card_nonce: 1,
        shop_id: shop.manifest.shop_id,
        timestamp: time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        root_hash_before: Some(shop.snapshot_hash()),
    }
}

/// Builds a `VectorsOkay` artifact out of one named transition and writes it
/// to `TEST_DATA_OUT` (if set) under `subject`.
fn emit_okay(subject: &str, before: Shop, patches: Vec<Patch>, after: Shop) {
    let signer = test_signer();
    let before_snap = Snap::capture("before", &before);
    let after_snap = Snap::capture("after", &after);
    let patch_set = PatchSet {
        header: header(&before),
        patches,
    };
    let signature = signer.sign(&patch_set.to_bytes_canonical());

    let vector = VectorsOkay {
        signer_address: signer.address(),
        signer_secret: signer.secret_bytes(),
        snapshots: vec![NamedSnapshotPair {
            name: subject,
            before: before_snap,
            after: after_snap,
        }],
        patch_set,
        signature,
    };

    if let Some(dir) = test_data_out() {
        fs::create_dir_all(&dir).expect("TEST_DATA_OUT is writable");
        fs::write(dir.join(format!("vectors_patch_{subject}.cbor")), vector.to_cbor()).expect("cbor artifact writes");
        fs::write(dir.join(format!("vectors_patch_{subject}.json")), vector.to_json_pretty())
            .expect("json artifact writes");
    }
}

fn emit_error(subject: &str, before: &Shop, patch: Patch, error: String) {
    let vector = VectorsError {
        patches: vec![FailedPatch {
            name: subject,
            patch,
            before: Snap::capture("before", before),
            error,
        }],
    };
    if let Some(dir) = test_data_out() {
        fs::create_dir_all(&dir).expect("TEST_DATA_OUT is writable");
        fs::write(dir.join(format!("vectors_patch_{subject}.json")), vector.to_json_pretty())
            .expect("json artifact writes");
    }
}

#[test]
fn scenario_a_empty_shop_encoding() {
    let shop = Shop::new();
    let bytes = shop.to_bytes_canonical();
    assert_eq!(&bytes[..9], [0xA6, 0x64, b'T', b'a', b'g', b's', 0x82, 0x00, 0xF6]);
    emit_okay("empty_shop", Shop::new(), vec![], shop);
}

#[test]
fn scenario_b_manifest_payee_add_then_remove() {
    let mut before = Shop::new();
    before.manifest.payees.insert("default".into(), sample_payee(1));
    before.manifest.payees.insert("with-escrow".into(), sample_payee(2));

    let patches = vec![
        Patch {
            op: OpString::Add,
            path: PatchPath::manifest(vec!["payees".into(), "yet-another-payee".into()]),
            value: Some(shop_codec::schema::CanonicalCodec::to_value(&sample_payee(3))),
        },
        Patch {
            op: OpString::Remove,
            path: PatchPath::manifest(vec!["payees".into(), "with-escrow".into()]),
            value: None,
        },
    ];

    let mut after = before.clone();
    after.apply_all(&patches).unwrap();

    let mut keys: Vec<&String> = after.manifest.payees.keys().collect();
    keys.sort();
    assert_eq!(keys, vec![&"default".to_string(), &"yet-another-payee".to_string()]);

    emit_okay("manifest_payees", before, patches, after);
}

fn sample_listing(id: u64) -> Listing {
    Listing {
        id: ObjectId(id),
        price: shop_types::Uint256::from(100u64),
        metadata: ListingMetadata {
            title: "Widget".into(),
            description: "A widget".into(),
            images: vec!["first.png".into()],
        },
        view_state: ListingViewState::Published,
        options: Default::default(),
        stock_statuses: vec![],
    }
}

#[test]
fn scenario_c_listing_price_replace() {
    let mut before = Shop::new();
    before.listings.insert(&ObjectId(1), &sample_listing(1)).unwrap();

    let patches = vec![Patch {
        op: OpString::Replace,
        path: PatchPath::with_object_id(ObjectType::Listing, ObjectId(1), vec!["price".into()]),
        value: Some(shop_codec::wire::uint256_to_value(&shop_types::Uint256::from(250u64))),
    }];

    let mut after = before.clone();
    after.apply_all(&patches).unwrap();
    let listing = after.listings.get(&ObjectId(1)).unwrap().unwrap();
    assert_eq!(listing.price, shop_types::Uint256::from(250u64));

    emit_okay("price_replace", before, patches, after);
}

#[test]
fn scenario_d_listing_image_prepend() {
    let mut before = Shop::new();
    before.listings.insert(&ObjectId(1), &sample_listing(1)).unwrap();

    let patches = vec![Patch {
        op: OpString::Add,
        path: PatchPath::with_object_id(
            ObjectType::Listing,
            ObjectId(1),
            vec!["metadata".into(), "images".into(), "0".into()],
        ),
        value: Some(ciborium::value::Value::Text("hero.png".into())),
    }];

    let mut after = before.clone();
    after.apply_all(&patches).unwrap();
    let listing = after.listings.get(&ObjectId(1)).unwrap().unwrap();
    assert_eq!(listing.metadata.images, vec!["hero.png".to_string(), "first.png".to_string()]);

    emit_okay("image_prepend", before, patches, after);
}

#[test]
fn scenario_e_order_quantity_increment_then_decrement() {
    let mut before = Shop::new();
    before.orders.insert(
        &ObjectId(666),
        &Order {
            id: ObjectId(666),
            state: OrderState::Open,
            items: vec![OrderedItem {
                listing_id: ObjectId(1),
                variation_ids: None,
                quantity: 23,
            }],
            invoice_address: None,
            shipping_address: None,
            canceled_at: None,
            chosen_payee: None,
            chosen_currency: None,
            payment_details: None,
            tx_details: None,
        },
    )
    .unwrap();

    let patches = vec![
        Patch {
            op: OpString::Increment,
            path: PatchPath::with_object_id(ObjectType::Order, ObjectId(666), vec!["items".into(), "0".into(), "quantity".into()]),
            value: Some(ciborium::value::Value::Integer(10.into())),
        },
        Patch {
            op: OpString::Decrement,
            path: PatchPath::with_object_id(ObjectType::Order, ObjectId(666), vec!["items".into(), "0".into(), "quantity".into()]),
            value: Some(ciborium::value::Value::Integer(5.into())),
        },
    ];

    let mut after = before.clone();
    after.apply_all(&patches).unwrap();
    let order = after.orders.get(&ObjectId(666)).unwrap().unwrap();
    assert_eq!(order.items[0].quantity, 28);

    emit_okay("order_quantity", before, patches, after);
}

#[test]
fn scenario_f_inventory_variation_lifecycle() {
    let before = Shop::new();

    let patches = vec![
        Patch {
            op: OpString::Add,
            path: PatchPath::with_object_id(ObjectType::Inventory, ObjectId(9000), vec![]),
            value: Some(ciborium::value::Value::Integer(100.into())),
        },
        Patch {
            op: OpString::Add,
            path: PatchPath::with_object_id(ObjectType::Inventory, ObjectId(9000), vec!["r".into(), "xl".into()]),
            value: Some(ciborium::value::Value::Integer(23.into())),
        },
        Patch {
            op: OpString::Increment,
            path: PatchPath::with_object_id(ObjectType::Inventory, ObjectId(9000), vec!["b".into(), "m".into()]),
            value: Some(ciborium::value::Value::Integer(42.into())),
        },
    ];

    let mut after = before.clone();
    after.apply_all(&patches).unwrap();
    assert_eq!(
        after.inventory.get(&shop_types::CombinedKey::listing(ObjectId(9000))).unwrap(),
        Some(100)
    );
    assert_eq!(
        after
            .inventory
            .get(&shop_types::CombinedKey::variation(ObjectId(9000), vec!["b".into(), "m".into()]))
            .unwrap(),
        Some(42)
    );

    emit_okay("inventory_variations", before, patches, after);
}

#[test]
fn scenario_h_removing_nonexistent_payee() {
    let before = Shop::new();
    let patch = Patch {
        op: OpString::Remove,
        path: PatchPath::manifest(vec!["payees".into(), "nonexistent".into()]),
        value: None,
    };
    let err = before.clone().apply(&patch).unwrap_err();
    assert!(err.to_string().contains("payee not found: nonexistent"));
    emit_error("missing_payee", &before, patch, err.to_string());
}

#[test]
fn scenario_i_accepted_currency_index_out_of_bounds() {
    let mut before = Shop::new();
    before.manifest.accepted_currencies = vec![
        ChainAddress { chain_id: 1, address: EthereumAddress::repeat_byte(1) },
        ChainAddress { chain_id: 1, address: EthereumAddress::repeat_byte(2) },
    ];
    let patch = Patch {
        op: OpString::Replace,
        path: PatchPath::manifest(vec!["acceptedCurrencies".into(), "999".into()]),
        value: Some(shop_codec::wire::chain_address_to_value(&ChainAddress {
            chain_id: 1,
            address: EthereumAddress::repeat_byte(3),
        })),
    };
    let err = before.clone().apply(&patch).unwrap_err();
    assert!(err.to_string().contains("index out of bounds: 999"));
    emit_error("accepted_currency_oob", &before, patch, err.to_string());
}

#[test]
fn scenario_j_increment_manifest_payees_is_unsupported() {
    let before = Shop::new();
    let patch = Patch {
        op: OpString::Increment,
        path: PatchPath::manifest(vec!["payees".into()]),
        value: None,
    };
    let err = before.clone().apply(&patch).unwrap_err();
    assert!(err.to_string().contains("unsupported op: increment"));
    emit_error("increment_payees_root", &before, patch, err.to_string());
}

#[test]
fn scenario_g_missing_metadata_field_on_listing_decode() {
    use ciborium::value::{Integer, Value};

    let bad_listing = Value::Map(vec![
        (Value::Text("ID".into()), Value::Integer(Integer::from(1))),
        (Value::Text("Price".into()), Value::Integer(Integer::from(100))),
        (
            Value::Text("ViewState".into()),
            shop_codec::wire::listing_view_state_to_value(shop_types::ListingViewState::Published),
        ),
        (Value::Text("Options".into()), Value::Map(vec![])),
        (Value::Text("StockStatuses".into()), Value::Array(vec![])),
    ]);
    let err = <shop_types::Listing as shop_codec::schema::CanonicalCodec>::from_value(&bad_listing).unwrap_err();
    assert!(err.to_string().contains("missing required field Metadata"));
}
