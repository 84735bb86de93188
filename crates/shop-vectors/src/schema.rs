//! The golden-vector artifact schema (spec §6.2).

use ciborium::value::Value;
use serde::Serialize;

use shop_codec::schema::{canonical_map, CanonicalCodec};
use shop_core::Shop;
use shop_patch::{Patch, PatchSet};
use shop_types::{EthereumAddress, Signature};

/// A named shop snapshot: its typed value plus the canonical bytes and hash
/// a vector consumer would recompute independently (spec §6.2 `Snap`).
pub struct Snap {
    /// Human-readable label for this snapshot within a vector (e.g.
    /// `"before"`/`"after"`).
    pub name: &'static str,
    /// The shop state itself.
    pub value: Shop,
    /// `value`'s canonical CBOR encoding.
    pub encoded: Vec<u8>,
    /// Keccak-256 over `encoded` (spec §6.2: "`hash` is Keccak-256 over
    /// `encoded`").
    pub hash: [u8; 32],
}

impl Snap {
    /// Captures a snapshot of `shop` under `name`.
    pub fn capture(name: &'static str, shop: &Shop) -> Self {
        Self {
            name,
            value: shop.clone(),
            encoded: shop.to_bytes_canonical(),
            hash: shop.snapshot_hash(),
        }
    }

    fn to_value(&self) -> Value {
        canonical_map(vec![
            ("value", self.value.to_value()),
            ("encoded", Value::Bytes(self.encoded.clone())),
            ("hash", Value::Bytes(self.hash.to_vec())),
        ])
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "encodedHex": hex::encode(&self.encoded),
            "hashHex": hex::encode(self.hash),
        })
    }
}

/// One `before -> after` transition produced by applying a patch (spec §6.2).
pub struct NamedSnapshotPair {
    /// The scenario letter/label this pair demonstrates.
    pub name: &'static str,
    /// Shop state before the patch set was applied.
    pub before: Snap,
    /// Shop state after.
    pub after: Snap,
}

/// A successful generator run's output (spec §6.2 `VectorsOkay`).
pub struct VectorsOkay {
    /// The signer whose key produced `signature`.
    pub signer_address: EthereumAddress,
    /// The signer's raw secret, recorded for vector reproducibility.
    pub signer_secret: [u8; 32],
    /// Before/after pairs for each scenario this vector covers.
    pub snapshots: Vec<NamedSnapshotPair>,
    /// The patch set applied to produce every `after` snapshot.
    pub patch_set: PatchSet,
    /// The signer's signature over `patch_set`'s canonical encoding.
    pub signature: Signature,
}

impl VectorsOkay {
    /// Encodes this vector's CBOR artifact (spec §6.2: `vectors_patch_<subject>.cbor`).
    pub fn to_cbor(&self) -> Vec<u8> {
        let value = canonical_map(vec![
            (
                "signer",
                canonical_map(vec![
                    ("address", shop_codec::wire::address_to_value(&self.signer_address)),
                    ("secret", Value::Bytes(self.signer_secret.to_vec())),
                ]),
            ),
            (
                "snapshots",
                Value::Array(
                    self.snapshots
                        .iter()
                        .map(|pair| {
                            canonical_map(vec![
                                ("name", Value::Text(pair.name.to_string())),
                                ("before", pair.before.to_value()),
                                ("after", pair.after.to_value()),
                            ])
                        })
                        .collect(),
                ),
            ),
            ("patch_set", self.patch_set.to_value()),
            ("signature", shop_codec::wire::signature_to_value(&self.signature)),
        ]);
        let mut out = Vec::new();
        ciborium::into_writer(&value, &mut out).expect("canonical Value trees always encode");
        out
    }

    /// Encodes this vector's JSON artifact (spec §6.2:
    /// `vectors_patch_<subject>.json`, "alongside JSON pretty-prints for
    /// human review" per spec §6.1).
    pub fn to_json_pretty(&self) -> String {
        #[derive(Serialize)]
        struct SignerJson {
            address: String,
            secret_hex: String,
        }
        #[derive(Serialize)]
        struct PairJson {
            name: &'static str,
            before: serde_json::Value,
            after: serde_json::Value,
        }
        let doc = serde_json::json!({
            "signer": SignerJson {
                address: format!("{:#x}", self.signer_address),
                secret_hex: hex::encode(self.signer_secret),
            },
            "snapshots": self.snapshots.iter().map(|pair| PairJson {
                name: pair.name,
                before: pair.before.to_json(),
                after: pair.after.to_json(),
            }).collect::<Vec<_>>(),
            "signatureHex": hex::encode(self.signature.as_bytes()),
        });
        serde_json::to_string_pretty(&doc).expect("json document is well-formed")
    }
}

/// One failing patch attempt recorded for an error-scenario vector (spec
/// §6.2 `VectorsError.patches[]`).
pub struct FailedPatch {
    /// The scenario letter/label.
    pub name: &'static str,
    /// The patch that was attempted.
    pub patch: Patch,
    /// The shop state the patch was attempted against.
    pub before: Snap,
    /// The error's `Display` text (spec §8: "each has a literal expected
    /// substring").
    pub error: String,
}

/// An error generator run's output (spec §6.2 `VectorsError`).
pub struct VectorsError {
    /// Every recorded failing attempt.
    pub patches: Vec<FailedPatch>,
}

fn patch_to_bytes(patch: &Patch) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::into_writer(&patch.to_value(), &mut out).expect("canonical Value trees always encode");
    out
}

impl VectorsError {
    /// Encodes this vector's JSON artifact.
    pub fn to_json_pretty(&self) -> String {
        let doc = serde_json::json!({
            "patches": self.patches.iter().map(|p| serde_json::json!({
                "name": p.name,
                "patch": hex::encode(patch_to_bytes(&p.patch)),
                "beforeHashHex": hex::encode(p.before.hash),
                "error": p.error,
            })).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&doc).expect("json document is well-formed")
    }
}
