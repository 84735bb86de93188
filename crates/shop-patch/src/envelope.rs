//! The patch envelope, patch-set header, and patch set (spec §4.3.1, §4.4).

use ciborium::value::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use shop_codec::schema::{canonical_map, value_to_u64, CanonicalCodec, DecodedMap};
use shop_types::error::CodecError;
use shop_types::{OpString, Uint256};

use crate::error::PatchError;
use crate::path::PatchPath;

/// One `(op, path, value?)` mutation (spec glossary).
#[derive(Debug, Clone)]
pub struct Patch {
    /// The kind of mutation to apply.
    pub op: OpString,
    /// The typed location within the shop object graph.
    pub path: PatchPath,
    /// The payload for `add`/`replace`/`increment`/`decrement`; absent for
    /// `remove`.
    pub value: Option<Value>,
}

impl Patch {
    /// Decodes a patch from its three-element wire array.
    pub fn from_value(value: &Value) -> Result<Self, PatchError> {
        let arr = value.as_array().ok_or_else(|| PatchError::InvalidPath {
            reason: "patch is not an array".into(),
        })?;
        if arr.len() < 2 || arr.len() > 3 {
            return Err(PatchError::InvalidPath {
                reason: "patch array must have 2 or 3 elements".into(),
            });
        }
        let op_str = arr[0].as_text().ok_or_else(|| PatchError::InvalidPath {
            reason: "patch op is not a string".into(),
        })?;
        let op: OpString = op_str.parse().map_err(|_: CodecError| PatchError::InvalidPath {
            reason: format!("unknown op: {op_str}"),
        })?;
        let path = PatchPath::from_value(&arr[1])?;
        let value = arr.get(2).cloned();
        Ok(Self { op, path, value })
    }

    /// Encodes this patch back to its wire array form.
    pub fn to_value(&self) -> Value {
        let mut out = vec![Value::Text(self.op.as_str().to_string()), self.path.to_value()];
        if let Some(v) = &self.value {
            out.push(v.clone());
        }
        Value::Array(out)
    }
}

/// Identifies the shop and signer context a [`PatchSet`] was generated
/// against (spec §4.3.1, §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSetHeader {
    /// The signer's key-card usage counter at time of signing, preventing
    /// replay.
    pub key_card_nonce: u64,
    /// The shop this patch set targets.
    pub shop_id: Uint256,
    /// When this patch set was produced.
    pub timestamp: OffsetDateTime,
    /// The shop's state-root hash immediately before these patches, if the
    /// signer chose to pin one.
    pub root_hash_before: Option<[u8; 32]>,
}

impl CanonicalCodec for PatchSetHeader {
    fn to_value(&self) -> Value {
        let mut entries = vec![
            ("KeyCardNonce", shop_codec::schema::u64_to_value(self.key_card_nonce)),
            ("ShopID", shop_codec::wire::uint256_to_value(&self.shop_id)),
            (
                "Timestamp",
                Value::Text(
                    self.timestamp
                        .format(&Rfc3339)
                        .expect("RFC3339 formatting cannot fail for valid timestamps"),
                ),
            ),
        ];
        if let Some(root) = &self.root_hash_before {
            entries.push(("RootHashBefore", Value::Bytes(root.to_vec())));
        }
        canonical_map(entries)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let map = DecodedMap::new(value)?;
        let key_card_nonce = value_to_u64(map.require("KeyCardNonce")?)?;
        let shop_id = shop_codec::wire::value_to_uint256(map.require("ShopID")?)?;
        let timestamp_text = map.require("Timestamp")?.as_text().ok_or_else(|| CodecError::Decode {
            inner: "expected an RFC3339 timestamp string".into(),
        })?;
        let timestamp = OffsetDateTime::parse(timestamp_text, &Rfc3339).map_err(|e| CodecError::Decode {
            inner: format!("invalid RFC3339 timestamp: {e}"),
        })?;
        let root_hash_before = map
            .optional("RootHashBefore")
            .map(|v| {
                let bytes = v.as_bytes().ok_or_else(|| CodecError::Decode {
                    inner: "expected bytes".into(),
                })?;
                <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| CodecError::BytesTooShort {
                    want: 32,
                    got: bytes.len(),
                })
            })
            .transpose()?;
        Ok(Self {
            key_card_nonce,
            shop_id,
            timestamp,
            root_hash_before,
        })
    }
}

/// An ordered sequence of patches plus a header, the unit of signing
/// (spec §4.4, glossary).
#[derive(Debug, Clone)]
pub struct PatchSet {
    /// Identifying metadata for this batch of mutations.
    pub header: PatchSetHeader,
    /// The patches, applied in array order (spec §5).
    pub patches: Vec<Patch>,
}

impl PatchSet {
    /// Decodes a patch set from its `{header, patches}` wire map.
    pub fn from_value(value: &Value) -> Result<Self, PatchError> {
        let map = DecodedMap::new(value).map_err(PatchError::from)?;
        let header = PatchSetHeader::from_value(map.require("Header")?).map_err(PatchError::from)?;
        let patches = map
            .require("Patches")?
            .as_array()
            .ok_or_else(|| PatchError::InvalidPath {
                reason: "patches is not an array".into(),
            })?
            .iter()
            .map(Patch::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { header, patches })
    }

    /// Encodes this patch set's canonical form — what a signer signs
    /// (spec §4.4).
    pub fn to_value(&self) -> Value {
        canonical_map(vec![
            ("Header", self.header.to_value()),
            ("Patches", Value::Array(self.patches.iter().map(Patch::to_value).collect())),
        ])
    }

    /// Canonically encodes this patch set to bytes.
    pub fn to_bytes_canonical(&self) -> Vec<u8> {
        let value = self.to_value();
        let mut out = Vec::new();
        ciborium::into_writer(&value, &mut out).expect("canonical Value trees always encode");
        out
    }
}
