//! Canonical encodings for `shop-types` primitives (spec §4.2, §3.1, §3.2).

use ciborium::value::{Integer, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use shop_types::error::CodecError;
use shop_types::{ChainAddress, EthereumAddress, Hash, ListingViewState, ObjectId, PublicKey, Signature, Uint256};

use crate::schema::{value_to_bytes, value_to_u64};

/// Encodes a `Uint256` in its shortest form: a native integer when it fits
/// in `u64`, otherwise a CBOR bignum (tag 2) over its minimal big-endian
/// representation (spec §4.2 rule 2).
pub fn uint256_to_value(v: &Uint256) -> Value {
    if let Ok(small) = u64::try_from(*v) {
        Value::Integer(Integer::from(small))
    } else {
        let be: [u8; 32] = v.to_be_bytes();
        let first_nonzero = be.iter().position(|b| *b != 0).unwrap_or(31);
        Value::Tag(2, Box::new(Value::Bytes(be[first_nonzero..].to_vec())))
    }
}

/// Decodes a `Uint256` from either its native-integer or bignum-tagged form.
pub fn value_to_uint256(value: &Value) -> Result<Uint256, CodecError> {
    match value {
        Value::Integer(_) => Ok(Uint256::from(value_to_u64(value)?)),
        Value::Tag(2, inner) => {
            let bytes = value_to_bytes(inner)?;
            Ok(Uint256::from_be_slice(&bytes))
        }
        _ => Err(CodecError::Decode {
            inner: "expected an integer or bignum".into(),
        }),
    }
}

/// Encodes an `ObjectId` as a native integer.
pub fn object_id_to_value(id: ObjectId) -> Value {
    Value::Integer(Integer::from(id.0))
}

/// Decodes an `ObjectId` from a native integer.
pub fn value_to_object_id(value: &Value) -> Result<ObjectId, CodecError> {
    Ok(ObjectId(value_to_u64(value)?))
}

fn fixed_bytes_to_value(bytes: &[u8]) -> Value {
    Value::Bytes(bytes.to_vec())
}

fn value_to_fixed_bytes(value: &Value, want: usize) -> Result<Vec<u8>, CodecError> {
    let bytes = value_to_bytes(value)?;
    if bytes.len() != want {
        return Err(CodecError::BytesTooShort {
            want,
            got: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Encodes a 20-byte Ethereum address.
pub fn address_to_value(addr: &EthereumAddress) -> Value {
    fixed_bytes_to_value(addr.as_slice())
}

/// Decodes a 20-byte Ethereum address, rejecting any other length.
pub fn value_to_address(value: &Value) -> Result<EthereumAddress, CodecError> {
    let bytes = value_to_fixed_bytes(value, 20)?;
    Ok(EthereumAddress::from_slice(&bytes))
}

/// Encodes a 32-byte hash.
pub fn hash_to_value(hash: &Hash) -> Value {
    fixed_bytes_to_value(hash.as_slice())
}

/// Decodes a 32-byte hash, rejecting any other length.
pub fn value_to_hash(value: &Value) -> Result<Hash, CodecError> {
    let bytes = value_to_fixed_bytes(value, 32)?;
    Ok(Hash::from_slice(&bytes))
}

/// Encodes a 32-byte public key.
pub fn public_key_to_value(key: &PublicKey) -> Value {
    fixed_bytes_to_value(key.as_bytes().as_slice())
}

/// Decodes a 32-byte public key, rejecting any other length.
pub fn value_to_public_key(value: &Value) -> Result<PublicKey, CodecError> {
    let bytes = value_to_bytes(value)?;
    PublicKey::try_from(bytes.as_slice())
}

/// Encodes a 64-byte signature.
pub fn signature_to_value(sig: &Signature) -> Value {
    fixed_bytes_to_value(sig.as_bytes().as_slice())
}

/// Decodes a 64-byte signature, rejecting any other length.
pub fn value_to_signature(value: &Value) -> Result<Signature, CodecError> {
    let bytes = value_to_bytes(value)?;
    Signature::try_from(bytes.as_slice())
}

/// Encodes a `ChainAddress` as a two-field canonical map.
pub fn chain_address_to_value(addr: &ChainAddress) -> Value {
    crate::schema::canonical_map(vec![
        ("ChainID", Value::Integer(Integer::from(addr.chain_id))),
        ("Address", address_to_value(&addr.address)),
    ])
}

/// Decodes a `ChainAddress`, enforcing both fields are present.
pub fn value_to_chain_address(value: &Value) -> Result<ChainAddress, CodecError> {
    let map = crate::schema::DecodedMap::new(value)?;
    let chain_id = value_to_u64(map.require("ChainID")?)?;
    let address = value_to_address(map.require("Address")?)?;
    Ok(ChainAddress { chain_id, address })
}

/// Encodes a `ListingViewState`, wrapped in application tag `1000`
/// (spec §4.2 rule 5).
pub fn listing_view_state_to_value(state: ListingViewState) -> Value {
    Value::Tag(
        ListingViewState::CBOR_TAG,
        Box::new(Value::Integer(Integer::from(state as u32))),
    )
}

/// Decodes a `ListingViewState`, requiring tag `1000` to be present.
pub fn value_to_listing_view_state(value: &Value) -> Result<ListingViewState, CodecError> {
    match value {
        Value::Tag(tag, inner) if *tag == ListingViewState::CBOR_TAG => {
            let raw = value_to_u64(inner)?;
            ListingViewState::try_from(u32::try_from(raw).map_err(|_| CodecError::InvalidEnum {
                value: raw as i64,
            })?)
        }
        _ => Err(CodecError::Decode {
            inner: "expected tag 1000 wrapping ListingViewState".into(),
        }),
    }
}

/// Encodes an `OffsetDateTime` as an RFC3339 string (spec §4.2 rule 3).
pub fn timestamp_to_value(ts: &OffsetDateTime) -> Value {
    Value::Text(ts.format(&Rfc3339).expect("RFC3339 formatting cannot fail for valid timestamps"))
}

/// Decodes an RFC3339 string into an `OffsetDateTime`.
pub fn value_to_timestamp(value: &Value) -> Result<OffsetDateTime, CodecError> {
    let text = value.as_text().ok_or_else(|| CodecError::Decode {
        inner: "expected an RFC3339 timestamp string".into(),
    })?;
    OffsetDateTime::parse(text, &Rfc3339).map_err(|e| CodecError::Decode {
        inner: format!("invalid RFC3339 timestamp: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint256_small_values_encode_as_native_int() {
        let v = Uint256::from(42u64);
        let value = uint256_to_value(&v);
        assert!(matches!(value, Value::Integer(_)));
        assert_eq!(value_to_uint256(&value).unwrap(), v);
    }

    #[test]
    fn uint256_large_values_round_trip_via_bignum_tag() {
        let v = Uint256::MAX;
        let value = uint256_to_value(&v);
        assert!(matches!(value, Value::Tag(2, _)));
        assert_eq!(value_to_uint256(&value).unwrap(), v);
    }

    #[test]
    fn listing_view_state_requires_tag() {
        let untagged = Value::Integer(Integer::from(1));
        assert!(value_to_listing_view_state(&untagged).is_err());
        let tagged = listing_view_state_to_value(ListingViewState::Published);
        assert_eq!(
            value_to_listing_view_state(&tagged).unwrap(),
            ListingViewState::Published
        );
    }
}
