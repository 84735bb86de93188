//! Declarative map building/decoding helpers (spec §9 REDESIGN FLAGS:
//! "reflection-driven required-field derivation" becomes "per-entity
//! metadata... attached at definition time" here, expressed as a small set
//! of combinators rather than a derive macro).

use std::collections::HashMap;

use ciborium::value::{Integer, Value};
use shop_types::error::CodecError;

/// Any type with a canonical CBOR representation.
pub trait CanonicalCodec: Sized {
    /// Builds this value's canonical `Value` tree.
    fn to_value(&self) -> Value;
    /// Parses this value from a `Value` tree, validating required fields
    /// and enum ranges along the way.
    fn from_value(value: &Value) -> Result<Self, CodecError>;
}

/// Serializes `v` to canonical CBOR bytes.
pub fn to_bytes_canonical<T: CanonicalCodec>(v: &T) -> Vec<u8> {
    let value = v.to_value();
    let mut out = Vec::new();
    ciborium::into_writer(&value, &mut out).expect("canonical Value trees always encode");
    out
}

/// Parses canonical CBOR bytes into `T`.
pub fn from_bytes_canonical<T: CanonicalCodec>(bytes: &[u8]) -> Result<T, CodecError> {
    let value: Value = ciborium::from_reader(bytes).map_err(|e| CodecError::Decode {
        inner: e.to_string(),
    })?;
    T::from_value(&value)
}

/// Builds a canonical map from `(field, value)` pairs, ordering keys by
/// length then lexicographically (spec §4.2 rule 1). Callers omit entries
/// for absent optional fields themselves (spec §4.2 rule 6); every pair
/// passed here appears in the output.
pub fn canonical_map(mut entries: Vec<(&'static str, Value)>) -> Value {
    entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (Value::Text(k.to_string()), v))
            .collect(),
    )
}

/// A decoded map with required-field lookups, used to implement spec §4.2
/// rule 6: decode into a generic map first so "all required fields present"
/// can be validated before building the strongly-typed shape.
pub struct DecodedMap<'a> {
    fields: HashMap<&'a str, &'a Value>,
}

impl<'a> DecodedMap<'a> {
    /// Builds a field lookup from a decoded `Value::Map`.
    pub fn new(value: &'a Value) -> Result<Self, CodecError> {
        let map = value.as_map().ok_or_else(|| CodecError::Decode {
            inner: "expected a CBOR map".into(),
        })?;
        let mut fields = HashMap::with_capacity(map.len());
        for (k, v) in map {
            let key = k.as_text().ok_or_else(|| CodecError::Decode {
                inner: "map key is not a text string".into(),
            })?;
            fields.insert(key, v);
        }
        Ok(Self { fields })
    }

    /// Fetches a required field, or `RequiredFieldMissing` if absent.
    pub fn require(&self, field: &'static str) -> Result<&'a Value, CodecError> {
        self.fields
            .get(field)
            .copied()
            .ok_or(CodecError::RequiredFieldMissing { field })
    }

    /// Fetches an optional field.
    pub fn optional(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).copied()
    }
}

/// Converts a `u64` to its canonical integer `Value`.
pub fn u64_to_value(v: u64) -> Value {
    Value::Integer(Integer::from(v))
}

/// Converts a CBOR integer `Value` to `u64`.
pub fn value_to_u64(value: &Value) -> Result<u64, CodecError> {
    let int = value.as_integer().ok_or_else(|| CodecError::Decode {
        inner: "expected an integer".into(),
    })?;
    u64::try_from(int).map_err(|_| CodecError::Decode {
        inner: "integer out of u64 range".into(),
    })
}

/// Converts a `u32` to its canonical integer `Value`.
pub fn u32_to_value(v: u32) -> Value {
    Value::Integer(Integer::from(v))
}

/// Converts a CBOR integer `Value` to `u32`.
pub fn value_to_u32(value: &Value) -> Result<u32, CodecError> {
    let int = value.as_integer().ok_or_else(|| CodecError::Decode {
        inner: "expected an integer".into(),
    })?;
    u32::try_from(int).map_err(|_| CodecError::Decode {
        inner: "integer out of u32 range".into(),
    })
}

/// Converts a CBOR text `Value` to `String`.
pub fn value_to_string(value: &Value) -> Result<String, CodecError> {
    value
        .as_text()
        .map(|s| s.to_string())
        .ok_or_else(|| CodecError::Decode {
            inner: "expected a text string".into(),
        })
}

/// Converts a CBOR bytes `Value` to an owned `Vec<u8>`.
pub fn value_to_bytes(value: &Value) -> Result<Vec<u8>, CodecError> {
    value
        .as_bytes()
        .cloned()
        .ok_or_else(|| CodecError::Decode {
            inner: "expected a byte string".into(),
        })
}

/// `Inventory` stores bare `u64` stock counts rather than a structured
/// record, so `u64` gets its own top-level canonical encoding.
impl CanonicalCodec for u64 {
    fn to_value(&self) -> Value {
        u64_to_value(*self)
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        value_to_u64(value)
    }
}
