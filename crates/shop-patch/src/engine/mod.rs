//! Per-object-type dispatch and field walkers (spec §4.3.2, §4.3.3).
//!
//! Each object type gets its own module with a flat `apply` entry point,
//! following spec §9's flattening of "deep nested closure-based patch
//! handlers" into "per-(object-type, field-path) dispatch tables". A shared
//! set of array/map mutation helpers lives here since every object type's
//! walker bottoms out in one of those two shapes (or a bare scalar).

mod account;
mod inventory;
mod listing;
mod manifest;
mod order;
mod tag;

use ciborium::value::Value;

use shop_codec::schema::CanonicalCodec;
use shop_types::error::CodecError;
use shop_types::{ObjectType, OpString};

use crate::envelope::Patch;
use crate::error::PatchError;
use crate::path::ArrayIndex;

/// Decodes a patch's `value` payload into `T`, or fails with a location-
/// tagged `InvalidPath` if the op required one and it was absent.
fn require_value<'a>(value: &'a Option<Value>, what: &str) -> Result<&'a Value, PatchError> {
    value.as_ref().ok_or_else(|| PatchError::InvalidPath {
        reason: format!("{what}: op requires a value"),
    })
}

fn decode<T: CanonicalCodec>(value: &Option<Value>, what: &str) -> Result<T, PatchError> {
    let v = require_value(value, what)?;
    T::from_value(v).map_err(PatchError::from)
}

fn unsupported_op(op: OpString, location: impl Into<String>) -> PatchError {
    PatchError::UnsupportedOp {
        op: op.as_str().to_string(),
        location: location.into(),
    }
}

fn unsupported_field(field: &str) -> PatchError {
    PatchError::UnsupportedField { field: field.to_string() }
}

/// Generic array mutation: `add`/`replace`/`remove` at an index or the `"-"`
/// append sentinel (spec §4.3.3 "Array `[T]`").
fn array_mutate<T>(arr: &mut Vec<T>, op: OpString, index: ArrayIndex, item: Option<T>) -> Result<(), PatchError> {
    match (op, index) {
        (OpString::Add, ArrayIndex::Append) => {
            arr.push(item.expect("decode already required a value for add"));
            Ok(())
        }
        (OpString::Add, ArrayIndex::At(k)) => {
            if k > arr.len() {
                return Err(PatchError::IndexOutOfBounds { idx: k });
            }
            arr.insert(k, item.expect("decode already required a value for add"));
            Ok(())
        }
        (OpString::Replace, ArrayIndex::At(k)) => {
            if k >= arr.len() {
                return Err(PatchError::IndexOutOfBounds { idx: k });
            }
            arr[k] = item.expect("decode already required a value for replace");
            Ok(())
        }
        (OpString::Remove, ArrayIndex::At(k)) => {
            if k >= arr.len() {
                return Err(PatchError::IndexOutOfBounds { idx: k });
            }
            arr.remove(k);
            Ok(())
        }
        (OpString::Replace, ArrayIndex::Append) | (OpString::Remove, ArrayIndex::Append) => {
            Err(PatchError::InvalidPath {
                reason: "the \"-\" append sentinel is only valid for add".into(),
            })
        }
        (other, _) => Err(unsupported_op(other, "array element")),
    }
}

/// Fetches a mutable reference to an array element for recursive field
/// navigation (e.g. `order.items[0].quantity`). The index must be in
/// bounds; `"-"` is not valid mid-path.
fn array_index_mut<T>(arr: &mut [T], index: ArrayIndex) -> Result<&mut T, PatchError> {
    match index {
        ArrayIndex::At(k) => arr.get_mut(k).ok_or(PatchError::IndexOutOfBounds { idx: k }),
        ArrayIndex::Append => Err(PatchError::InvalidPath {
            reason: "the \"-\" append sentinel cannot be used mid-path".into(),
        }),
    }
}

/// Applies `op` to an `Option<T>` scalar field in its entirety: `add`
/// requires absence, `replace`/`remove` require presence (spec §4.3.3
/// "Scalar field").
fn option_mutate<T>(slot: &mut Option<T>, op: OpString, value: Option<T>, what: &'static str) -> Result<(), PatchError> {
    match op {
        OpString::Add => {
            if slot.is_some() {
                return Err(PatchError::Duplicate {
                    kind: what,
                    key: String::new(),
                });
            }
            *slot = Some(value.expect("decode already required a value for add"));
            Ok(())
        }
        OpString::Replace => {
            if slot.is_none() {
                return Err(PatchError::NotFound {
                    kind: what,
                    key: String::new(),
                });
            }
            *slot = Some(value.expect("decode already required a value for replace"));
            Ok(())
        }
        OpString::Remove => {
            if slot.is_none() {
                return Err(PatchError::NotFound {
                    kind: what,
                    key: String::new(),
                });
            }
            *slot = None;
            Ok(())
        }
        other => Err(unsupported_op(other, what)),
    }
}

/// Applies `replace` only, the common case for a required scalar field.
fn replace_only<T>(slot: &mut T, op: OpString, value: T, what: &str) -> Result<(), PatchError> {
    match op {
        OpString::Replace => {
            *slot = value;
            Ok(())
        }
        other => Err(unsupported_op(other, what)),
    }
}

/// Saturating increment/decrement over a u32 scalar (spec §4.3.4).
fn arith_u32(slot: &mut u32, op: OpString, delta: u32) -> Result<(), PatchError> {
    match op {
        OpString::Increment => {
            *slot = slot.saturating_add(delta);
            Ok(())
        }
        OpString::Decrement => {
            *slot = slot.saturating_sub(delta);
            Ok(())
        }
        other => Err(unsupported_op(other, "arithmetic field")),
    }
}

/// Saturating increment/decrement over a u64 scalar, used by `inventory`.
fn arith_u64(slot: &mut u64, op: OpString, delta: u64) -> Result<(), PatchError> {
    match op {
        OpString::Increment => {
            *slot = slot.saturating_add(delta);
            Ok(())
        }
        OpString::Decrement => {
            *slot = slot.saturating_sub(delta);
            Ok(())
        }
        other => Err(unsupported_op(other, "arithmetic field")),
    }
}

/// Applies `op` to a `BTreeMap<String, V>`-shaped field, where `key` is the
/// next path token (spec §4.3.3 "Map `{string->T}`").
fn map_mutate<V>(
    map: &mut std::collections::BTreeMap<String, V>,
    op: OpString,
    key: &str,
    kind: &'static str,
    value: Option<V>,
) -> Result<(), PatchError> {
    match op {
        OpString::Add => {
            if map.contains_key(key) {
                return Err(PatchError::Duplicate {
                    kind,
                    key: key.to_string(),
                });
            }
            map.insert(key.to_string(), value.expect("decode already required a value for add"));
            Ok(())
        }
        OpString::Replace => {
            if !map.contains_key(key) {
                return Err(PatchError::NotFound {
                    kind,
                    key: key.to_string(),
                });
            }
            map.insert(key.to_string(), value.expect("decode already required a value for replace"));
            Ok(())
        }
        OpString::Remove => {
            if map.remove(key).is_none() {
                return Err(PatchError::NotFound {
                    kind,
                    key: key.to_string(),
                });
            }
            Ok(())
        }
        other => Err(unsupported_op(other, kind)),
    }
}

pub(crate) fn decode_error(inner: String) -> PatchError {
    PatchError::Codec(CodecError::Decode { inner })
}

/// Applies one patch to the shop. Dispatches on [`ObjectType`] to a focused
/// per-type handler (spec §4.3.2).
#[tracing::instrument(level = "debug", skip(shop, patch), fields(object_type = patch.path.object_type.as_str(), op = patch.op.as_str()))]
pub fn apply(shop: &mut shop_core::Shop, patch: &Patch) -> Result<(), PatchError> {
    let result = match patch.path.object_type {
        ObjectType::Manifest => manifest::apply(shop, patch),
        ObjectType::Listing => listing::apply(shop, patch),
        ObjectType::Order => order::apply(shop, patch),
        ObjectType::Tag => tag::apply(shop, patch),
        ObjectType::Account => account::apply(shop, patch),
        ObjectType::Inventory => inventory::apply(shop, patch),
    };
    match &result {
        Ok(()) => tracing::debug!("patch applied"),
        Err(e) => tracing::warn!(error = %e, "patch rejected"),
    }
    result
}
