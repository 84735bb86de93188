//! Patch path model and wire decoding (spec §4.3.1).
//!
//! On the wire a path is a heterogeneous array: `[type, discriminator?,
//! field...]`. The discriminator is present iff
//! [`ObjectType::has_discriminator`] says so, and its shape depends on the
//! declared type (`object_id` for `listing|order|inventory`, `account_id`
//! for `account`, `tag_name` for `tag`).

use std::str::FromStr;

use ciborium::value::Value;

use shop_codec::wire::{value_to_address, value_to_object_id};
use shop_types::{EthereumAddress, ObjectId, ObjectType};

use crate::error::PatchError;

/// The discriminating id selected by a path's [`ObjectType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discriminator {
    /// `manifest` paths have no discriminator.
    None,
    /// `listing|order|inventory` paths discriminate by [`ObjectId`].
    ObjectId(ObjectId),
    /// `account` paths discriminate by on-chain address.
    Account(EthereumAddress),
    /// `tag` paths discriminate by name.
    TagName(String),
}

/// A decoded, typed patch path (spec §4.3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPath {
    /// Which top-level collection (or the manifest singleton) this path
    /// targets.
    pub object_type: ObjectType,
    /// The discriminating id within that collection, if any.
    pub discriminator: Discriminator,
    /// Field/index tokens remaining after the discriminator, outermost
    /// first.
    pub fields: Vec<String>,
}

impl PatchPath {
    /// Builds a manifest path (no discriminator).
    pub fn manifest(fields: Vec<String>) -> Self {
        Self {
            object_type: ObjectType::Manifest,
            discriminator: Discriminator::None,
            fields,
        }
    }

    /// Builds a path discriminated by [`ObjectId`] (`listing`, `order`, or
    /// `inventory`).
    pub fn with_object_id(object_type: ObjectType, id: ObjectId, fields: Vec<String>) -> Self {
        Self {
            object_type,
            discriminator: Discriminator::ObjectId(id),
            fields,
        }
    }

    /// Builds an `account` path.
    pub fn account(address: EthereumAddress, fields: Vec<String>) -> Self {
        Self {
            object_type: ObjectType::Account,
            discriminator: Discriminator::Account(address),
            fields,
        }
    }

    /// Builds a `tag` path.
    pub fn tag(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            object_type: ObjectType::Tag,
            discriminator: Discriminator::TagName(name.into()),
            fields,
        }
    }

    /// Returns the path's [`ObjectId`] discriminator, or `InvalidPath` if
    /// this path's type does not carry one.
    pub fn object_id(&self) -> Result<ObjectId, PatchError> {
        match self.discriminator {
            Discriminator::ObjectId(id) => Ok(id),
            _ => Err(PatchError::InvalidPath {
                reason: format!("{} path requires an object id discriminator", self.object_type.as_str()),
            }),
        }
    }

    /// Returns the path's account address discriminator, or `InvalidPath`.
    pub fn account_id(&self) -> Result<EthereumAddress, PatchError> {
        match self.discriminator {
            Discriminator::Account(addr) => Ok(addr),
            _ => Err(PatchError::InvalidPath {
                reason: "account path requires an account id discriminator".into(),
            }),
        }
    }

    /// Returns the path's tag-name discriminator, or `InvalidPath`.
    pub fn tag_name(&self) -> Result<&str, PatchError> {
        match &self.discriminator {
            Discriminator::TagName(name) => Ok(name.as_str()),
            _ => Err(PatchError::InvalidPath {
                reason: "tag path requires a tag name discriminator".into(),
            }),
        }
    }

    /// Decodes a path from its wire array form.
    pub fn from_value(value: &Value) -> Result<Self, PatchError> {
        let arr = value.as_array().ok_or_else(|| PatchError::InvalidPath {
            reason: "path is not an array".into(),
        })?;
        let head = arr.first().ok_or_else(|| PatchError::InvalidPath {
            reason: "path is empty".into(),
        })?;
        let type_str = head.as_text().ok_or_else(|| PatchError::InvalidPath {
            reason: "path's first element is not a string".into(),
        })?;
        let object_type = ObjectType::from_str(type_str).map_err(|_| PatchError::InvalidPath {
            reason: format!("unknown object type: {type_str}"),
        })?;

        let (discriminator, rest) = if object_type.has_discriminator() {
            let disc_value = arr.get(1).ok_or_else(|| PatchError::InvalidPath {
                reason: format!("{type_str} path is missing its discriminator"),
            })?;
            let discriminator = match object_type {
                ObjectType::Listing | ObjectType::Order | ObjectType::Inventory => {
                    Discriminator::ObjectId(value_to_object_id(disc_value).map_err(|e| PatchError::InvalidPath {
                        reason: format!("bad object id discriminator: {e}"),
                    })?)
                }
                ObjectType::Account => {
                    Discriminator::Account(value_to_address(disc_value).map_err(|e| PatchError::InvalidPath {
                        reason: format!("bad account discriminator: {e}"),
                    })?)
                }
                ObjectType::Tag => {
                    let name = disc_value.as_text().ok_or_else(|| PatchError::InvalidPath {
                        reason: "tag discriminator is not a string".into(),
                    })?;
                    Discriminator::TagName(name.to_string())
                }
                ObjectType::Manifest => unreachable!("manifest has no discriminator"),
            };
            (discriminator, &arr[2..])
        } else {
            (Discriminator::None, &arr[1..])
        };

        let fields = rest
            .iter()
            .map(|v| {
                v.as_text().map(str::to_string).ok_or_else(|| PatchError::InvalidPath {
                    reason: "path field token is not a string".into(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            object_type,
            discriminator,
            fields,
        })
    }

    /// Encodes this path back to its wire array form (used when a
    /// `PatchSet` is canonically re-encoded for signing).
    pub fn to_value(&self) -> Value {
        let mut out = vec![Value::Text(self.object_type.as_str().to_string())];
        match &self.discriminator {
            Discriminator::None => {}
            Discriminator::ObjectId(id) => out.push(shop_codec::wire::object_id_to_value(*id)),
            Discriminator::Account(addr) => out.push(shop_codec::wire::address_to_value(addr)),
            Discriminator::TagName(name) => out.push(Value::Text(name.clone())),
        }
        out.extend(self.fields.iter().map(|f| Value::Text(f.clone())));
        Value::Array(out)
    }
}

/// Parses an array index token: a decimal index, or the `"-"` append
/// sentinel (spec §4.3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayIndex {
    /// An explicit in-bounds-or-not index.
    At(usize),
    /// The `"-"` append sentinel, valid only for `add`.
    Append,
}

impl ArrayIndex {
    /// Parses a path token as an array index.
    pub fn parse(token: &str) -> Result<Self, PatchError> {
        if token == "-" {
            return Ok(Self::Append);
        }
        token
            .parse::<usize>()
            .map(Self::At)
            .map_err(|_| PatchError::IndexParse { token: token.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_path_has_no_discriminator() {
        let value = Value::Array(vec![Value::Text("manifest".into()), Value::Text("pricingCurrency".into())]);
        let path = PatchPath::from_value(&value).unwrap();
        assert_eq!(path.object_type, ObjectType::Manifest);
        assert_eq!(path.discriminator, Discriminator::None);
        assert_eq!(path.fields, vec!["pricingCurrency".to_string()]);
    }

    #[test]
    fn listing_path_requires_object_id_discriminator() {
        let value = Value::Array(vec![Value::Text("listing".into())]);
        let err = PatchPath::from_value(&value).unwrap_err();
        assert!(matches!(err, PatchError::InvalidPath { .. }));
    }

    #[test]
    fn array_index_parses_append_sentinel() {
        assert_eq!(ArrayIndex::parse("-").unwrap(), ArrayIndex::Append);
        assert_eq!(ArrayIndex::parse("3").unwrap(), ArrayIndex::At(3));
        assert!(matches!(ArrayIndex::parse("x"), Err(PatchError::IndexParse { .. })));
    }
}
