//! Enumerations shared by the wire format and the patch path model (spec §3.2).

use crate::error::CodecError;

/// Lifecycle state of a [`crate::listing::Listing`]. Encoded with application
/// tag `1000` wrapping the integer value (spec §4.2 rule 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ListingViewState {
    #[default]
    Unspecified = 0,
    Published = 1,
    Deleted = 2,
}

impl ListingViewState {
    /// Codec tag applied when encoding this enum (spec §4.2 rule 5).
    pub const CBOR_TAG: u64 = 1000;
}

impl TryFrom<u32> for ListingViewState {
    type Error = CodecError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Published),
            2 => Ok(Self::Deleted),
            other => Err(CodecError::InvalidEnum {
                value: other as i64,
            }),
        }
    }
}

/// Lifecycle state of an [`crate::order::Order`]. `spec.md` §9 leaves
/// transition validation unspecified; the engine accepts any `replace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum OrderState {
    #[default]
    Unspecified = 0,
    Open = 1,
    Canceled = 2,
    Committed = 3,
    Unpaid = 4,
    Paid = 5,
}

impl TryFrom<u32> for OrderState {
    type Error = CodecError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unspecified),
            1 => Ok(Self::Open),
            2 => Ok(Self::Canceled),
            3 => Ok(Self::Committed),
            4 => Ok(Self::Unpaid),
            5 => Ok(Self::Paid),
            other => Err(CodecError::InvalidEnum {
                value: other as i64,
            }),
        }
    }
}

/// The mutation kind carried by a [`crate::ObjectType`]-scoped patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpString {
    Add,
    Replace,
    Remove,
    Increment,
    Decrement,
}

impl OpString {
    /// The wire representation of this op, as used in `PatchPath` decode
    /// errors and the `OpString` JSON/CBOR tag itself.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
            Self::Increment => "increment",
            Self::Decrement => "decrement",
        }
    }
}

impl std::str::FromStr for OpString {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "replace" => Ok(Self::Replace),
            "remove" => Ok(Self::Remove),
            "increment" => Ok(Self::Increment),
            "decrement" => Ok(Self::Decrement),
            other => Err(CodecError::Decode {
                inner: format!("unknown op: {other}"),
            }),
        }
    }
}

/// The top-level discriminator for a patch path (spec §4.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Manifest,
    Listing,
    Order,
    Tag,
    Account,
    Inventory,
}

impl ObjectType {
    /// The wire representation of this object type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::Listing => "listing",
            Self::Order => "order",
            Self::Tag => "tag",
            Self::Account => "account",
            Self::Inventory => "inventory",
        }
    }

    /// Whether paths of this object type carry a discriminating id as their
    /// second wire element (spec §4.3.1).
    pub fn has_discriminator(&self) -> bool {
        !matches!(self, Self::Manifest)
    }
}

impl std::str::FromStr for ObjectType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manifest" => Ok(Self::Manifest),
            "listing" => Ok(Self::Listing),
            "order" => Ok(Self::Order),
            "tag" => Ok(Self::Tag),
            "account" => Ok(Self::Account),
            "inventory" => Ok(Self::Inventory),
            other => Err(CodecError::Decode {
                inner: format!("unknown object type: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_view_state_rejects_out_of_range() {
        assert!(ListingViewState::try_from(7).is_err());
    }

    #[test]
    fn op_string_round_trips_through_str() {
        for op in [
            OpString::Add,
            OpString::Replace,
            OpString::Remove,
            OpString::Increment,
            OpString::Decrement,
        ] {
            let parsed: OpString = op.as_str().parse().unwrap();
            assert_eq!(parsed.as_str(), op.as_str());
        }
    }
}
