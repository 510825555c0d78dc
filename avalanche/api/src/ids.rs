// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Avalanche identifiers and their CB58 textual form.
//!
//! The CB58 form and hashing come from `avalanche_types`, the types here add the length
//! checks and serde forms the sidecar files need.

use std::fmt;
use std::str::FromStr;

use avalanche_types::{formatting, ids};

use crate::as_human_readable_str;
use crate::error::Error;

pub const ID_LEN: usize = 32;
pub const SHORT_ID_LEN: usize = 20;
pub const NODE_ID_PREFIX: &str = "NodeID-";

/// Returns the sha256 digest of `bytes`.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; ID_LEN];
    out.copy_from_slice(&ids::Id::sha256(bytes).to_vec());
    out
}

pub fn cb58_encode(bytes: &[u8]) -> String {
    formatting::encode_cb58_with_checksum_string(bytes)
}

pub fn cb58_decode(s: &str) -> Result<Vec<u8>, Error> {
    formatting::decode_cb58_with_checksum(s)
        .map_err(|e| Error::InvalidCb58(s.to_string(), e.to_string()))
}

macro_rules! fixed_id {
    ($(#[$meta:meta])* $name:ident, $len:expr, $avax:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
                let inner: [u8; $len] = bytes.try_into().map_err(|_| Error::InvalidLength {
                    expected: $len,
                    actual: bytes.len(),
                })?;
                Ok(Self(inner))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0 == [0u8; $len]
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for $avax {
            fn from(id: $name) -> Self {
                <$avax>::from_slice(&id.0)
            }
        }

        impl From<&$avax> for $name {
            fn from(id: &$avax) -> Self {
                let mut bytes = [0u8; $len];
                bytes.copy_from_slice(id.as_ref());
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", <$avax>::from(*self))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_slice(&cb58_decode(s)?)
            }
        }
    };
}

fixed_id!(
    /// A 32 byte identifier: transactions, subnets, blockchains, assets and VMs.
    Id,
    ID_LEN,
    ids::Id
);

fixed_id!(
    /// A 20 byte identifier, the raw form of an address.
    ShortId,
    SHORT_ID_LEN,
    ids::short::Id
);

as_human_readable_str!(Id);
as_human_readable_str!(ShortId);

impl Id {
    /// The all-zero id, also the blockchain id of the P-Chain.
    pub const EMPTY: Id = Id([0u8; ID_LEN]);

    /// The id of `bytes`, i.e. their sha256.
    pub fn of(bytes: &[u8]) -> Self {
        Id::from(&ids::Id::sha256(bytes))
    }
}

/// A node identifier rendered as `NodeID-<cb58>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(ShortId);

as_human_readable_str!(NodeId);

impl NodeId {
    pub fn new(id: ShortId) -> Self {
        Self(id)
    }

    pub fn short_id(&self) -> &ShortId {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NODE_ID_PREFIX}{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(NODE_ID_PREFIX)
            .ok_or_else(|| Error::InvalidNodeID(s.to_string()))?;
        Ok(Self(ShortId::from_str(raw)?))
    }
}

/// Computes the VM id of a VM name: the name bytes left aligned in a zeroed 32 byte id.
pub fn vm_id(name: &str) -> Result<Id, Error> {
    let bytes = name.as_bytes();
    if bytes.len() > ID_LEN {
        return Err(Error::VmNameTooLong(bytes.len()));
    }
    let mut id = [0u8; ID_LEN];
    id[..bytes.len()].copy_from_slice(bytes);
    Ok(Id(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_empty_id() {
        assert_eq!(Id::EMPTY.to_string(), "11111111111111111111111111111111LpoYY");
        assert_eq!(
            Id::from_str("11111111111111111111111111111111LpoYY").unwrap(),
            Id::EMPTY
        );
        assert!(Id::default().is_empty());
    }

    #[test]
    fn test_subnet_evm_vm_id() {
        let id = vm_id("subnetevm").unwrap();
        assert_eq!(
            id.to_string(),
            "srEXiWaHuhNyGwPUi444Tu47ZEDwxTWrbQiuD7FmgSAQ6X7Dy"
        );
    }

    #[test]
    fn test_vm_id_too_long() {
        let name = "a".repeat(33);
        assert_eq!(vm_id(&name), Err(Error::VmNameTooLong(33)));
        assert!(vm_id(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_bad_checksum() {
        let mut s = Id::of(b"hello").to_string();
        // flip the last character to break the checksum
        let last = s.pop().unwrap();
        s.push(if last == '1' { '2' } else { '1' });
        assert!(Id::from_str(&s).is_err());
    }

    #[test]
    fn test_wrong_length() {
        let short = ShortId::new([7u8; SHORT_ID_LEN]).to_string();
        assert_eq!(
            Id::from_str(&short),
            Err(Error::InvalidLength {
                expected: ID_LEN,
                actual: SHORT_ID_LEN
            })
        );
    }

    #[test]
    fn test_avalanche_types_interop() {
        let id = Id::of(b"subnet");
        let avax: ids::Id = id.into();
        assert_eq!(avax.to_string(), id.to_string());
        assert_eq!(Id::from(&avax), id);
        assert_eq!(avax, ids::Id::sha256(b"subnet".as_slice()));

        let short = ShortId::new([3u8; SHORT_ID_LEN]);
        assert_eq!(ShortId::from(&ids::short::Id::from(short)), short);
    }

    #[test]
    fn test_node_id() {
        let node = NodeId::new(ShortId::new([1u8; SHORT_ID_LEN]));
        let s = node.to_string();
        assert!(s.starts_with(NODE_ID_PREFIX));
        assert_eq!(NodeId::from_str(&s).unwrap(), node);
        assert!(NodeId::from_str(s.trim_start_matches(NODE_ID_PREFIX)).is_err());
    }

    #[test]
    fn test_json_string_form() {
        let id = Id::of(b"subnet");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[quickcheck]
    fn prop_short_id_textual_form(bytes: Vec<u8>) -> bool {
        let mut raw = [0u8; SHORT_ID_LEN];
        for (i, b) in bytes.iter().take(SHORT_ID_LEN).enumerate() {
            raw[i] = *b;
        }
        let id = ShortId::new(raw);
        ShortId::from_str(&id.to_string()).unwrap() == id
    }
}
