// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Chain addresses of the form `P-fuji1...`.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};

use crate::as_human_readable_str;
use crate::error::Error;
use crate::ids::ShortId;

pub const P_CHAIN_ALIAS: &str = "P";
pub const X_CHAIN_ALIAS: &str = "X";

const ADDRESS_SEP: char = '-';

/// The bech32 human readable part used for `network_id`.
pub fn hrp_for_network(network_id: u32) -> &'static str {
    match network_id {
        1 => "avax",
        2 => "cascade",
        3 => "denali",
        4 => "everest",
        5 => "fuji",
        10 => "testing",
        12345 => "local",
        _ => "custom",
    }
}

/// A bech32 address bound to a chain alias.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ChainAddress {
    chain: String,
    hrp: String,
    id: ShortId,
}

as_human_readable_str!(ChainAddress);

impl ChainAddress {
    pub fn new(chain: &str, hrp: &str, id: ShortId) -> Self {
        Self {
            chain: chain.to_string(),
            hrp: hrp.to_string(),
            id,
        }
    }

    pub fn p_chain(network_id: u32, id: ShortId) -> Self {
        Self::new(P_CHAIN_ALIAS, hrp_for_network(network_id), id)
    }

    pub fn x_chain(network_id: u32, id: ShortId) -> Self {
        Self::new(X_CHAIN_ALIAS, hrp_for_network(network_id), id)
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    pub fn short_id(&self) -> ShortId {
        self.id
    }

    /// Parses `s` and checks that it was encoded for `network_id`.
    pub fn parse_for_network(s: &str, network_id: u32) -> Result<Self, Error> {
        let addr = Self::from_str(s)?;
        let expected = hrp_for_network(network_id);
        if addr.hrp != expected {
            return Err(Error::InvalidAddress(
                s.to_string(),
                format!("expected hrp {expected}, found {}", addr.hrp),
            ));
        }
        Ok(addr)
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hrp = Hrp::parse(&self.hrp).map_err(|_| fmt::Error)?;
        let encoded =
            bech32::encode::<Bech32>(hrp, self.id.as_bytes()).map_err(|_| fmt::Error)?;
        if self.chain.is_empty() {
            write!(f, "{encoded}")
        } else {
            write!(f, "{}{ADDRESS_SEP}{encoded}", self.chain)
        }
    }
}

impl FromStr for ChainAddress {
    type Err = Error;

    /// Accepts both `P-fuji1...` and the bare bech32 part.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain, encoded) = match s.split_once(ADDRESS_SEP) {
            Some((chain, encoded)) => (chain, encoded),
            None => ("", s),
        };
        let (hrp, data) = bech32::decode(encoded)
            .map_err(|e| Error::InvalidAddress(s.to_string(), e.to_string()))?;
        let id = ShortId::from_slice(&data)
            .map_err(|e| Error::InvalidAddress(s.to_string(), e.to_string()))?;
        Ok(Self {
            chain: chain.to_string(),
            hrp: hrp.to_string(),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hrp() {
        assert_eq!(hrp_for_network(1), "avax");
        assert_eq!(hrp_for_network(5), "fuji");
        assert_eq!(hrp_for_network(1337), "custom");
    }

    #[test]
    fn test_parse_and_display() {
        let id = ShortId::new([9u8; 20]);
        let addr = ChainAddress::p_chain(5, id);
        let s = addr.to_string();
        assert!(s.starts_with("P-fuji1"));

        let parsed = ChainAddress::from_str(&s).unwrap();
        assert_eq!(parsed, addr);
        assert_eq!(parsed.short_id(), id);

        let bare = ChainAddress::from_str(s.trim_start_matches("P-")).unwrap();
        assert_eq!(bare.chain(), "");
        assert_eq!(bare.short_id(), id);
    }

    #[test]
    fn test_wrong_network() {
        let addr = ChainAddress::p_chain(1, ShortId::new([3u8; 20])).to_string();
        assert!(ChainAddress::parse_for_network(&addr, 1).is_ok());
        assert!(ChainAddress::parse_for_network(&addr, 5).is_err());
    }

    #[test]
    fn test_invalid_address() {
        assert!(ChainAddress::from_str("P-fuji1notanaddress").is_err());
    }
}
