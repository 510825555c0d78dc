// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Network model: which avalanche network a command targets and how to reach it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use url::Url;

use crate::address::hrp_for_network;
use crate::error::Error;
use crate::ids::Id;

pub const MAINNET_ID: u32 = 1;
pub const FUJI_ID: u32 = 5;
pub const LOCAL_NETWORK_ID: u32 = 1337;

pub const MAINNET_API_ENDPOINT: &str = "https://api.avax.network";
pub const FUJI_API_ENDPOINT: &str = "https://api.avax-test.network";
pub const LOCAL_API_ENDPOINT: &str = "http://127.0.0.1:9650";

/// The kind of network. The display form is the key used in the sidecar maps.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    #[strum(serialize = "Local Network")]
    Local,
    #[strum(serialize = "Devnet")]
    Devnet,
    #[strum(serialize = "Fuji")]
    Fuji,
    #[strum(serialize = "Mainnet")]
    Mainnet,
}

impl NetworkKind {
    pub fn is_public(&self) -> bool {
        matches!(self, NetworkKind::Fuji | NetworkKind::Mainnet)
    }
}

/// A concrete network: its kind, numeric id and API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    kind: NetworkKind,
    id: u32,
    endpoint: Url,
}

impl Network {
    pub fn new(kind: NetworkKind, id: u32, endpoint: Url) -> Self {
        Self { kind, id, endpoint }
    }

    pub fn mainnet() -> Self {
        Self::with_default_endpoint(NetworkKind::Mainnet, MAINNET_ID, MAINNET_API_ENDPOINT)
    }

    pub fn fuji() -> Self {
        Self::with_default_endpoint(NetworkKind::Fuji, FUJI_ID, FUJI_API_ENDPOINT)
    }

    pub fn local() -> Self {
        Self::with_default_endpoint(NetworkKind::Local, LOCAL_NETWORK_ID, LOCAL_API_ENDPOINT)
    }

    pub fn devnet(id: u32, endpoint: Url) -> Self {
        Self::new(NetworkKind::Devnet, id, endpoint)
    }

    /// The default network of a kind. Devnets have no default endpoint.
    pub fn from_kind(kind: NetworkKind) -> Result<Self, Error> {
        match kind {
            NetworkKind::Mainnet => Ok(Self::mainnet()),
            NetworkKind::Fuji => Ok(Self::fuji()),
            NetworkKind::Local => Ok(Self::local()),
            NetworkKind::Devnet => Err(Error::UnknownNetwork(
                "devnet requires an explicit endpoint".to_string(),
            )),
        }
    }

    fn with_default_endpoint(kind: NetworkKind, id: u32, endpoint: &str) -> Self {
        let endpoint = Url::parse(endpoint).expect("default endpoints are valid urls");
        Self::new(kind, id, endpoint)
    }

    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The name used as key in the sidecar maps.
    pub fn name(&self) -> String {
        self.kind.to_string()
    }

    pub fn hrp(&self) -> &'static str {
        hrp_for_network(self.id)
    }

    pub fn info_url(&self) -> String {
        self.api_url("ext/info")
    }

    pub fn p_chain_url(&self) -> String {
        self.api_url("ext/bc/P")
    }

    pub fn x_chain_url(&self) -> String {
        self.api_url("ext/bc/X")
    }

    /// The RPC url of a deployed blockchain.
    pub fn blockchain_rpc_url(&self, blockchain_id: &Id) -> String {
        self.api_url(&format!("ext/bc/{blockchain_id}/rpc"))
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint.as_str().trim_end_matches('/'))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.endpoint)
    }
}

/// Parses the user facing names accepted on the command line.
pub fn parse_network_kind(s: &str) -> Result<NetworkKind, Error> {
    match s.to_lowercase().as_str() {
        "local" | "local network" => Ok(NetworkKind::Local),
        "devnet" => Ok(NetworkKind::Devnet),
        "fuji" | "testnet" => Ok(NetworkKind::Fuji),
        "mainnet" => Ok(NetworkKind::Mainnet),
        _ => NetworkKind::from_str(s).map_err(|_| Error::UnknownNetwork(s.to_string())),
    }
}
