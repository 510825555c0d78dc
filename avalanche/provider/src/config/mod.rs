// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Provides a simple way of reading configuration files.
//!
//! Reads a TOML config file for the avalanche tooling and deserializes it in a type-safe way
//! into a [`Config`] struct.

pub mod deserialize;
pub mod network;
pub mod serialize;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use avalanche_api::network::{Network, NetworkKind};
use deserialize::deserialize_networks_from_vec;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use serialize::serialize_networks_to_vec;

pub use network::NetworkConfig;

pub const DEFAULT_BASE_DIR: &str = "~/.avalanche-cli";
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(5);

/// The config written by `config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"
base_dir = "~/.avalanche-cli"
keystore_path = "~/.avalanche-cli/key"

[elastic]
step_delay_secs = 5

# Endpoint override template - uncomment and adjust before using
# [[networks]]
# kind = "fuji"
# endpoint = "https://api.avax-test.network"

# Devnets always need an explicit endpoint and network id
# [[networks]]
# kind = "devnet"
# network_id = 1338
# endpoint = "http://<NODE_IP>:9650"
"#;

/// The top-level struct representing the config. Calls to [`Config::from_file`] deserialize into
/// this struct.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the subnet sidecars, genesis files and custom VMs.
    pub base_dir: Option<String>,
    /// Directory of the keystore that wants to be made available by the provider.
    pub keystore_path: Option<String>,
    #[serde(deserialize_with = "deserialize_networks_from_vec", default)]
    #[serde(serialize_with = "serialize_networks_to_vec")]
    pub networks: BTreeMap<NetworkKind, NetworkConfig>,
    #[serde(default)]
    pub elastic: ElasticSettings,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ElasticSettings {
    /// Pause after each issued step of an elastic transformation.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "step_delay_secs")]
    pub step_delay: Duration,
}

impl Default for ElasticSettings {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
        }
    }
}

impl Config {
    /// Returns an empty config to be populated further
    pub fn new() -> Self {
        Config {
            base_dir: None,
            keystore_path: None,
            networks: Default::default(),
            elastic: Default::default(),
        }
    }

    /// Reads a TOML configuration in the `s` string and returns a [`Config`] struct.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config = toml::from_str(s)?;
        Ok(config)
    }

    /// Reads a TOML configuration file specified in the `path` and returns a [`Config`] struct.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(&path).with_context(|| {
            format!(
                "failed to read config from {}",
                path.as_ref().to_string_lossy()
            )
        })?;

        let config: Config =
            Config::from_toml_str(contents.as_str()).context("failed to parse config TOML")?;

        Ok(config)
    }

    /// Like [`Config::from_file`] but a missing file yields the defaults.
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if !path.as_ref().exists() {
            log::debug!(
                "config file {} not found, using defaults",
                path.as_ref().to_string_lossy()
            );
            return Ok(Self::new());
        }
        Self::from_file(path)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string(self)?;
        fs::write(path, content.into_bytes())?;
        Ok(())
    }

    pub fn add_network(&mut self, network: NetworkConfig) {
        self.networks.insert(network.kind, network);
    }

    pub fn base_dir(&self) -> &str {
        self.base_dir.as_deref().unwrap_or(DEFAULT_BASE_DIR)
    }

    /// Resolves the network of `kind`, applying any endpoint override of the config.
    pub fn network(&self, kind: NetworkKind) -> Result<Network> {
        match (self.networks.get(&kind), kind) {
            (Some(c), NetworkKind::Devnet) => {
                let id = c
                    .network_id
                    .ok_or_else(|| anyhow!("devnet config requires a network_id"))?;
                Ok(Network::devnet(id, c.endpoint.clone()))
            }
            (Some(c), _) => {
                let default = Network::from_kind(kind)?;
                Ok(Network::new(
                    kind,
                    c.network_id.unwrap_or(default.id()),
                    c.endpoint.clone(),
                ))
            }
            (None, NetworkKind::Devnet) => Err(anyhow!(
                "no devnet endpoint configured, add a [[networks]] entry of kind devnet or use --endpoint"
            )),
            (None, _) => Ok(Network::from_kind(kind)?),
        }
    }

    pub fn request_timeout(&self, kind: NetworkKind) -> Option<Duration> {
        self.networks.get(&kind).and_then(|c| c.request_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
