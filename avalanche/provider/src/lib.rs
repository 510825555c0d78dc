// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Avalanche subnet sdk: the subnet store, the node client and the flows that deploy and manage
//! subnets.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context};
use avalanche_api::address::ChainAddress;
use avalanche_api::network::{Network, NetworkKind};
use avalanche_wallet::{KeyStore, Keychain, PersistentKeyStore, SoftKey};
use config::Config;
use manager::{LocalDeployer, PublicDeployer, SubnetDeployer};
use node::{AvalancheNodeClient, NodeClient};
use store::SubnetStore;

pub mod config;
pub mod deploy;
pub mod elastic;
pub mod export;
pub mod join;
pub mod jsonrpc;
pub mod manager;
pub mod multisig;
pub mod node;
pub mod publish;
pub mod store;
pub mod subnet;
#[cfg(test)]
pub(crate) mod testing;
pub mod transaction;
pub mod validators;

const DEFAULT_REPO_PATH: &str = ".avalanche-cli";
const DEFAULT_CONFIG_NAME: &str = "config.toml";
const DEFAULT_KEYSTORE_DIR: &str = "~/.avalanche-cli/key";

#[derive(Clone)]
pub struct AvalancheProvider {
    config: Arc<Config>,
    keystore: Arc<RwLock<PersistentKeyStore>>,
}

impl AvalancheProvider {
    fn new(config: Arc<Config>, keystore: Arc<RwLock<PersistentKeyStore>>) -> Self {
        Self { config, keystore }
    }

    /// Initializes an `AvalancheProvider` from the config at `config_path`. A missing config
    /// file yields the defaults.
    pub fn new_from_config(config_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Arc::new(Config::from_file_or_default(expand_tilde(config_path))?);
        let keystore = Arc::new(RwLock::new(new_keystore_from_config(&config)?));
        Ok(Self::new(config, keystore))
    }

    /// Initializes an `AvalancheProvider` using the default config path.
    pub fn new_default() -> anyhow::Result<Self> {
        Self::new_from_config(default_config_path())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> SubnetStore {
        SubnetStore::new(expand_tilde(self.config.base_dir()))
    }

    pub fn network(&self, kind: NetworkKind) -> anyhow::Result<Network> {
        self.config.network(kind)
    }

    pub fn node_client(&self, network: &Network) -> anyhow::Result<Arc<dyn NodeClient>> {
        let timeout = self.config.request_timeout(network.kind());
        Ok(Arc::new(AvalancheNodeClient::new(network, timeout)?))
    }

    /// The deployer of `network`. Local deployments pay with the ewoq key, the others with the
    /// given keychain.
    pub fn deployer(
        &self,
        network: &Network,
        node: Arc<dyn NodeClient>,
        keychain: Keychain,
    ) -> anyhow::Result<Box<dyn SubnetDeployer>> {
        match network.kind() {
            NetworkKind::Local => Ok(Box::new(LocalDeployer::with_network(network.clone(), node)?)),
            _ => Ok(Box::new(PublicDeployer::new(network.clone(), node, keychain))),
        }
    }

    /// The keychain holding the stored key `name`.
    pub fn keychain(&self, name: &str) -> anyhow::Result<Keychain> {
        Ok(Keychain::new([self.get_key(name)?]))
    }

    pub fn get_key(&self, name: &str) -> anyhow::Result<SoftKey> {
        let keystore = self.keystore.read().map_err(|_| anyhow!("key store lock poisoned"))?;
        let info = keystore
            .get(name)?
            .ok_or_else(|| anyhow!("key {name:?} not found"))?;
        SoftKey::try_from(&info)
    }

    /// Stores a new key under `name`, read from `file` or freshly generated.
    pub fn create_key(
        &self,
        name: &str,
        file: Option<&Path>,
        force: bool,
    ) -> anyhow::Result<SoftKey> {
        let key = match file {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read key file {path:?}"))?
                .parse::<SoftKey>()?,
            None => SoftKey::random(),
        };

        let mut keystore = self
            .keystore
            .write()
            .map_err(|_| anyhow!("key store lock poisoned"))?;
        if keystore.get(name)?.is_some() && !force {
            return Err(anyhow!(
                "key {name:?} already exists. Use --force parameter to overwrite"
            ));
        }
        keystore.put(name, key.to_key_info())?;
        log::info!("stored key {name} with address {}", key.address());
        Ok(key)
    }

    pub fn list_keys(&self) -> anyhow::Result<Vec<(String, SoftKey)>> {
        let names = self
            .keystore
            .read()
            .map_err(|_| anyhow!("key store lock poisoned"))?
            .list()?;
        names
            .into_iter()
            .map(|name| {
                let key = self.get_key(&name)?;
                Ok((name, key))
            })
            .collect()
    }

    /// The P-Chain address of `key` on every known network.
    pub fn key_addresses(&self, key: &SoftKey) -> Vec<(NetworkKind, ChainAddress)> {
        [NetworkKind::Local, NetworkKind::Fuji, NetworkKind::Mainnet, NetworkKind::Devnet]
            .into_iter()
            .filter_map(|kind| self.network(kind).ok())
            .map(|network| (network.kind(), key.p_chain_address(network.id())))
            .collect()
    }

    pub fn delete_key(&self, name: &str) -> anyhow::Result<()> {
        let mut keystore = self
            .keystore
            .write()
            .map_err(|_| anyhow!("key store lock poisoned"))?;
        if keystore.get(name)?.is_none() {
            return Err(anyhow!("key {name:?} not found"));
        }
        keystore.remove(name)?;
        log::info!("deleted key {name}");
        Ok(())
    }

    /// The `PrivateKey-<cb58>` form of the stored key `name`.
    pub fn export_key(&self, name: &str) -> anyhow::Result<String> {
        Ok(self.get_key(name)?.to_cb58_string())
    }
}

fn new_keystore_from_config(config: &Config) -> anyhow::Result<PersistentKeyStore> {
    let repo_str = config.keystore_path.as_deref().unwrap_or(DEFAULT_KEYSTORE_DIR);
    new_keystore_from_path(repo_str)
}

pub fn new_keystore_from_path(repo_str: &str) -> anyhow::Result<PersistentKeyStore> {
    let repo = Path::new(&repo_str).join(avalanche_wallet::DEFAULT_KEYSTORE_NAME);
    let repo = expand_tilde(repo);
    PersistentKeyStore::new(repo).map_err(|e| anyhow!("Failed to create keystore: {}", e))
}

pub fn default_repo_path() -> PathBuf {
    expand_tilde(Path::new("~").join(DEFAULT_REPO_PATH))
}

pub fn default_config_path() -> PathBuf {
    default_repo_path().join(DEFAULT_CONFIG_NAME)
}

/// Expand paths that begin with "~" to `$HOME`.
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let p = path.as_ref().to_path_buf();
    if !p.starts_with("~") {
        return p;
    }
    if p == Path::new("~") {
        return dirs::home_dir().unwrap_or(p);
    }
    match (dirs::home_dir(), p.strip_prefix("~")) {
        (Some(home), Ok(rest)) => home.join(rest),
        _ => p.clone(),
    }
}
