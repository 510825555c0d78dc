// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! The on-disk layout of the subnets managed by the cli.
//!
//! ```text
//! <base>/subnets/<name>/sidecar.json
//! <base>/subnets/<name>/genesis.json
//! <base>/subnets/<name>/{node-config,chain,subnet,upgrade}.json
//! <base>/subnets/<name>/elastic_subnet_config.json
//! <base>/vms/<name>
//! <base>/repos/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_api::sidecar::{Sidecar, VmType, DEFAULT_TOKEN_NAME, SIDECAR_VERSION};
use serde::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

const SUBNETS_DIR: &str = "subnets";
const CUSTOM_VM_DIR: &str = "vms";
const REPOS_DIR: &str = "repos";
const SIDECAR_FILE_NAME: &str = "sidecar.json";
const GENESIS_FILE_NAME: &str = "genesis.json";
const ELASTIC_CONFIG_FILE_NAME: &str = "elastic_subnet_config.json";

/// Mode of every file the store writes.
pub const WRITE_READ_READ_PERMS: u32 = 0o644;

/// Optional json blobs stored next to a sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
pub enum ConfigFile {
    #[strum(serialize = "node-config.json")]
    Node,
    #[strum(serialize = "chain.json")]
    Chain,
    #[strum(serialize = "subnet.json")]
    Subnet,
    #[strum(serialize = "upgrade.json")]
    NetworkUpgrades,
}

pub struct SubnetStore {
    base_dir: PathBuf,
}

impl SubnetStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn subnet_dir(&self, name: &str) -> PathBuf {
        self.base_dir.join(SUBNETS_DIR).join(name)
    }

    pub fn sidecar_path(&self, name: &str) -> PathBuf {
        self.subnet_dir(name).join(SIDECAR_FILE_NAME)
    }

    pub fn genesis_path(&self, name: &str) -> PathBuf {
        self.subnet_dir(name).join(GENESIS_FILE_NAME)
    }

    pub fn config_file_path(&self, name: &str, file: ConfigFile) -> PathBuf {
        self.subnet_dir(name).join(file.as_ref())
    }

    pub fn elastic_config_path(&self, name: &str) -> PathBuf {
        self.subnet_dir(name).join(ELASTIC_CONFIG_FILE_NAME)
    }

    pub fn custom_vm_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(CUSTOM_VM_DIR).join(name)
    }

    /// Where published subnet descriptors are looked up.
    pub fn repos_dir(&self) -> PathBuf {
        self.base_dir.join(REPOS_DIR)
    }

    pub fn sidecar_exists(&self, name: &str) -> bool {
        self.sidecar_path(name).is_file()
    }

    pub fn genesis_exists(&self, name: &str) -> bool {
        self.genesis_path(name).is_file()
    }

    /// Writes the sidecar of a new subnet. A Subnet-EVM sidecar must carry a chain id that no
    /// other Subnet-EVM subnet uses.
    pub fn create_sidecar(&self, sidecar: &mut Sidecar) -> Result<()> {
        if sidecar.token_name.is_empty() {
            sidecar.token_name = DEFAULT_TOKEN_NAME.to_string();
        }
        if sidecar.vm == VmType::SubnetEvm && sidecar.chain_id.is_empty() {
            let genesis = self.load_raw_genesis(&sidecar.name)?;
            self.check_evm_chain_id(sidecar, &genesis)?;
        } else {
            self.check_evm_chain_id(sidecar, &[])?;
        }
        self.update_sidecar(sidecar)
    }

    /// Fails when the chain ID of a Subnet-EVM `sidecar`, or else of its `genesis`, belongs to
    /// another subnet.
    pub fn check_evm_chain_id(&self, sidecar: &Sidecar, genesis: &[u8]) -> Result<()> {
        if sidecar.vm != VmType::SubnetEvm {
            return Ok(());
        }
        let chain_id = if sidecar.chain_id.is_empty() {
            evm_chain_id(genesis).unwrap_or_default()
        } else {
            sidecar.chain_id.clone()
        };
        if self
            .subnet_evm_chain_id_exists(&chain_id, &sidecar.name)
            .context("unable to determine if subnet evm chain id is unique")?
        {
            return Err(anyhow!(
                "chain ID {chain_id} is already in use by another subnet"
            ));
        }
        Ok(())
    }

    /// Persists `sidecar`, stamping the current sidecar version.
    pub fn update_sidecar(&self, sidecar: &mut Sidecar) -> Result<()> {
        sidecar.version = SIDECAR_VERSION.to_string();
        let path = self.sidecar_path(&sidecar.name);
        write_json(&path, sidecar)?;
        log::debug!("sidecar of {} written to {path:?}", sidecar.name);
        Ok(())
    }

    pub fn load_sidecar(&self, name: &str) -> Result<Sidecar> {
        let path = self.sidecar_path(name);
        let bytes =
            fs::read(&path).with_context(|| format!("failed to read sidecar at {path:?}"))?;
        let mut sidecar: Sidecar = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse sidecar at {path:?}"))?;
        if sidecar.token_name.is_empty() {
            sidecar.token_name = DEFAULT_TOKEN_NAME.to_string();
        }
        Ok(sidecar)
    }

    /// Names of all the stored subnets, sorted.
    pub fn sidecar_names(&self) -> Result<Vec<String>> {
        let dir = self.base_dir.join(SUBNETS_DIR);
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut names = vec![];
        for entry in fs::read_dir(&dir).with_context(|| format!("cannot read {dir:?}"))? {
            let entry = entry?;
            if !entry.path().join(SIDECAR_FILE_NAME).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether a Subnet-EVM subnet other than `except` already uses `chain_id`. Sidecars without
    /// a recorded chain id are checked through their genesis.
    pub fn subnet_evm_chain_id_exists(&self, chain_id: &str, except: &str) -> Result<bool> {
        if chain_id.is_empty() {
            return Ok(false);
        }
        for name in self.sidecar_names()? {
            if name == except {
                continue;
            }
            let sidecar = self.load_sidecar(&name)?;
            if sidecar.vm != VmType::SubnetEvm {
                continue;
            }
            let existing = if sidecar.chain_id.is_empty() {
                match self.load_raw_genesis(&name).ok().and_then(|g| evm_chain_id(&g)) {
                    Some(id) => id,
                    None => continue,
                }
            } else {
                sidecar.chain_id
            };
            if existing == chain_id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn write_genesis(&self, name: &str, genesis: &[u8]) -> Result<()> {
        write_file(&self.genesis_path(name), genesis)
    }

    pub fn load_raw_genesis(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.genesis_path(name);
        fs::read(&path).with_context(|| format!("failed to read genesis at {path:?}"))
    }

    /// Copies a custom VM binary into the vms directory.
    pub fn copy_vm_binary(&self, source: &Path, name: &str) -> Result<()> {
        let bytes =
            fs::read(source).with_context(|| format!("failed to read vm binary {source:?}"))?;
        write_file(&self.custom_vm_path(name), &bytes)
    }

    pub fn write_config_file(&self, name: &str, file: ConfigFile, bytes: &[u8]) -> Result<()> {
        write_file(&self.config_file_path(name, file), bytes)
    }

    pub fn load_config_file(&self, name: &str, file: ConfigFile) -> Result<Option<Vec<u8>>> {
        let path = self.config_file_path(name, file);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).with_context(|| format!("failed to read {path:?}"))?;
        Ok(Some(bytes))
    }

    pub fn remove_config_file(&self, name: &str, file: ConfigFile) -> Result<()> {
        let path = self.config_file_path(name, file);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("failed to remove {path:?}"))?;
        }
        Ok(())
    }

    pub fn write_elastic_config(&self, name: &str, config: &ElasticSubnetConfig) -> Result<()> {
        write_json(&self.elastic_config_path(name), config)
    }

    pub fn load_elastic_config(&self, name: &str) -> Result<ElasticSubnetConfig> {
        let path = self.elastic_config_path(name);
        let bytes = fs::read(&path).with_context(|| format!("failed to read {path:?}"))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Removes the subnet directory and its custom vm binary.
    pub fn delete_subnet(&self, name: &str) -> Result<()> {
        let dir = self.subnet_dir(name);
        if !dir.exists() {
            return Err(anyhow!("invalid subnet {name:?}"));
        }
        fs::remove_dir_all(&dir).with_context(|| format!("failed to remove {dir:?}"))?;

        let vm = self.custom_vm_path(name);
        if vm.exists() {
            fs::remove_file(&vm).with_context(|| format!("failed to remove {vm:?}"))?;
        }
        log::info!("deleted subnet {name}");
        Ok(())
    }

    /// All the config blobs present for `name`.
    pub fn config_files(&self, name: &str) -> Result<Vec<(ConfigFile, Vec<u8>)>> {
        let mut files = vec![];
        for file in ConfigFile::iter() {
            if let Some(bytes) = self.load_config_file(name, file)? {
                files.push((file, bytes));
            }
        }
        Ok(files)
    }
}

/// The `config.chainId` of a Subnet-EVM genesis, as a decimal string.
pub fn evm_chain_id(genesis: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(genesis).ok()?;
    match &value["config"]["chainId"] {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Serializes `value` with a 4 space indent.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer)?;
    write_file(path, &bytes)
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("cannot create {parent:?}"))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {path:?}"))?;
    set_permissions(path)
}

#[cfg(unix)]
fn set_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(WRITE_READ_READ_PERMS))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
