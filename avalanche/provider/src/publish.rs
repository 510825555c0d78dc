// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Subnet and VM descriptors in the YAML layout of subnet repositories.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use avalanche_api::network::NetworkKind;
use avalanche_api::sidecar::{Sidecar, VmType};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::store::write_file;

pub const SUBNETS_DIR: &str = "subnets";
pub const VMS_DIR: &str = "vms";
const YAML_SUFFIX: &str = ".yaml";
const SUBNET_EVM_DESCRIPTION: &str = "Subnet EVM is a simplified version of Coreth VM (C-Chain). It implements the Ethereum Virtual Machine and supports Solidity smart contracts as well as most other Ethereum client functionality";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetDescriptor {
    pub id: String,
    pub alias: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub maintainers: Vec<String>,
    pub vms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmDescriptor {
    pub id: String,
    pub alias: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub maintainers: Vec<String>,
    #[serde(default)]
    pub install_script: String,
    #[serde(default)]
    pub binary_path: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub sha256: String,
    pub version: String,
}

/// The free text parts of the descriptors.
#[derive(Debug, Clone, Default)]
pub struct PublishDetails {
    /// Defaults to the subnet name.
    pub alias: Option<String>,
    /// Defaults to the Fuji blockchain id.
    pub vm_alias: Option<String>,
    pub homepage: String,
    pub description: String,
    pub maintainers: Vec<String>,
    pub vm_description: Option<String>,
    pub install_script: String,
    pub binary_path: String,
    pub vm_url: String,
    pub vm_sha256: String,
}

/// A subnet can be published once it lives on Fuji or Mainnet.
pub fn is_ready_to_publish(sidecar: &Sidecar) -> bool {
    [NetworkKind::Fuji, NetworkKind::Mainnet]
        .into_iter()
        .any(|kind| sidecar.is_deployed(kind))
}

/// Looks for a `<name>.yaml` subnet descriptor in any of the local repositories.
pub fn is_already_published(repos_dir: &Path, name: &str) -> Result<bool> {
    if !repos_dir.exists() {
        return Ok(false);
    }
    let target = format!("{name}{YAML_SUFFIX}");
    for entry in WalkDir::new(repos_dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != VMS_DIR)
    {
        let entry = entry.with_context(|| format!("failed to walk {repos_dir:?}"))?;
        if entry.file_type().is_file() && entry.file_name() == target.as_str() {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn descriptors(
    sidecar: &Sidecar,
    details: &PublishDetails,
) -> Result<(SubnetDescriptor, VmDescriptor)> {
    let network = [NetworkKind::Fuji, NetworkKind::Mainnet]
        .into_iter()
        .find(|kind| sidecar.is_deployed(*kind))
        .ok_or_else(|| anyhow!("the subnet has not been deployed to a public network"))?;
    let subnet_id = sidecar.subnet_id(network).unwrap_or_default();
    let blockchain_id = sidecar.blockchain_id(network).unwrap_or_default();

    let (vm_id, default_description, default_maintainers) = match sidecar.vm {
        VmType::SubnetEvm => (
            sidecar.vm.to_string(),
            SUBNET_EVM_DESCRIPTION.to_string(),
            vec!["avalanche-labs".to_string()],
        ),
        VmType::Custom => (
            crate::deploy::sidecar_vm_id(sidecar)?.to_string(),
            String::new(),
            details.maintainers.clone(),
        ),
    };

    let vm = VmDescriptor {
        id: vm_id,
        alias: details
            .vm_alias
            .clone()
            .unwrap_or_else(|| blockchain_id.to_string()),
        homepage: String::new(),
        description: details
            .vm_description
            .clone()
            .unwrap_or(default_description),
        maintainers: default_maintainers,
        install_script: details.install_script.clone(),
        binary_path: details.binary_path.clone(),
        url: details.vm_url.clone(),
        sha256: details.vm_sha256.clone(),
        version: sidecar.vm_version.clone(),
    };
    let subnet = SubnetDescriptor {
        id: subnet_id.to_string(),
        alias: details.alias.clone().unwrap_or_else(|| sidecar.name.clone()),
        homepage: details.homepage.clone(),
        description: details.description.clone(),
        maintainers: details.maintainers.clone(),
        vms: vec![vm.alias.clone()],
    };
    Ok((subnet, vm))
}

/// Writes `<output>/subnets/<alias>.yaml` and `<output>/vms/<vm alias>.yaml`.
pub fn publish(
    out: &mut impl Write,
    sidecar: &Sidecar,
    details: &PublishDetails,
    output_dir: &Path,
    force: bool,
) -> Result<(PathBuf, PathBuf)> {
    if !is_ready_to_publish(sidecar) {
        return Err(anyhow!("the subnet has not been deployed to a public network"));
    }
    let (subnet, vm) = descriptors(sidecar, details)?;

    let subnet_file = output_dir
        .join(SUBNETS_DIR)
        .join(format!("{}{YAML_SUFFIX}", subnet.alias));
    let vm_file = output_dir
        .join(VMS_DIR)
        .join(format!("{}{YAML_SUFFIX}", vm.alias));
    if !force {
        for file in [&subnet_file, &vm_file] {
            if file.exists() {
                return Err(anyhow!(
                    "a file with the name {} already exists. If you wish to overwrite, provide the --force flag",
                    file.display()
                ));
            }
        }
    }

    writeln!(
        out,
        "Writing the file specs to the provided directory at: {}",
        output_dir.display()
    )?;
    write_file(&subnet_file, serde_yaml::to_string(&subnet)?.as_bytes())
        .context("failed creating the subnet description YAML file")?;
    write_file(&vm_file, serde_yaml::to_string(&vm)?.as_bytes())
        .context("failed creating the VM description YAML file")?;
    writeln!(out, "YAML files written successfully to {}", output_dir.display())?;
    log::info!("published {} to {output_dir:?}", sidecar.name);

    Ok((subnet_file, vm_file))
}
