// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Join subnet cli command handler.

use anyhow::anyhow;
use async_trait::async_trait;
use avalanche_api::ids::NodeId;
use avalanche_api::sidecar::VmType;
use avalanche_provider::join::{
    edit_config_file, is_node_validating_subnet, print_config_edited, print_join_instructions,
};
use avalanche_provider::validators::NO_SUBNET_ID;
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::commands::NetworkFlags;
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

const SUBNET_EVM_INSTALL_DIR: &str = "bin/subnet-evm";

/// The command to configure a node to validate a subnet
pub(crate) struct JoinSubnet;

#[async_trait]
impl CommandLineHandler for JoinSubnet {
    type Arguments = JoinSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("join subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let store = provider.store();
        let sidecar = store.load_sidecar(&arguments.name)?;
        let network = arguments.network.network(&provider).await?;
        let subnet_id = sidecar
            .subnet_id(network.kind())
            .ok_or_else(|| anyhow!(NO_SUBNET_ID))?;

        if let Some(node_id) = &arguments.node_id {
            let node = provider.node_client(&network)?;
            if !is_node_validating_subnet(node.as_ref(), &subnet_id, node_id).await? {
                log::warn!("node {node_id} is not yet a validator of subnet {subnet_id}");
            }
        }

        let mut out = std::io::stdout();
        match &arguments.avalanchego_config {
            Some(path) => {
                edit_config_file(path, &subnet_id, network.id())?;
                print_config_edited(&mut out, path)?;
            }
            None => {
                let vm_path = match sidecar.vm {
                    VmType::Custom => store.custom_vm_path(&sidecar.name),
                    VmType::SubnetEvm => store
                        .base_dir()
                        .join(SUBNET_EVM_INSTALL_DIR)
                        .join(format!("subnet-evm-{}", sidecar.vm_version)),
                };
                print_join_instructions(&mut out, &subnet_id, network.id(), &vm_path)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "join", about = "Configure a node to validate a deployed subnet")]
pub(crate) struct JoinSubnetArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
    #[arg(long, help = "Path of the avalanchego JSON config file to edit")]
    pub avalanchego_config: Option<PathBuf>,
    #[arg(long, help = "Node ID to check the validator status of")]
    pub node_id: Option<NodeId>,
}
