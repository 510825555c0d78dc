// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Create subnet cli command handler.

use async_trait::async_trait;
use avalanche_api::sidecar::VmType;
use avalanche_provider::subnet::{create_subnet, CreateRequest};
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

const DEFAULT_VM_VERSION: &str = "latest";

/// The command to create a new subnet configuration.
pub(crate) struct CreateSubnet;

#[async_trait]
impl CommandLineHandler for CreateSubnet {
    type Arguments = CreateSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("create subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let vm = if arguments.custom {
            VmType::Custom
        } else {
            VmType::SubnetEvm
        };
        let sidecar = create_subnet(
            &provider.store(),
            CreateRequest {
                name: arguments.name.clone(),
                vm,
                genesis_path: arguments.genesis.clone(),
                vm_binary: arguments.vm.clone(),
                vm_version: arguments.vm_version.clone(),
                token_name: arguments.token_name.clone(),
                force: arguments.force,
            },
        )?;
        println!("Successfully created subnet configuration {}", sidecar.name);

        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "create", about = "Create a new subnet configuration")]
pub(crate) struct CreateSubnetArgs {
    #[arg(help = "Name of the subnet, alphanumeric only")]
    pub name: String,
    #[arg(long, help = "File path of the genesis to use")]
    pub genesis: PathBuf,
    #[arg(long, conflicts_with = "custom", help = "Use the Subnet-EVM as the VM (default)")]
    pub evm: bool,
    #[arg(long, help = "Use a custom VM binary")]
    pub custom: bool,
    #[arg(long, help = "File path of the custom VM binary")]
    pub vm: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_VM_VERSION, help = "Version of the VM")]
    pub vm_version: String,
    #[arg(long, help = "Name of the native token")]
    pub token_name: Option<String>,
    #[arg(short, long, help = "Overwrite an existing configuration")]
    pub force: bool,
}
