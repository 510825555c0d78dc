// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use avalanche_provider::store::ConfigFile;
use avalanche_provider::subnet::configure_subnet;
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to attach node, chain and subnet config files to a subnet.
pub(crate) struct ConfigureSubnet;

#[async_trait]
impl CommandLineHandler for ConfigureSubnet {
    type Arguments = ConfigureSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("configure subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let files: Vec<_> = [
            (ConfigFile::Node, &arguments.node_config),
            (ConfigFile::Chain, &arguments.chain_config),
            (ConfigFile::Subnet, &arguments.subnet_config),
            (ConfigFile::NetworkUpgrades, &arguments.network_upgrades),
        ]
        .into_iter()
        .filter_map(|(file, path)| path.clone().map(|p| (file, p)))
        .collect();

        configure_subnet(&provider.store(), &arguments.name, &files)?;
        println!("Subnet {} configured", arguments.name);
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "configure", about = "Set the config files of a subnet")]
pub(crate) struct ConfigureSubnetArgs {
    pub name: String,
    #[arg(long, help = "Path of the avalanchego node config file")]
    pub node_config: Option<PathBuf>,
    #[arg(long, help = "Path of the chain config file")]
    pub chain_config: Option<PathBuf>,
    #[arg(long, help = "Path of the subnet config file")]
    pub subnet_config: Option<PathBuf>,
    #[arg(long, help = "Path of the network upgrades file")]
    pub network_upgrades: Option<PathBuf>,
}
