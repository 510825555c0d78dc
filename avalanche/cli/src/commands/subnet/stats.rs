// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Subnet validators and stats cli command handlers.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use avalanche_api::network::NetworkKind;
use avalanche_provider::validators::{list_validators, print_stats, print_validators};
use clap::Args;
use std::fmt::Debug;

use crate::commands::NetworkFlags;
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to list the current validators of a subnet.
pub(crate) struct ListValidators;

#[async_trait]
impl CommandLineHandler for ListValidators {
    type Arguments = ListValidatorsArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> Result<()> {
        log::debug!("list subnet validators with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let network = arguments.network.network(&provider).await?;
        let node = provider.node_client(&network)?;
        let validators =
            list_validators(&provider.store(), node.as_ref(), network.kind(), &arguments.name)
                .await?;
        print_validators(&mut std::io::stdout(), &validators)
    }
}

#[derive(Debug, Args)]
#[command(name = "validators", about = "List the current validators of a deployed subnet")]
pub(crate) struct ListValidatorsArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
}

/// The command to print the validator statistics of a subnet on a public network.
pub(crate) struct SubnetStats;

#[async_trait]
impl CommandLineHandler for SubnetStats {
    type Arguments = SubnetStatsArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> Result<()> {
        log::debug!("subnet stats with args: {:?}", arguments);

        let kind = arguments.network.kind()?;
        if !matches!(kind, NetworkKind::Fuji | NetworkKind::Mainnet) {
            return Err(anyhow!("stats are only available on fuji and mainnet"));
        }
        let provider = get_avalanche_provider(global)?;
        let network = arguments.network.network(&provider).await?;
        let node = provider.node_client(&network)?;
        let validators =
            list_validators(&provider.store(), node.as_ref(), kind, &arguments.name).await?;
        print_stats(&mut std::io::stdout(), &validators, chrono::Utc::now())
    }
}

#[derive(Debug, Args)]
#[command(name = "stats", about = "Show the validator statistics of a deployed subnet")]
pub(crate) struct SubnetStatsArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
}
