// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! List subnets cli command handler.

use async_trait::async_trait;
use avalanche_api::network::NetworkKind;
use avalanche_provider::subnet::{
    list_deployed_subnets, list_subnets, print_deployed_rows, print_subnet_rows,
};
use clap::Args;
use std::fmt::Debug;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to list the subnet configurations.
pub(crate) struct ListSubnets;

#[async_trait]
impl CommandLineHandler for ListSubnets {
    type Arguments = ListSubnetsArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("list subnets with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let store = provider.store();
        let mut out = std::io::stdout();

        if !arguments.deployed {
            return print_subnet_rows(&mut out, &list_subnets(&store)?);
        }

        let local_node = match provider
            .network(NetworkKind::Local)
            .and_then(|network| provider.node_client(&network))
        {
            Ok(node) => Some(node),
            Err(e) => {
                log::warn!("local network status unavailable: {e}");
                None
            }
        };
        let rows = list_deployed_subnets(&store, local_node.as_deref()).await?;
        print_deployed_rows(&mut out, &rows)
    }
}

#[derive(Debug, Args)]
#[command(name = "list", about = "List the subnet configurations")]
pub(crate) struct ListSubnetsArgs {
    #[arg(long, help = "Show the deployment status per network")]
    pub deployed: bool,
}
