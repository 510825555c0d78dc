// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use avalanche_provider::subnet::describe_subnet;
use clap::Args;
use std::fmt::Debug;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to print the details of a subnet configuration.
pub(crate) struct DescribeSubnet;

#[async_trait]
impl CommandLineHandler for DescribeSubnet {
    type Arguments = DescribeSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("describe subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        describe_subnet(
            &mut std::io::stdout(),
            &provider.store(),
            &arguments.name,
            arguments.genesis,
        )
    }
}

#[derive(Debug, Args)]
#[command(name = "describe", about = "Print the details of a subnet configuration")]
pub(crate) struct DescribeSubnetArgs {
    pub name: String,
    #[arg(short, long, help = "Print the raw genesis instead")]
    pub genesis: bool,
}
