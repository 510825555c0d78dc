// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use clap::Args;
use std::fmt::Debug;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct DeleteSubnet;

#[async_trait]
impl CommandLineHandler for DeleteSubnet {
    type Arguments = DeleteSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("delete subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        provider.store().delete_subnet(&arguments.name)
    }
}

#[derive(Debug, Args)]
#[command(name = "delete", about = "Delete a subnet configuration and its custom VM binary")]
pub(crate) struct DeleteSubnetArgs {
    pub name: String,
}
