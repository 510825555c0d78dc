// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Key delete cli handler

use async_trait::async_trait;
use clap::Args;
use std::fmt::Debug;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct KeyDelete;

#[async_trait]
impl CommandLineHandler for KeyDelete {
    type Arguments = KeyDeleteArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("delete key with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        provider.delete_key(&arguments.name)
    }
}

#[derive(Debug, Args)]
#[command(about = "Delete a key from the key store")]
pub(crate) struct KeyDeleteArgs {
    #[arg(help = "Name of the key to delete")]
    pub name: String,
}
