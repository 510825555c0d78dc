// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Key create cli handler

use async_trait::async_trait;
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct KeyCreate;

#[async_trait]
impl CommandLineHandler for KeyCreate {
    type Arguments = KeyCreateArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("create key with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let key =
            provider.create_key(&arguments.name, arguments.file.as_deref(), arguments.force)?;
        println!("Key {} created with address {}", arguments.name, key.address());
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Create a new key, or import one from a file")]
pub(crate) struct KeyCreateArgs {
    #[arg(help = "Name of the key")]
    pub name: String,
    #[arg(long, help = "Import the key from a file holding a PrivateKey-<cb58> string")]
    pub file: Option<PathBuf>,
    #[arg(long, help = "Overwrite an existing key with the same name")]
    pub force: bool,
}
