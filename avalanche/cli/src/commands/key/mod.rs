// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use crate::{CommandLineHandler, GlobalArguments};

use clap::{Args, Subcommand};

use self::create::{KeyCreate, KeyCreateArgs};
use self::delete::{KeyDelete, KeyDeleteArgs};
use self::export::{KeyExport, KeyExportArgs};
use self::list::{KeyList, KeyListArgs};

mod create;
mod delete;
mod export;
mod list;

#[derive(Debug, Args)]
#[command(name = "key", about = "Create and manage signing keys")]
#[command(args_conflicts_with_subcommands = true)]
pub(crate) struct KeyCommandsArgs {
    #[command(subcommand)]
    command: Commands,
}

impl KeyCommandsArgs {
    pub async fn handle(&self, global: &GlobalArguments) -> anyhow::Result<()> {
        match &self.command {
            Commands::Create(args) => KeyCreate::handle(global, args).await,
            Commands::List(args) => KeyList::handle(global, args).await,
            Commands::Delete(args) => KeyDelete::handle(global, args).await,
            Commands::Export(args) => KeyExport::handle(global, args).await,
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Create(KeyCreateArgs),
    List(KeyListArgs),
    Delete(KeyDeleteArgs),
    Export(KeyExportArgs),
}
