// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Key export cli handler

use async_trait::async_trait;
use clap::Args;
use std::fmt::Debug;
use std::fs::Permissions;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct KeyExport;

#[async_trait]
impl CommandLineHandler for KeyExport {
    type Arguments = KeyExportArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("export key with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let exported = provider.export_key(&arguments.name)?;

        match &arguments.output {
            Some(p) => {
                let mut file = std::fs::File::create(p)?;
                file.set_permissions(Permissions::from_mode(0o600))?;
                file.write_all(exported.as_bytes())?;
                log::info!("key {} exported to {}", arguments.name, p.display());
            }
            None => println!("{exported}"),
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Export the private key of a stored key")]
pub(crate) struct KeyExportArgs {
    #[arg(help = "Name of the key to export")]
    pub name: String,
    #[arg(short, long, help = "Write the key to this file instead of stdout")]
    pub output: Option<PathBuf>,
}
