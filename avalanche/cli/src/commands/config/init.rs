// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use crate::{CommandLineHandler, GlobalArguments};
use anyhow::anyhow;
use async_trait::async_trait;
use avalanche_provider::config::DEFAULT_CONFIG_TEMPLATE;
use std::io::Write;

use clap::Args;

/// The command to write the default config template to the config path.
pub(crate) struct InitConfig;

#[async_trait]
impl CommandLineHandler for InitConfig {
    type Arguments = InitConfigArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        let path = global.config_path();
        log::debug!("initializing config file in {}", path.display());

        if path.exists() && !arguments.force {
            return Err(anyhow!(
                "config file {} already exists. Use --force parameter to overwrite",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(&path).map_err(|e| {
            log::error!("couldn't create config file");
            e
        })?;
        file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes())
            .map_err(|e| {
                log::error!("error populating config template");
                e
            })?;

        log::info!("Config template populated in {}", path.display());

        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Write the default config template to the config path")]
pub(crate) struct InitConfigArgs {
    #[arg(long, help = "Overwrite an existing config file")]
    pub force: bool,
}
