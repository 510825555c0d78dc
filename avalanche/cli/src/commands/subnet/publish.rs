// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Publish subnet cli command handler.

use async_trait::async_trait;
use avalanche_provider::publish::{is_already_published, publish, PublishDetails};
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to write the repository descriptors of a deployed subnet.
pub(crate) struct PublishSubnet;

#[async_trait]
impl CommandLineHandler for PublishSubnet {
    type Arguments = PublishSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("publish subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let store = provider.store();
        let sidecar = store.load_sidecar(&arguments.name)?;

        let alias = arguments.alias.as_deref().unwrap_or(&arguments.name);
        if arguments.force && is_already_published(&arguments.output_path, alias)? {
            log::warn!("overwriting the published {alias} in {:?}", arguments.output_path);
        }

        let details = PublishDetails {
            alias: arguments.alias.clone(),
            vm_alias: arguments.vm_alias.clone(),
            homepage: arguments.homepage.clone(),
            description: arguments.description.clone(),
            maintainers: arguments.maintainers.clone(),
            vm_description: arguments.vm_description.clone(),
            install_script: arguments.install_script.clone(),
            binary_path: arguments.binary_path.clone(),
            vm_url: arguments.vm_url.clone(),
            vm_sha256: arguments.vm_sha256.clone(),
        };
        publish(
            &mut std::io::stdout(),
            &sidecar,
            &details,
            &arguments.output_path,
            arguments.force,
        )?;
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "publish", about = "Write the repository descriptors of a deployed subnet")]
pub(crate) struct PublishSubnetArgs {
    pub name: String,
    #[arg(long, help = "Repository directory the descriptors are written to")]
    pub output_path: PathBuf,
    #[arg(long, help = "Alias of the subnet, defaults to its name")]
    pub alias: Option<String>,
    #[arg(long, help = "Alias of the VM, defaults to the Fuji blockchain ID")]
    pub vm_alias: Option<String>,
    #[arg(long, default_value = "", help = "Homepage of the subnet")]
    pub homepage: String,
    #[arg(long, default_value = "", help = "Description of the subnet")]
    pub description: String,
    #[arg(long, value_delimiter = ',', help = "Maintainers of the subnet")]
    pub maintainers: Vec<String>,
    #[arg(long, help = "Description of the VM, defaults to the subnet description")]
    pub vm_description: Option<String>,
    #[arg(long, default_value = "", help = "Script installing the VM")]
    pub install_script: String,
    #[arg(long, default_value = "", help = "Path of the VM binary after installation")]
    pub binary_path: String,
    #[arg(long, default_value = "", help = "Download URL of the VM")]
    pub vm_url: String,
    #[arg(long, default_value = "", help = "SHA256 checksum of the VM download")]
    pub vm_sha256: String,
    #[arg(short, long, help = "Overwrite existing descriptors")]
    pub force: bool,
}
