// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use avalanche_provider::export::{export_subnet, CustomVmSource};
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to bundle a subnet configuration into a single file.
pub(crate) struct ExportSubnet;

#[async_trait]
impl CommandLineHandler for ExportSubnet {
    type Arguments = ExportSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("export subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let source = CustomVmSource {
            repo_url: arguments.custom_vm_repo_url.clone(),
            branch: arguments.custom_vm_branch.clone(),
            build_script: arguments.custom_vm_build_script.clone(),
        };
        export_subnet(&provider.store(), &arguments.name, &source, &arguments.output)?;
        println!("Subnet {} exported to {}", arguments.name, arguments.output.display());
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "export", about = "Export a subnet configuration to a file")]
pub(crate) struct ExportSubnetArgs {
    pub name: String,
    #[arg(short, long, help = "File to write the export to")]
    pub output: PathBuf,
    #[arg(long, help = "Repository of the custom VM source")]
    pub custom_vm_repo_url: Option<String>,
    #[arg(long, help = "Branch of the custom VM source")]
    pub custom_vm_branch: Option<String>,
    #[arg(long, help = "Script building the custom VM")]
    pub custom_vm_build_script: Option<String>,
}
