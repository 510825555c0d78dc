// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use anyhow::anyhow;
use async_trait::async_trait;
use avalanche_api::ids::Id;
use avalanche_api::network::{Network, NetworkKind};
use avalanche_api::sidecar::VmType;
use avalanche_provider::export::{import_public, import_subnet, ImportPublicRequest};
use clap::{Args, Subcommand};
use std::fmt::Debug;
use std::path::PathBuf;
use url::Url;

use crate::commands::NetworkFlags;
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to import a subnet configuration.
pub(crate) struct ImportSubnet;

#[async_trait]
impl CommandLineHandler for ImportSubnet {
    type Arguments = ImportSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("import subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        match &arguments.source {
            ImportSource::File(args) => {
                let name = import_subnet(&provider.store(), &args.path, args.force)?;
                println!("Subnet {name} imported successfully");
            }
            ImportSource::Public(args) => {
                let kind = args.network.kind()?;
                if !matches!(kind, NetworkKind::Fuji | NetworkKind::Mainnet) {
                    return Err(anyhow!("import public only supports fuji and mainnet"));
                }
                let network = args.network.network(&provider).await?;
                let node = provider.node_client(&network)?;
                let validator = match &args.node_url {
                    Some(url) => Some(
                        provider.node_client(&Network::new(kind, network.id(), url.clone()))?,
                    ),
                    None => None,
                };
                let request = ImportPublicRequest {
                    blockchain_id: args.blockchain_id,
                    vm: if args.custom {
                        VmType::Custom
                    } else {
                        VmType::SubnetEvm
                    },
                    genesis_path: args.genesis_file_path.clone(),
                    vm_version: args.vm_version.clone().unwrap_or_default(),
                    force: args.force,
                };
                let name = import_public(
                    &provider.store(),
                    node.as_ref(),
                    validator.as_deref(),
                    kind,
                    request,
                )
                .await?;
                println!("Subnet {name} imported successfully");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "import", about = "Import a subnet configuration")]
pub(crate) struct ImportSubnetArgs {
    #[command(subcommand)]
    pub source: ImportSource,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ImportSource {
    /// Import from a file written by `subnet export`.
    File(ImportFileArgs),
    /// Import a blockchain already running on a public network.
    Public(ImportPublicArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ImportFileArgs {
    #[arg(help = "Path of the exported subnet file")]
    pub path: PathBuf,
    #[arg(short, long, help = "Overwrite an existing configuration")]
    pub force: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ImportPublicArgs {
    #[arg(long, help = "ID of the running blockchain")]
    pub blockchain_id: Id,
    #[clap(flatten)]
    pub network: NetworkFlags,
    #[arg(long, help = "Path of the genesis file, defaults to the genesis of the blockchain")]
    pub genesis_file_path: Option<PathBuf>,
    #[arg(long, help = "API url of a validator of the subnet, queried for its RPC version")]
    pub node_url: Option<Url>,
    #[arg(long, conflicts_with = "custom", help = "The blockchain runs the Subnet-EVM (default)")]
    pub evm: bool,
    #[arg(long, help = "The blockchain runs a custom VM")]
    pub custom: bool,
    #[arg(long, help = "Version of the VM")]
    pub vm_version: Option<String>,
    #[arg(short, long, help = "Overwrite an existing configuration")]
    pub force: bool,
}
