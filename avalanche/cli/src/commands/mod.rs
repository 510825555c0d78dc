// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! This mod contains the different command line implementations.

mod config;
mod key;
mod subnet;
mod transaction;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use avalanche_api::ids::ShortId;
use avalanche_api::network::{Network, NetworkKind};
use avalanche_provider::deploy::{check_key_network, network_from_flags, parse_addresses};
use avalanche_provider::manager::SubnetDeployer;
use avalanche_provider::node::NodeClient;
use avalanche_provider::AvalancheProvider;
use avalanche_wallet::{Keychain, SoftKey};
use clap::{Args, Command, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Generator, Shell};
use url::Url;

use crate::commands::config::ConfigCommandsArgs;
use crate::commands::key::KeyCommandsArgs;
use crate::commands::subnet::SubnetCommandsArgs;
use crate::commands::transaction::TransactionCommandsArgs;
use crate::GlobalArguments;

/// The collection of all subcommands to be called, see clap's documentation for usage. Internal
/// to the current mode. Register a new command accordingly.
#[derive(Debug, Subcommand)]
enum Commands {
    Config(ConfigCommandsArgs),
    Subnet(SubnetCommandsArgs),
    Key(KeyCommandsArgs),
    Transaction(TransactionCommandsArgs),
}

#[derive(Debug, Parser)]
#[command(
    name = "avalanche",
    about = "Create, deploy and manage avalanche subnets",
    version
)]
#[command(propagate_version = true, arg_required_else_help = true)]
struct AvalancheCliCommands {
    // If provided, outputs the completion file for given shell
    #[arg(long = "cli-autocomplete-gen", value_enum)]
    generator: Option<Shell>,
    #[clap(flatten)]
    global_params: GlobalArguments,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// The `cli` method exposed to handle all the cli commands, ideally from main.
///
/// To register a new command, add it to the [`Commands`] enum and dispatch it below.
pub async fn cli() -> anyhow::Result<()> {
    let args = AvalancheCliCommands::parse();

    if let Some(generator) = args.generator {
        let mut cmd = AvalancheCliCommands::command();
        print_completions(generator, &mut cmd);
        return Ok(());
    }

    let global = &args.global_params;
    let Some(c) = &args.command else {
        return Ok(());
    };
    let r = match c {
        Commands::Config(args) => args.handle(global).await,
        Commands::Subnet(args) => args.handle(global).await,
        Commands::Key(args) => args.handle(global).await,
        Commands::Transaction(args) => args.handle(global).await,
    };
    r.with_context(|| format!("error processing command {:?}", args.command))
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub(crate) fn get_avalanche_provider(global: &GlobalArguments) -> Result<AvalancheProvider> {
    AvalancheProvider::new_from_config(global.config_path())
}

/// The network selection flags shared by the commands that talk to a node.
#[derive(Debug, Args, Clone, Default)]
pub(crate) struct NetworkFlags {
    #[arg(long, help = "Operate on the local network")]
    pub local: bool,
    #[arg(long, help = "Operate on a devnet")]
    pub devnet: bool,
    #[arg(long, alias = "testnet", help = "Operate on Fuji (alias --testnet)")]
    pub fuji: bool,
    #[arg(long, help = "Operate on Mainnet")]
    pub mainnet: bool,
    #[arg(long, help = "Use the given node endpoint instead of the configured one")]
    pub endpoint: Option<Url>,
}

impl NetworkFlags {
    pub fn kind(&self) -> Result<NetworkKind> {
        network_from_flags(self.local, self.devnet, self.fuji, self.mainnet)?.ok_or_else(|| {
            anyhow!("a network is required, set one of --local, --devnet, --fuji or --mainnet")
        })
    }

    /// Resolves the network from the config, or from `--endpoint` asking the node for its id.
    pub async fn network(&self, provider: &AvalancheProvider) -> Result<Network> {
        let kind = self.kind()?;
        match &self.endpoint {
            None => provider.network(kind),
            Some(endpoint) => {
                let unresolved = Network::new(kind, 0, endpoint.clone());
                let id = provider.node_client(&unresolved)?.network_id().await?;
                Ok(Network::new(kind, id, endpoint.clone()))
            }
        }
    }
}

/// A connection to a network with the keys that pay for and authorize transactions.
pub(crate) struct Session {
    pub network: Network,
    pub node: Arc<dyn NodeClient>,
    pub deployer: Box<dyn SubnetDeployer>,
    /// Addresses of the signing keys.
    pub keychain: Vec<ShortId>,
}

impl Session {
    /// Connects to the network of `flags`. The local network signs with the ewoq key, the others
    /// with the stored key `key`.
    pub async fn connect(
        provider: &AvalancheProvider,
        flags: &NetworkFlags,
        key: Option<&str>,
    ) -> Result<Self> {
        let network = flags.network(provider).await?;
        let keychain = match network.kind() {
            NetworkKind::Local => Keychain::new([SoftKey::ewoq()?]),
            kind => {
                check_key_network(kind)?;
                let name = key.ok_or_else(|| anyhow!("--key is required for {kind} operations"))?;
                provider.keychain(name)?
            }
        };
        Self::open(provider, network, keychain)
    }

    pub fn open(provider: &AvalancheProvider, network: Network, keychain: Keychain) -> Result<Self> {
        let node = provider.node_client(&network)?;
        let addresses = keychain.addresses();
        let deployer = provider.deployer(&network, node.clone(), keychain)?;
        Ok(Self {
            network,
            node,
            deployer,
            keychain: addresses,
        })
    }

    /// Parses `--subnet-auth-keys`, `None` when not given.
    pub fn subnet_auth_keys(&self, keys: &[String]) -> Result<Option<Vec<ShortId>>> {
        if keys.is_empty() {
            return Ok(None);
        }
        Ok(Some(parse_addresses(keys, self.network.id())?))
    }
}

/// The multisig arguments of the subnet changing commands.
#[derive(Debug, Args, Clone, Default)]
pub(crate) struct MultisigArgs {
    #[arg(
        long,
        value_delimiter = ',',
        help = "Control keys that will be used to authenticate the tx, defaults to a selection that prefers the stored key"
    )]
    pub subnet_auth_keys: Vec<String>,
    #[arg(long, help = "File path of the tx when it still needs more signatures")]
    pub output_tx_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        AvalancheCliCommands::command().debug_assert();
    }

    #[test]
    fn test_subnet_command_names() {
        let cmd = AvalancheCliCommands::command();
        let subnet = cmd
            .get_subcommands()
            .find(|c| c.get_name() == "subnet")
            .unwrap();
        let names: Vec<_> = subnet.get_subcommands().map(|c| c.get_name()).collect();
        for name in [
            "create",
            "deploy",
            "describe",
            "list",
            "delete",
            "addValidator",
            "removeValidator",
            "elastic",
            "export",
            "import",
            "publish",
            "join",
            "vmid",
            "configure",
            "transferOwnership",
            "validators",
            "stats",
        ] {
            assert!(names.contains(&name), "missing subnet {name}");
        }
    }

    #[test]
    fn test_network_flags() {
        let args = AvalancheCliCommands::try_parse_from([
            "avalanche",
            "subnet",
            "deploy",
            "mysubnet",
            "--testnet",
            "--key",
            "k",
        ]);
        assert!(args.is_ok());

        let blockchain_id = avalanche_api::ids::Id::default().to_string();
        let args = AvalancheCliCommands::try_parse_from([
            "avalanche",
            "subnet",
            "import",
            "public",
            "--blockchain-id",
            &blockchain_id,
            "--mainnet",
            "--custom",
        ]);
        assert!(args.is_ok());

        let flags = NetworkFlags {
            local: true,
            fuji: true,
            ..Default::default()
        };
        assert!(flags.kind().is_err());
        assert!(NetworkFlags::default().kind().is_err());
    }
}
