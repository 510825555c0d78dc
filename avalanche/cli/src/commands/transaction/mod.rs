// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Signing and committing the transactions saved for offline signing.

use crate::{CommandLineHandler, GlobalArguments};

use anyhow::Result;
use avalanche_api::codec::pchain::SignedTx;
use avalanche_api::network::Network;
use avalanche_provider::transaction::tx_network_kind;
use avalanche_provider::AvalancheProvider;
use clap::{Args, Subcommand};

use self::commit::{TransactionCommit, TransactionCommitArgs};
use self::sign::{TransactionSign, TransactionSignArgs};

mod commit;
mod sign;

#[derive(Debug, Args)]
#[command(name = "transaction", about = "Sign and commit multisig transactions")]
#[command(args_conflicts_with_subcommands = true)]
pub(crate) struct TransactionCommandsArgs {
    #[command(subcommand)]
    command: Commands,
}

impl TransactionCommandsArgs {
    pub async fn handle(&self, global: &GlobalArguments) -> anyhow::Result<()> {
        match &self.command {
            Commands::Sign(args) => TransactionSign::handle(global, args).await,
            Commands::Commit(args) => TransactionCommit::handle(global, args).await,
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Sign(TransactionSignArgs),
    Commit(TransactionCommitArgs),
}

/// The configured network the tx was built for.
fn tx_network(provider: &AvalancheProvider, tx: &SignedTx) -> Result<Network> {
    let network = provider.network(tx_network_kind(tx))?;
    let tx_network_id = tx.unsigned.base().network_id;
    if network.id() != tx_network_id {
        anyhow::bail!(
            "tx was built for network {tx_network_id}, but {} has id {}",
            network.kind(),
            network.id()
        );
    }
    Ok(network)
}
