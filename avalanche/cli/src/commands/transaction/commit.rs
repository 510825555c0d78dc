// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Transaction commit cli handler

use async_trait::async_trait;
use avalanche_provider::multisig::load_tx;
use avalanche_provider::transaction;
use avalanche_wallet::Keychain;
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use super::tx_network;
use crate::commands::Session;
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct TransactionCommit;

#[async_trait]
impl CommandLineHandler for TransactionCommit {
    type Arguments = TransactionCommitArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("commit transaction with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let tx = load_tx(&arguments.input_tx_filepath)?;
        let network = tx_network(&provider, &tx)?;
        // a fully signed tx needs no key to be issued
        let session = Session::open(&provider, network, Keychain::default())?;

        transaction::commit(
            &mut std::io::stdout(),
            &provider.store(),
            session.deployer.as_ref(),
            session.node.as_ref(),
            &session.network,
            &arguments.subnet_name,
            tx,
        )
        .await?;
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Issue a fully signed multisig transaction")]
pub(crate) struct TransactionCommitArgs {
    #[arg(help = "Name of the subnet the transaction modifies")]
    pub subnet_name: String,
    #[arg(long, help = "Path of the fully signed transaction file")]
    pub input_tx_filepath: PathBuf,
}
