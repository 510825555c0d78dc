// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Transaction sign cli handler

use async_trait::async_trait;
use avalanche_provider::deploy::check_key_network;
use avalanche_provider::multisig::load_tx;
use avalanche_provider::transaction;
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use super::tx_network;
use crate::commands::Session;
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct TransactionSign;

#[async_trait]
impl CommandLineHandler for TransactionSign {
    type Arguments = TransactionSignArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("sign transaction with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let tx = load_tx(&arguments.input_tx_filepath)?;
        let network = tx_network(&provider, &tx)?;
        check_key_network(network.kind())?;
        let keychain = provider.keychain(&arguments.key)?;
        let session = Session::open(&provider, network, keychain)?;

        transaction::sign(
            &mut std::io::stdout(),
            &provider.store(),
            session.deployer.as_ref(),
            session.node.as_ref(),
            &session.network,
            &session.keychain,
            &arguments.subnet_name,
            tx,
            &arguments.input_tx_filepath,
        )
        .await?;
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Sign a multisig transaction with a stored key")]
pub(crate) struct TransactionSignArgs {
    #[arg(help = "Name of the subnet the transaction modifies")]
    pub subnet_name: String,
    #[arg(long, help = "Path of the transaction file, rewritten with the new signatures")]
    pub input_tx_filepath: PathBuf,
    #[arg(short, long, help = "Name of the stored key to sign with")]
    pub key: String,
}
