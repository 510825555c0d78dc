// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Elastic subnet cli command handler.

use anyhow::Context;
use async_trait::async_trait;
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_provider::elastic::{transform_elastic_subnet, ElasticOutcome, ElasticTransform};
use clap::Args;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::commands::{MultisigArgs, NetworkFlags, Session};
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

const DEFAULT_TOKEN_DENOMINATION: u8 = 9;

/// The command to turn a permissioned subnet into an elastic one.
pub(crate) struct ElasticSubnet;

#[async_trait]
impl CommandLineHandler for ElasticSubnet {
    type Arguments = ElasticSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("elastic subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let config = match &arguments.elastic_config {
            Some(path) => {
                let bytes =
                    std::fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
                serde_json::from_slice::<ElasticSubnetConfig>(&bytes)
                    .with_context(|| format!("invalid elastic config {path:?}"))?
            }
            None => ElasticSubnetConfig::default(),
        };

        let session =
            Session::connect(&provider, &arguments.network, arguments.key.as_deref()).await?;
        let request = ElasticTransform {
            subnet_name: arguments.name.clone(),
            token_name: arguments.token_name.clone(),
            token_symbol: arguments.token_symbol.clone(),
            denomination: arguments.denomination,
            config,
            subnet_auth_keys: session.subnet_auth_keys(&arguments.multisig.subnet_auth_keys)?,
            output_tx_path: arguments.multisig.output_tx_path.clone(),
        };
        let outcome = transform_elastic_subnet(
            &mut std::io::stdout(),
            &provider.store(),
            session.deployer.as_ref(),
            session.node.as_ref(),
            &session.network,
            &session.keychain,
            request,
            provider.config().elastic.step_delay,
        )
        .await?;

        match outcome {
            ElasticOutcome::Transformed { tx_id, .. } => {
                log::info!("subnet {} transformed in {tx_id}", arguments.name)
            }
            ElasticOutcome::Pending(path) => {
                log::info!("transformation of {} pending in {path:?}", arguments.name)
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "elastic", about = "Transform a subnet into an elastic subnet")]
pub(crate) struct ElasticSubnetArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
    #[arg(short, long, help = "Name of the stored key that pays for the txs")]
    pub key: Option<String>,
    #[arg(long, help = "Name of the staking token")]
    pub token_name: String,
    #[arg(long, help = "Symbol of the staking token")]
    pub token_symbol: String,
    #[arg(long, default_value_t = DEFAULT_TOKEN_DENOMINATION, help = "Denomination of the staking token")]
    pub denomination: u8,
    #[arg(long, help = "JSON file with the elastic parameters, defaults apply otherwise")]
    pub elastic_config: Option<PathBuf>,
    #[clap(flatten)]
    pub multisig: MultisigArgs,
}
