// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Subnet validator set and ownership cli command handlers.

use anyhow::Result;
use async_trait::async_trait;
use avalanche_api::ids::NodeId;
use avalanche_provider::deploy::parse_addresses;
use avalanche_provider::multisig::MultisigOutcome;
use avalanche_provider::validators::{
    add_validator, default_start_time, parse_staking_period, parse_start_time, remove_validator,
    transfer_ownership, AddValidatorRequest, RemoveValidatorRequest, TransferOwnershipRequest,
    DEFAULT_STAKE_DURATION, DEFAULT_STAKE_WEIGHT,
};
use clap::Args;
use std::fmt::Debug;

use crate::commands::{MultisigArgs, NetworkFlags, Session};
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

fn log_outcome(what: &str, subnet: &str, outcome: &MultisigOutcome) {
    match outcome {
        MultisigOutcome::Committed(tx_id) => log::info!("{what} on {subnet} committed in {tx_id}"),
        MultisigOutcome::Pending(path) => log::info!("{what} on {subnet} pending in {path:?}"),
    }
}

/// The command to add a validator to a subnet.
pub(crate) struct AddValidator;

#[async_trait]
impl CommandLineHandler for AddValidator {
    type Arguments = AddValidatorArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> Result<()> {
        log::debug!("add subnet validator with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let session =
            Session::connect(&provider, &arguments.network, arguments.key.as_deref()).await?;

        let now = chrono::Utc::now();
        let start = match &arguments.start_time {
            Some(s) => parse_start_time(s, now)?,
            None => default_start_time(session.network.kind(), now),
        };
        let duration = match &arguments.staking_period {
            Some(s) => parse_staking_period(s)?,
            None => DEFAULT_STAKE_DURATION,
        };

        let request = AddValidatorRequest {
            subnet_name: arguments.name.clone(),
            node_id: arguments.node_id,
            weight: arguments.weight,
            start,
            duration,
            subnet_auth_keys: session.subnet_auth_keys(&arguments.multisig.subnet_auth_keys)?,
            output_tx_path: arguments.multisig.output_tx_path.clone(),
        };
        let outcome = add_validator(
            &mut std::io::stdout(),
            &provider.store(),
            session.deployer.as_ref(),
            session.node.as_ref(),
            &session.network,
            &session.keychain,
            request,
        )
        .await?;
        log_outcome("add validator", &arguments.name, &outcome);
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Add a validator to a deployed subnet")]
pub(crate) struct AddValidatorArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
    #[arg(short, long, help = "Name of the stored key that pays for the tx")]
    pub key: Option<String>,
    #[arg(long, help = "Node ID of the validator")]
    pub node_id: NodeId,
    #[arg(long, default_value_t = DEFAULT_STAKE_WEIGHT, help = "Weight of the validator")]
    pub weight: u64,
    #[arg(
        long,
        conflicts_with = "default_start_time",
        help = "UTC start time of the validation, formatted as \"YYYY-MM-DD HH:MM:SS\""
    )]
    pub start_time: Option<String>,
    #[arg(long, help = "Start validating 5 minutes from now (30 seconds on the local network)")]
    pub default_start_time: bool,
    #[arg(
        long,
        conflicts_with = "default_duration",
        help = "Duration of the validation, e.g. 336h, 14d"
    )]
    pub staking_period: Option<String>,
    #[arg(long, help = "Validate for the default duration of 14 days")]
    pub default_duration: bool,
    #[clap(flatten)]
    pub multisig: MultisigArgs,
}

/// The command to remove a validator from a subnet.
pub(crate) struct RemoveValidator;

#[async_trait]
impl CommandLineHandler for RemoveValidator {
    type Arguments = RemoveValidatorArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> Result<()> {
        log::debug!("remove subnet validator with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let session =
            Session::connect(&provider, &arguments.network, arguments.key.as_deref()).await?;

        let request = RemoveValidatorRequest {
            subnet_name: arguments.name.clone(),
            node_id: arguments.node_id,
            subnet_auth_keys: session.subnet_auth_keys(&arguments.multisig.subnet_auth_keys)?,
            output_tx_path: arguments.multisig.output_tx_path.clone(),
        };
        let outcome = remove_validator(
            &mut std::io::stdout(),
            &provider.store(),
            session.deployer.as_ref(),
            session.node.as_ref(),
            &session.network,
            &session.keychain,
            request,
        )
        .await?;
        log_outcome("remove validator", &arguments.name, &outcome);
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Remove a validator from a deployed subnet")]
pub(crate) struct RemoveValidatorArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
    #[arg(short, long, help = "Name of the stored key that pays for the tx")]
    pub key: Option<String>,
    #[arg(long, help = "Node ID of the validator")]
    pub node_id: NodeId,
    #[clap(flatten)]
    pub multisig: MultisigArgs,
}

/// The command to hand the control of a subnet to new keys.
pub(crate) struct TransferOwnership;

#[async_trait]
impl CommandLineHandler for TransferOwnership {
    type Arguments = TransferOwnershipArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> Result<()> {
        log::debug!("transfer subnet ownership with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let session =
            Session::connect(&provider, &arguments.network, arguments.key.as_deref()).await?;

        let request = TransferOwnershipRequest {
            subnet_name: arguments.name.clone(),
            new_control_keys: parse_addresses(&arguments.control_keys, session.network.id())?,
            new_threshold: arguments.threshold,
            subnet_auth_keys: session.subnet_auth_keys(&arguments.multisig.subnet_auth_keys)?,
            output_tx_path: arguments.multisig.output_tx_path.clone(),
        };
        let outcome = transfer_ownership(
            &mut std::io::stdout(),
            &provider.store(),
            session.deployer.as_ref(),
            session.node.as_ref(),
            &session.network,
            &session.keychain,
            request,
        )
        .await?;
        log_outcome("ownership transfer", &arguments.name, &outcome);
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "Transfer the control of a deployed subnet to new keys")]
pub(crate) struct TransferOwnershipArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
    #[arg(short, long, help = "Name of the stored key that pays for the tx")]
    pub key: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        required = true,
        help = "Addresses of the new control keys"
    )]
    pub control_keys: Vec<String>,
    #[arg(
        long,
        default_value = "0",
        help = "Required number of new control key signatures, 0 for all of them"
    )]
    pub threshold: u32,
    #[clap(flatten)]
    pub multisig: MultisigArgs,
}
