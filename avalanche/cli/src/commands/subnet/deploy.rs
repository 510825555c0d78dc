// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Deploy subnet cli command handler.

use async_trait::async_trait;
use avalanche_api::ids::Id;
use avalanche_api::network::NetworkKind;
use avalanche_provider::deploy::{
    check_local_rpc_version, deploy, resolve_control_keys, DeployOutcome, DeployRequest,
};
use avalanche_provider::manager::LocalDeployer;
use clap::Args;
use std::fmt::Debug;

use crate::commands::{MultisigArgs, NetworkFlags, Session};
use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

/// The command to deploy a subnet and its blockchain to a network.
pub(crate) struct DeploySubnet;

#[async_trait]
impl CommandLineHandler for DeploySubnet {
    type Arguments = DeploySubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("deploy subnet with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let store = provider.store();
        let session =
            Session::connect(&provider, &arguments.network, arguments.key.as_deref()).await?;
        let kind = session.network.kind();
        let payer = session.keychain.first().copied();

        let control_keys = if kind == NetworkKind::Local && arguments.control_keys.is_empty() {
            // local subnets are owned by the paying ewoq key
            payer.into_iter().collect()
        } else {
            resolve_control_keys(
                &arguments.control_keys,
                arguments.same_control_key,
                payer,
                session.network.id(),
            )?
        };

        if kind == NetworkKind::Local {
            let local = LocalDeployer::with_network(session.network.clone(), session.node.clone())?;
            check_local_rpc_version(&local, &store.load_sidecar(&arguments.name)?).await?;
        }

        let request = DeployRequest {
            subnet_name: arguments.name.clone(),
            control_keys,
            threshold: arguments.threshold,
            subnet_auth_keys: session.subnet_auth_keys(&arguments.multisig.subnet_auth_keys)?,
            subnet_id: arguments.subnet_id,
            output_tx_path: arguments.multisig.output_tx_path.clone(),
        };
        let outcome = deploy(
            &mut std::io::stdout(),
            &store,
            session.deployer.as_ref(),
            session.node.as_ref(),
            &session.network,
            &session.keychain,
            request,
        )
        .await?;
        if let DeployOutcome::Pending { subnet_id, path } = outcome {
            log::info!("subnet {subnet_id} created, chain creation pending in {path:?}");
        }

        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "deploy", about = "Deploy a subnet configuration to a network")]
pub(crate) struct DeploySubnetArgs {
    pub name: String,
    #[clap(flatten)]
    pub network: NetworkFlags,
    #[arg(short, long, help = "Name of the stored key that pays for the deployment")]
    pub key: Option<String>,
    #[arg(long, value_delimiter = ',', help = "Addresses that control the subnet")]
    pub control_keys: Vec<String>,
    #[arg(long, help = "Use the paying key as the only control key")]
    pub same_control_key: bool,
    #[arg(
        long,
        default_value = "0",
        help = "Required number of control key signatures, 0 for all of them"
    )]
    pub threshold: u32,
    #[arg(long, help = "Deploy the blockchain into this existing subnet")]
    pub subnet_id: Option<Id>,
    #[clap(flatten)]
    pub multisig: MultisigArgs,
}
