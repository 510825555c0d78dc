// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Transformation of a permissioned subnet into an elastic one.
//!
//! The transformation takes four transactions: the token is minted on the X-Chain, exported to
//! the P-Chain, imported there, and finally the subnet is transformed. Each of the first three
//! steps is recorded in the sidecar as soon as it is accepted so an interrupted run resumes
//! where it stopped.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_api::ids::{Id, ShortId};
use avalanche_api::network::{Network, NetworkKind};
use avalanche_api::sidecar::{Sidecar, CREATE_ASSET_TX, EXPORT_TX, IMPORT_TX};

use crate::manager::SubnetDeployer;
use crate::multisig::{
    check_output_path, get_owners, resolve_subnet_auth_keys, MultisigOutcome, PendingTx,
};
use crate::node::NodeClient;
use crate::store::SubnetStore;

pub const MAX_TOKEN_DENOMINATION: u8 = 32;
pub const MAX_TOKEN_NAME_LEN: usize = 128;
pub const MAX_TOKEN_SYMBOL_LEN: usize = 4;

/// The asset minted on the X-Chain takes names of at most 128 and symbols of at most 4 bytes.
pub fn check_token(name: &str, symbol: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_TOKEN_NAME_LEN {
        return Err(anyhow!(
            "token name must be between 1 and {MAX_TOKEN_NAME_LEN} bytes long"
        ));
    }
    if symbol.is_empty() || symbol.len() > MAX_TOKEN_SYMBOL_LEN {
        return Err(anyhow!(
            "token symbol must be between 1 and {MAX_TOKEN_SYMBOL_LEN} bytes long"
        ));
    }
    Ok(())
}

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct ElasticTransform {
    pub subnet_name: String,
    pub token_name: String,
    pub token_symbol: String,
    pub denomination: u8,
    pub config: ElasticSubnetConfig,
    /// Explicit subnet auth keys. Selected from the control keys when absent.
    pub subnet_auth_keys: Option<Vec<ShortId>>,
    /// Where to save the transform tx when it needs more signatures.
    pub output_tx_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElasticOutcome {
    Transformed {
        tx_id: Id,
        subnet_id: Id,
        asset_id: Id,
    },
    /// The transform tx was saved for offline signing.
    Pending(PathBuf),
}

/// Runs the elastic transformation of a deployed subnet on `network`.
///
/// `keychain` are the addresses that pay for and sign the transactions, the first of them
/// receiving the minted supply.
#[allow(clippy::too_many_arguments)]
pub async fn transform_elastic_subnet(
    out: &mut (impl Write + Send),
    store: &SubnetStore,
    deployer: &dyn SubnetDeployer,
    node: &dyn NodeClient,
    network: &Network,
    keychain: &[ShortId],
    request: ElasticTransform,
    step_delay: Duration,
) -> Result<ElasticOutcome> {
    let kind = network.kind();
    let name = request.subnet_name.as_str();
    let mut sidecar = store.load_sidecar(name)?;

    check_output_path(request.output_tx_path.as_deref())?;

    let subnet_id = sidecar.subnet_id(kind).ok_or_else(|| {
        anyhow!("failed to find the subnet ID for this subnet, has it been deployed/created on this network?")
    })?;

    match kind {
        NetworkKind::Mainnet => return Err(anyhow!("unsupported network")),
        NetworkKind::Local => {
            if sidecar.is_elastic(kind) {
                return Err(anyhow!("{name} is already an elastic subnet"));
            }
        }
        NetworkKind::Fuji | NetworkKind::Devnet => check_not_elastic(node, &subnet_id).await?,
    }

    if request.denomination > MAX_TOKEN_DENOMINATION {
        return Err(anyhow!("token denomination cannot exceed {MAX_TOKEN_DENOMINATION}"));
    }
    check_token(&request.token_name, &request.token_symbol)?;

    let mut config = request.config.clone();
    config.subnet_id = subnet_id;
    config.validate()?;

    let recipient = keychain
        .first()
        .copied()
        .ok_or_else(|| anyhow!("no key to pay for the transformation"))?;

    let fees = node.tx_fees().await?;
    writeln!(
        out,
        "Estimated fee for the transformation: {} nAVAX",
        fees.elastic_transformation()
    )?;
    writeln!(out, "Starting Elastic Subnet Transformation")?;

    let asset_id = match sidecar.elastic_step(kind, CREATE_ASSET_TX) {
        Some(asset_id) => {
            writeln!(
                out,
                "Skipping CreateAssetTx, transforming subnet with asset ID {asset_id}..."
            )?;
            asset_id
        }
        None => {
            let asset_id = deployer
                .create_asset(
                    &request.token_name,
                    &request.token_symbol,
                    request.denomination,
                    &[(recipient, config.max_supply)],
                )
                .await?;
            record_step(store, &mut sidecar, kind, CREATE_ASSET_TX, asset_id, step_delay).await?;
            asset_id
        }
    };

    if sidecar.elastic_step(kind, EXPORT_TX).is_some() {
        writeln!(out, "Skipping ExportTx...")?;
    } else {
        let tx_id = deployer
            .export_to_p_chain(asset_id, recipient, config.max_supply)
            .await?;
        record_step(store, &mut sidecar, kind, EXPORT_TX, tx_id, step_delay).await?;
    }

    if sidecar.elastic_step(kind, IMPORT_TX).is_some() {
        writeln!(out, "Skipping ImportTx...")?;
    } else {
        let tx_id = deployer.import_from_x_chain(recipient).await?;
        record_step(store, &mut sidecar, kind, IMPORT_TX, tx_id, step_delay).await?;
    }

    let (control_keys, threshold) = get_owners(node, &sidecar, kind, subnet_id).await?;
    let subnet_auth_keys =
        resolve_subnet_auth_keys(keychain, request.subnet_auth_keys, &control_keys, threshold)?;
    writeln!(
        out,
        "Your subnet auth keys for issue transform subnet tx: {}",
        format_keys(&subnet_auth_keys)
    )?;

    config.asset_id = asset_id;
    let result = deployer
        .transform_subnet(&control_keys, &subnet_auth_keys, subnet_id, &config)
        .await?;

    let pending = PendingTx {
        subnet_name: name,
        control_keys: &control_keys,
        subnet_auth_keys: &subnet_auth_keys,
        network_id: network.id(),
        output_path: request.output_tx_path.as_deref(),
    };
    let tx_id = match pending.settle(out, result)? {
        MultisigOutcome::Committed(tx_id) => tx_id,
        MultisigOutcome::Pending(path) => return Ok(ElasticOutcome::Pending(path)),
    };

    store.write_elastic_config(name, &config)?;
    sidecar.complete_elastic(
        kind,
        subnet_id,
        asset_id,
        tx_id,
        &request.token_name,
        &request.token_symbol,
    );
    store.update_sidecar(&mut sidecar).map_err(|e| {
        anyhow!("elastic subnet transformation was successful, but failed to update sidecar: {e:#}")
    })?;
    log::info!("subnet {name} transformed to elastic on {kind}");

    writeln!(out)?;
    writeln!(out, "Subnet Successfully Transformed To Elastic Subnet!")?;
    print_transform_results(
        out,
        &sidecar,
        &request.token_name,
        &request.token_symbol,
        asset_id,
        subnet_id,
        tx_id,
    )?;

    Ok(ElasticOutcome::Transformed {
        tx_id,
        subnet_id,
        asset_id,
    })
}

/// A subnet that reports a current supply is already elastic.
async fn check_not_elastic(node: &dyn NodeClient, subnet_id: &Id) -> Result<()> {
    match node.current_supply(subnet_id).await {
        Ok(_) => Err(anyhow!("subnet is already elastic")),
        Err(e) if e.to_string().contains("not found") => Ok(()),
        Err(e) => Err(e),
    }
}

async fn record_step(
    store: &SubnetStore,
    sidecar: &mut Sidecar,
    kind: NetworkKind,
    step: &str,
    tx_id: Id,
    step_delay: Duration,
) -> Result<()> {
    sidecar.record_elastic_step(kind, step, tx_id);
    store.update_sidecar(sidecar)?;
    log::info!("{step} {tx_id} recorded");
    // the outputs of a step become spendable shortly after its acceptance
    tokio::time::sleep(step_delay).await;
    Ok(())
}

fn format_keys(keys: &[ShortId]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_transform_results(
    out: &mut impl Write,
    sidecar: &Sidecar,
    token_name: &str,
    token_symbol: &str,
    asset_id: Id,
    subnet_id: Id,
    tx_id: Id,
) -> Result<()> {
    let rows = [
        ("Token Name", token_name.to_string()),
        ("Token Symbol", token_symbol.to_string()),
        ("Asset ID", asset_id.to_string()),
        ("Chain Name", sidecar.name.clone()),
        ("Subnet ID", subnet_id.to_string()),
        ("P-Chain TXID", tx_id.to_string()),
    ];
    for (key, value) in rows {
        writeln!(out, "{key:<14} {value}")?;
    }
    Ok(())
}
