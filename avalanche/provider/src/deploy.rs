// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Deployment of a configured subnet and its blockchain.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use avalanche_api::ids::{vm_id, Id, ShortId};
use avalanche_api::network::{Network, NetworkKind};
use avalanche_api::sidecar::Sidecar;

use crate::manager::{LocalDeployer, SubnetDeployer};
use crate::multisig::{
    check_output_path, get_owners, resolve_subnet_auth_keys, MultisigOutcome, PendingTx,
};
use crate::node::NodeClient;
use crate::store::SubnetStore;

/// True when at most one of `flags` is set.
pub fn ensure_mutually_exclusive(flags: &[bool]) -> bool {
    flags.iter().filter(|f| **f).count() <= 1
}

/// The network selected by the network flags, `None` when no flag is set.
pub fn network_from_flags(
    local: bool,
    devnet: bool,
    fuji: bool,
    mainnet: bool,
) -> Result<Option<NetworkKind>> {
    if !ensure_mutually_exclusive(&[local, devnet, fuji, mainnet]) {
        return Err(anyhow!(
            "--local, --devnet, --fuji (resp. --testnet) and --mainnet are mutually exclusive"
        ));
    }
    Ok([
        (local, NetworkKind::Local),
        (devnet, NetworkKind::Devnet),
        (fuji, NetworkKind::Fuji),
        (mainnet, NetworkKind::Mainnet),
    ]
    .into_iter()
    .find_map(|(set, kind)| set.then_some(kind)))
}

/// Stored keys can only sign on test networks.
pub fn check_key_network(kind: NetworkKind) -> Result<()> {
    if kind == NetworkKind::Mainnet {
        return Err(anyhow!("--key is not available for mainnet operations"));
    }
    Ok(())
}

/// Resolves the control keys: the explicit list, or the paying key alone with `same_control_key`.
pub fn resolve_control_keys(
    control_keys: &[String],
    same_control_key: bool,
    payer: Option<ShortId>,
    network_id: u32,
) -> Result<Vec<ShortId>> {
    if same_control_key && !control_keys.is_empty() {
        return Err(anyhow!(
            "--control-keys and --same-control-key are mutually exclusive"
        ));
    }
    if same_control_key {
        let payer = payer.ok_or_else(|| anyhow!("--same-control-key requires a paying key"))?;
        return Ok(vec![payer]);
    }
    let keys = parse_addresses(control_keys, network_id)?;
    if keys.is_empty() {
        return Err(anyhow!("no control keys given"));
    }
    Ok(keys)
}

/// Parses P-Chain addresses of `network_id`, with or without the `P-` prefix.
pub fn parse_addresses(addresses: &[String], network_id: u32) -> Result<Vec<ShortId>> {
    addresses
        .iter()
        .map(|a| {
            avalanche_api::address::ChainAddress::parse_for_network(a, network_id)
                .map(|addr| addr.short_id())
                .with_context(|| format!("invalid address {a}"))
        })
        .collect()
}

/// A threshold of 0 stands for all control keys.
pub fn resolve_threshold(threshold: u32, control_keys: usize) -> Result<u32> {
    if threshold as usize > control_keys {
        return Err(anyhow!("given threshold is greater than number of control keys"));
    }
    if threshold == 0 {
        return Ok(control_keys as u32);
    }
    Ok(threshold)
}

pub fn validate_genesis(genesis: &[u8]) -> Result<()> {
    serde_json::from_slice::<serde_json::Value>(genesis)
        .map(|_| ())
        .map_err(|e| anyhow!("failed to validate genesis format: {e}"))
}

/// The VM id of a subnet: the imported one or the one derived from its name.
pub fn sidecar_vm_id(sidecar: &Sidecar) -> Result<Id> {
    if !sidecar.imported_vm_id.is_empty() {
        return Id::from_str(&sidecar.imported_vm_id)
            .with_context(|| format!("invalid imported VM ID {}", sidecar.imported_vm_id));
    }
    Ok(vm_id(&sidecar.name)?)
}

/// Fails unless the local node runs the RPC protocol version the subnet VM was built for.
pub async fn check_local_rpc_version(local: &LocalDeployer, sidecar: &Sidecar) -> Result<()> {
    if sidecar.rpc_version == 0 {
        log::debug!("no RPC version recorded for {}, skipping check", sidecar.name);
        return Ok(());
    }
    local.check_rpc_version(sidecar.rpc_version).await
}

#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub subnet_name: String,
    pub control_keys: Vec<ShortId>,
    pub threshold: u32,
    pub subnet_auth_keys: Option<Vec<ShortId>>,
    /// Deploy the blockchain into an existing subnet instead of creating one.
    pub subnet_id: Option<Id>,
    pub output_tx_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed { subnet_id: Id, blockchain_id: Id },
    /// The chain creation was saved for offline signing.
    Pending { subnet_id: Id, path: PathBuf },
}

/// Creates the subnet (unless an existing one is reused) and its blockchain on `network`.
pub async fn deploy(
    out: &mut (impl Write + Send),
    store: &SubnetStore,
    deployer: &dyn SubnetDeployer,
    node: &dyn NodeClient,
    network: &Network,
    keychain: &[ShortId],
    request: DeployRequest,
) -> Result<DeployOutcome> {
    let kind = network.kind();
    let name = request.subnet_name.as_str();
    let mut sidecar = store.load_sidecar(name)?;
    if sidecar.imported_from_apm {
        return Err(anyhow!("unable to deploy subnets imported from a repo"));
    }
    check_output_path(request.output_tx_path.as_deref())?;

    let genesis = store.load_raw_genesis(name)?;
    validate_genesis(&genesis)?;
    let vm_id = sidecar_vm_id(&sidecar)?;

    writeln!(out, "Deploying [{name}] to {network}")?;

    let (subnet_id, control_keys, subnet_auth_keys) = match request.subnet_id {
        Some(subnet_id) => {
            let (control_keys, threshold) = get_owners(node, &sidecar, kind, subnet_id).await?;
            let subnet_auth_keys = resolve_subnet_auth_keys(
                keychain,
                request.subnet_auth_keys,
                &control_keys,
                threshold,
            )?;
            (subnet_id, control_keys, subnet_auth_keys)
        }
        None => {
            // signature indices refer to the owners in sorted order
            let mut control_keys = request.control_keys.clone();
            control_keys.sort();
            control_keys.dedup();
            let threshold = match (&request.subnet_auth_keys, request.threshold) {
                (Some(keys), 0) => keys.len() as u32,
                (_, threshold) => threshold,
            };
            let threshold = resolve_threshold(threshold, control_keys.len())?;
            let subnet_auth_keys = resolve_subnet_auth_keys(
                keychain,
                request.subnet_auth_keys,
                &control_keys,
                threshold,
            )?;
            let subnet_id = deployer.deploy_subnet(&control_keys, threshold).await?;
            writeln!(out, "Subnet has been created with ID: {subnet_id}")?;
            (subnet_id, control_keys, subnet_auth_keys)
        }
    };
    log::debug!("subnet auth keys for chain creation: {subnet_auth_keys:?}");

    let result = match deployer
        .deploy_blockchain(
            &control_keys,
            &subnet_auth_keys,
            subnet_id,
            &sidecar.name,
            vm_id,
            genesis,
        )
        .await
    {
        Ok(result) => result,
        Err(e) => {
            // the subnet exists even though its chain does not
            sidecar.record_deployment(kind, subnet_id, Id::EMPTY);
            store.update_sidecar(&mut sidecar)?;
            return Err(e);
        }
    };

    let pending = PendingTx {
        subnet_name: name,
        control_keys: &control_keys,
        subnet_auth_keys: &subnet_auth_keys,
        network_id: network.id(),
        output_path: request.output_tx_path.as_deref(),
    };
    let blockchain_id = match pending.settle(out, result) {
        Ok(MultisigOutcome::Committed(blockchain_id)) => blockchain_id,
        Ok(MultisigOutcome::Pending(path)) => {
            sidecar.record_deployment(kind, subnet_id, Id::EMPTY);
            store.update_sidecar(&mut sidecar)?;
            return Ok(DeployOutcome::Pending { subnet_id, path });
        }
        Err(e) => {
            sidecar.record_deployment(kind, subnet_id, Id::EMPTY);
            store.update_sidecar(&mut sidecar)?;
            return Err(e);
        }
    };

    sidecar.record_deployment(kind, subnet_id, blockchain_id);
    store.update_sidecar(&mut sidecar)?;
    log::info!("subnet {name} deployed to {kind}");

    print_deploy_results(out, network, &sidecar.name, subnet_id, vm_id, blockchain_id)?;

    Ok(DeployOutcome::Deployed {
        subnet_id,
        blockchain_id,
    })
}

pub fn print_deploy_results(
    out: &mut impl Write,
    network: &Network,
    chain_name: &str,
    subnet_id: Id,
    vm_id: Id,
    blockchain_id: Id,
) -> Result<()> {
    let rows = [
        ("Chain Name", chain_name.to_string()),
        ("Subnet ID", subnet_id.to_string()),
        ("VM ID", vm_id.to_string()),
        ("Blockchain ID", blockchain_id.to_string()),
        ("RPC URL", network.blockchain_rpc_url(&blockchain_id)),
        // the chain creation tx id is the blockchain id
        ("P-Chain TXID", blockchain_id.to_string()),
    ];
    writeln!(out)?;
    for (key, value) in rows {
        writeln!(out, "{key:<14} {value}")?;
    }
    Ok(())
}
