// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Validator set and ownership changes of permissioned subnets.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use avalanche_api::ids::{Id, NodeId, ShortId};
use avalanche_api::network::{Network, NetworkKind};
use avalanche_api::sidecar::Sidecar;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::deploy::resolve_threshold;
use crate::join::is_node_validating_subnet;
use crate::manager::SubnetDeployer;
use crate::multisig::{
    check_output_path, get_owners, resolve_subnet_auth_keys, MultisigOutcome, PendingTx,
};
use crate::node::{NodeClient, Validator};
use crate::store::SubnetStore;

pub const DEFAULT_STAKE_WEIGHT: u64 = 20;
pub const MIN_STAKE_WEIGHT: u64 = 1;
pub const MAX_STAKE_WEIGHT: u64 = 100;
/// Lead time of the default start time on public networks.
pub const STAKING_START_LEAD_TIME: Duration = Duration::from_secs(5 * 60);
/// Lead time of the default start time on the local network.
pub const LOCAL_START_LEAD_TIME: Duration = Duration::from_secs(30);
/// An explicit start time must be at least this far in the future.
pub const STAKING_MINIMUM_LEAD_TIME: Duration = Duration::from_secs(25);
pub const DEFAULT_STAKE_DURATION: Duration = Duration::from_secs(14 * 24 * 3600);
pub const TIME_PARSE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

pub const NO_SUBNET_ID: &str =
    "failed to find the subnet ID for this subnet, has it been deployed/created on this network?";

pub fn default_start_time(kind: NetworkKind, now: DateTime<Utc>) -> DateTime<Utc> {
    let lead = match kind {
        NetworkKind::Local => LOCAL_START_LEAD_TIME,
        _ => STAKING_START_LEAD_TIME,
    };
    now + chrono::Duration::seconds(lead.as_secs() as i64)
}

/// Parses a UTC start time in the `YYYY-MM-DD hh:mm:ss` layout.
pub fn parse_start_time(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let start = NaiveDateTime::parse_from_str(s, TIME_PARSE_LAYOUT)
        .with_context(|| format!("invalid start time {s:?}, expected {TIME_PARSE_LAYOUT}"))?
        .and_utc();
    let min_lead = chrono::Duration::seconds(STAKING_MINIMUM_LEAD_TIME.as_secs() as i64);
    if start < now + min_lead {
        return Err(anyhow!(
            "time should be at least {}s in the future",
            STAKING_MINIMUM_LEAD_TIME.as_secs()
        ));
    }
    Ok(start)
}

/// Parses a staking period such as `90m`, `48h` or `14d`.
pub fn parse_staking_period(s: &str) -> Result<Duration> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow!("staking period {s:?} is missing a unit (m, h or d)"))?;
    let (amount, unit) = s.split_at(split);
    let amount: u64 = amount
        .parse()
        .with_context(|| format!("invalid staking period {s:?}"))?;
    let secs = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 24 * 3600,
        _ => return Err(anyhow!("unknown staking period unit {unit:?}")),
    };
    if amount == 0 {
        return Err(anyhow!("staking period must be positive"));
    }
    Ok(Duration::from_secs(amount * secs))
}

pub fn check_weight(weight: u64) -> Result<()> {
    if !(MIN_STAKE_WEIGHT..=MAX_STAKE_WEIGHT).contains(&weight) {
        return Err(anyhow!(
            "illegal weight, must be between {MIN_STAKE_WEIGHT} and {MAX_STAKE_WEIGHT} inclusive: {weight}"
        ));
    }
    Ok(())
}

fn deployed_subnet_id(sidecar: &Sidecar, kind: NetworkKind) -> Result<Id> {
    sidecar.subnet_id(kind).ok_or_else(|| anyhow!(NO_SUBNET_ID))
}

#[derive(Debug, Clone)]
pub struct AddValidatorRequest {
    pub subnet_name: String,
    pub node_id: NodeId,
    pub weight: u64,
    pub start: DateTime<Utc>,
    pub duration: Duration,
    pub subnet_auth_keys: Option<Vec<ShortId>>,
    pub output_tx_path: Option<PathBuf>,
}

#[allow(clippy::too_many_arguments)]
pub async fn add_validator(
    out: &mut (impl Write + Send),
    store: &SubnetStore,
    deployer: &dyn SubnetDeployer,
    node: &dyn NodeClient,
    network: &Network,
    keychain: &[ShortId],
    request: AddValidatorRequest,
) -> Result<MultisigOutcome> {
    let kind = network.kind();
    let sidecar = store.load_sidecar(&request.subnet_name)?;
    let subnet_id = deployed_subnet_id(&sidecar, kind)?;
    check_output_path(request.output_tx_path.as_deref())?;
    check_weight(request.weight)?;

    let (control_keys, threshold) = get_owners(node, &sidecar, kind, subnet_id).await?;
    let subnet_auth_keys =
        resolve_subnet_auth_keys(keychain, request.subnet_auth_keys, &control_keys, threshold)?;

    let end = request.start + chrono::Duration::from_std(request.duration)?;
    writeln!(out, "NodeID: {}", request.node_id)?;
    writeln!(out, "Network: {network}")?;
    writeln!(out, "Start time: {}", request.start.format(TIME_PARSE_LAYOUT))?;
    writeln!(out, "End time: {}", end.format(TIME_PARSE_LAYOUT))?;
    writeln!(out, "Weight: {}", request.weight)?;
    writeln!(
        out,
        "Inputs complete, issuing transaction to add the provided validator information..."
    )?;

    let start = u64::try_from(request.start.timestamp()).context("start time before 1970")?;
    let result = deployer
        .add_validator(
            &control_keys,
            &subnet_auth_keys,
            subnet_id,
            request.node_id,
            request.weight,
            start,
            request.duration,
        )
        .await?;

    let outcome = PendingTx {
        subnet_name: &request.subnet_name,
        control_keys: &control_keys,
        subnet_auth_keys: &subnet_auth_keys,
        network_id: network.id(),
        output_path: request.output_tx_path.as_deref(),
    }
    .settle(out, result)?;
    if let MultisigOutcome::Committed(tx_id) = &outcome {
        log::info!("validator {} added to {subnet_id} in tx {tx_id}", request.node_id);
        writeln!(out, "Validator added, transaction ID: {tx_id}")?;
    }
    Ok(outcome)
}

#[derive(Debug, Clone)]
pub struct RemoveValidatorRequest {
    pub subnet_name: String,
    pub node_id: NodeId,
    pub subnet_auth_keys: Option<Vec<ShortId>>,
    pub output_tx_path: Option<PathBuf>,
}

#[allow(clippy::too_many_arguments)]
pub async fn remove_validator(
    out: &mut (impl Write + Send),
    store: &SubnetStore,
    deployer: &dyn SubnetDeployer,
    node: &dyn NodeClient,
    network: &Network,
    keychain: &[ShortId],
    request: RemoveValidatorRequest,
) -> Result<MultisigOutcome> {
    let kind = network.kind();
    let sidecar = store.load_sidecar(&request.subnet_name)?;
    let subnet_id = deployed_subnet_id(&sidecar, kind)?;
    check_output_path(request.output_tx_path.as_deref())?;

    let (control_keys, threshold) = get_owners(node, &sidecar, kind, subnet_id).await?;
    let subnet_auth_keys =
        resolve_subnet_auth_keys(keychain, request.subnet_auth_keys, &control_keys, threshold)?;
    writeln!(
        out,
        "Your subnet auth keys for remove validator tx creation: {subnet_auth_keys:?}"
    )?;

    if !is_node_validating_subnet(node, &subnet_id, &request.node_id).await? {
        return Err(anyhow!(
            "node {} is not a validator of subnet {subnet_id}",
            request.node_id
        ));
    }

    writeln!(out, "NodeID: {}", request.node_id)?;
    writeln!(out, "Network: {network}")?;
    writeln!(
        out,
        "Inputs complete, issuing transaction to remove the specified validator..."
    )?;

    let result = deployer
        .remove_validator(&control_keys, &subnet_auth_keys, subnet_id, request.node_id)
        .await?;
    let outcome = PendingTx {
        subnet_name: &request.subnet_name,
        control_keys: &control_keys,
        subnet_auth_keys: &subnet_auth_keys,
        network_id: network.id(),
        output_path: request.output_tx_path.as_deref(),
    }
    .settle(out, result)?;
    if let MultisigOutcome::Committed(tx_id) = &outcome {
        log::info!("validator {} removed from {subnet_id} in tx {tx_id}", request.node_id);
        writeln!(out, "Validator removed")?;
    }
    Ok(outcome)
}

#[derive(Debug, Clone)]
pub struct TransferOwnershipRequest {
    pub subnet_name: String,
    pub new_control_keys: Vec<ShortId>,
    /// 0 for all of the new control keys.
    pub new_threshold: u32,
    pub subnet_auth_keys: Option<Vec<ShortId>>,
    pub output_tx_path: Option<PathBuf>,
}

/// Replaces the owners of a subnet. The tx id is recorded in the sidecar so later owner lookups
/// read the new owners.
#[allow(clippy::too_many_arguments)]
pub async fn transfer_ownership(
    out: &mut (impl Write + Send),
    store: &SubnetStore,
    deployer: &dyn SubnetDeployer,
    node: &dyn NodeClient,
    network: &Network,
    keychain: &[ShortId],
    request: TransferOwnershipRequest,
) -> Result<MultisigOutcome> {
    let kind = network.kind();
    let mut sidecar = store.load_sidecar(&request.subnet_name)?;
    let subnet_id = deployed_subnet_id(&sidecar, kind)?;
    check_output_path(request.output_tx_path.as_deref())?;

    let mut new_control_keys = request.new_control_keys.clone();
    new_control_keys.sort();
    new_control_keys.dedup();
    if new_control_keys.is_empty() {
        return Err(anyhow!("no new control keys given"));
    }
    let new_threshold = resolve_threshold(request.new_threshold, new_control_keys.len())?;

    let (control_keys, threshold) = get_owners(node, &sidecar, kind, subnet_id).await?;
    let subnet_auth_keys =
        resolve_subnet_auth_keys(keychain, request.subnet_auth_keys, &control_keys, threshold)?;

    let result = deployer
        .transfer_subnet_ownership(
            &control_keys,
            &subnet_auth_keys,
            subnet_id,
            &new_control_keys,
            new_threshold,
        )
        .await?;
    let outcome = PendingTx {
        subnet_name: &request.subnet_name,
        control_keys: &control_keys,
        subnet_auth_keys: &subnet_auth_keys,
        network_id: network.id(),
        output_path: request.output_tx_path.as_deref(),
    }
    .settle(out, result)?;

    if let MultisigOutcome::Committed(tx_id) = &outcome {
        sidecar.record_ownership_transfer(kind, *tx_id);
        store.update_sidecar(&mut sidecar)?;
        log::info!("ownership of {subnet_id} transferred in tx {tx_id}");
        writeln!(out, "Subnet ownership transferred, transaction ID: {tx_id}")?;
    }
    Ok(outcome)
}

/// The current validators of the subnet `subnet_name` on `kind`.
pub async fn list_validators(
    store: &SubnetStore,
    node: &dyn NodeClient,
    kind: NetworkKind,
    subnet_name: &str,
) -> Result<Vec<Validator>> {
    let sidecar = store.load_sidecar(subnet_name)?;
    let subnet_id = deployed_subnet_id(&sidecar, kind)?;
    node.current_validators(&subnet_id)
        .await
        .context("failed to query the current validators")
}

/// Stake and validation period of each validator.
pub fn print_validators(out: &mut impl Write, validators: &[Validator]) -> Result<()> {
    writeln!(
        out,
        "{:<44} {:<14} {:<18} {:<26} {}",
        "NODE ID", "STAKE AMOUNT", "DELEGATOR WEIGHT", "START TIME", "END TIME"
    )?;
    for v in validators {
        writeln!(
            out,
            "{:<44} {:<14} {:<18} {:<26} {}",
            v.node_id.to_string(),
            v.weight,
            v.delegator_weight.unwrap_or_default(),
            format_unix_time(v.start_time),
            format_unix_time(v.end_time)
        )?;
    }
    Ok(())
}

/// Connection state, total weight and remaining validation time of each validator.
pub fn print_stats(
    out: &mut impl Write,
    validators: &[Validator],
    now: DateTime<Utc>,
) -> Result<()> {
    if validators.is_empty() {
        writeln!(out, "No current validators found.")?;
        return Ok(());
    }
    writeln!(out, "{:<44} {:<10} {:<14} {}", "NODE ID", "CONNECTED", "WEIGHT", "REMAINING")?;
    let now = u64::try_from(now.timestamp()).unwrap_or_default();
    for v in validators {
        let connected = v
            .connected
            .map(|c| c.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        writeln!(
            out,
            "{:<44} {:<10} {:<14} {}",
            v.node_id.to_string(),
            connected,
            v.total_weight(),
            format_remaining(v.end_time.saturating_sub(now))
        )?;
    }
    Ok(())
}

const NOT_AVAILABLE: &str = "n/a";

fn format_unix_time(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Whole days, hours and minutes.
fn format_remaining(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3600;
    let minutes = secs % 3600 / 60;
    format!("{days}d {hours}h {minutes}m")
}
