// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Subnet auth keys and transactions that need signatures from more than one party.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use avalanche_api::address::ChainAddress;
use avalanche_api::codec::pchain::{SignedTx, UnsignedTx};
use avalanche_api::codec::secp256k1fx::EMPTY_SIGNATURE;
use avalanche_api::ids::{Id, ShortId};
use avalanche_api::network::NetworkKind;
use avalanche_api::sidecar::Sidecar;
use thiserror::Error;

use crate::manager::MultisigTxResult;
use crate::node::NodeClient;
use crate::store::write_file;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultisigError {
    #[error("number of given subnet auth differs from the threshold")]
    ThresholdMismatch,
    #[error("subnet auth key {0} does not belong to control keys")]
    NotAControlKey(String),
    #[error("none of the given subnet auth keys belongs to the local keychain")]
    NoLocalAuthKey,
    #[error("signer index {0} exceeds number of control keys")]
    SignerIndexOutOfRange(u32),
    #[error("unexpected unsigned tx type {0}")]
    NoSubnetAuth(String),
    #[error("expected at least 2 credentials, got {0}")]
    MissingCredentials(usize),
    #[error("expected funding sig {sig} of cred {cred} to be filled")]
    UnsignedFunding { cred: usize, sig: usize },
    #[error("expected number of cred's signatures {sigs} to equal number of auth signers {signers}")]
    AuthSignersMismatch { sigs: usize, signers: usize },
}

/// Checks that `subnet_auth_keys` can authorize a change of a subnet owned by `control_keys`.
/// With `keychain_keys`, at least one of the auth keys must be held locally.
pub fn check_subnet_auth_keys(
    keychain_keys: Option<&[ShortId]>,
    subnet_auth_keys: &[ShortId],
    control_keys: &[ShortId],
    threshold: u32,
) -> Result<(), MultisigError> {
    if subnet_auth_keys.len() != threshold as usize {
        return Err(MultisigError::ThresholdMismatch);
    }
    if let Some(k) = subnet_auth_keys.iter().find(|k| !control_keys.contains(k)) {
        return Err(MultisigError::NotAControlKey(k.to_string()));
    }
    if let Some(keychain) = keychain_keys {
        if !subnet_auth_keys.iter().any(|k| keychain.contains(k)) {
            return Err(MultisigError::NoLocalAuthKey);
        }
    }
    Ok(())
}

/// Picks `threshold` control keys to authorize a change, preferring the ones the keychain holds.
pub fn select_subnet_auth_keys(
    keychain_keys: &[ShortId],
    control_keys: &[ShortId],
    threshold: u32,
) -> Vec<ShortId> {
    if control_keys.len() == threshold as usize {
        return control_keys.to_vec();
    }
    let (local, others): (Vec<ShortId>, Vec<ShortId>) = control_keys
        .iter()
        .partition(|k| keychain_keys.contains(k));

    let mut selected = Vec::with_capacity(threshold as usize);
    for key in local.into_iter().chain(others) {
        if selected.len() == threshold as usize {
            break;
        }
        if !selected.contains(&key) {
            selected.push(key);
        }
    }
    selected
}

/// The explicit auth keys after checking them, or a selection from the control keys.
pub fn resolve_subnet_auth_keys(
    keychain_keys: &[ShortId],
    given: Option<Vec<ShortId>>,
    control_keys: &[ShortId],
    threshold: u32,
) -> Result<Vec<ShortId>, MultisigError> {
    match given {
        Some(keys) => {
            check_subnet_auth_keys(Some(keychain_keys), &keys, control_keys, threshold)?;
            Ok(keys)
        }
        None => Ok(select_subnet_auth_keys(keychain_keys, control_keys, threshold)),
    }
}

/// The control keys that have to sign the subnet auth credential of `tx`, in slot order.
pub fn get_auth_signers(
    tx: &SignedTx,
    control_keys: &[ShortId],
) -> Result<Vec<ShortId>, MultisigError> {
    let auth = tx
        .unsigned
        .subnet_auth()
        .ok_or_else(|| MultisigError::NoSubnetAuth(tx.unsigned.kind().to_string()))?;
    auth.sig_indices
        .iter()
        .map(|i| {
            control_keys
                .get(*i as usize)
                .copied()
                .ok_or(MultisigError::SignerIndexOutOfRange(*i))
        })
        .collect()
}

/// The auth signers whose signature slot is still empty. Funding credentials must all be signed.
pub fn get_remaining_signers(
    tx: &SignedTx,
    control_keys: &[ShortId],
) -> Result<Vec<ShortId>, MultisigError> {
    let signers = get_auth_signers(tx, control_keys)?;
    let Some((auth_cred, funding)) = tx.creds.split_last().filter(|_| tx.creds.len() >= 2) else {
        return Err(MultisigError::MissingCredentials(tx.creds.len()));
    };
    for (cred, c) in funding.iter().enumerate() {
        if let Some(sig) = c.sigs.iter().position(|s| *s == EMPTY_SIGNATURE) {
            return Err(MultisigError::UnsignedFunding { cred, sig });
        }
    }
    if auth_cred.sigs.len() != signers.len() {
        return Err(MultisigError::AuthSignersMismatch {
            sigs: auth_cred.sigs.len(),
            signers: signers.len(),
        });
    }
    Ok(auth_cred
        .sigs
        .iter()
        .zip(signers)
        .filter(|(sig, _)| **sig == EMPTY_SIGNATURE)
        .map(|(_, signer)| signer)
        .collect())
}

/// A subnet creation is always ready, other transactions once every auth signer has signed.
pub fn is_ready_to_commit(tx: &SignedTx, control_keys: &[ShortId]) -> Result<bool, MultisigError> {
    if matches!(tx.unsigned, UnsignedTx::CreateSubnet(_)) {
        return Ok(true);
    }
    Ok(get_remaining_signers(tx, control_keys)?.is_empty())
}

/// The current control keys and threshold of a subnet. A recorded ownership transfer takes
/// precedence over the subnet creation.
pub async fn get_owners(
    node: &(impl NodeClient + ?Sized),
    sidecar: &Sidecar,
    network: NetworkKind,
    subnet_id: Id,
) -> Result<(Vec<ShortId>, u32)> {
    let owner_tx_id = sidecar.ownership_transfer_tx(network).unwrap_or(subnet_id);
    let bytes = node
        .get_tx(&owner_tx_id)
        .await
        .with_context(|| format!("subnet tx {owner_tx_id} query error"))?;
    let tx = <SignedTx as avalanche_api::codec::Decode>::from_bytes(&bytes)
        .with_context(|| format!("couldn't unmarshal tx {owner_tx_id}"))?;
    let owner = tx.unsigned.owner().ok_or_else(|| {
        anyhow!(
            "got unexpected type {} for subnet owners tx {owner_tx_id}",
            tx.unsigned.kind()
        )
    })?;
    Ok((owner.addrs.clone(), owner.threshold))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultisigOutcome {
    Committed(Id),
    /// Saved to the path for offline signing.
    Pending(PathBuf),
}

/// Where a subnet changing transaction ends up: committed, or saved to `output_path` when it
/// still misses signatures.
pub struct PendingTx<'a> {
    pub subnet_name: &'a str,
    pub control_keys: &'a [ShortId],
    pub subnet_auth_keys: &'a [ShortId],
    pub network_id: u32,
    pub output_path: Option<&'a Path>,
}

impl PendingTx<'_> {
    pub fn settle(&self, out: &mut impl Write, result: MultisigTxResult) -> Result<MultisigOutcome> {
        if result.fully_signed {
            return Ok(MultisigOutcome::Committed(result.tx_id));
        }
        let kind = result.tx.unsigned.kind();
        let path = self.output_path.ok_or_else(|| {
            anyhow!("the {kind} tx is not fully signed, set an output tx path to save it")
        })?;
        save_not_fully_signed_tx(
            out,
            &result.tx,
            self.subnet_name,
            self.control_keys,
            self.subnet_auth_keys,
            self.network_id,
            path,
            false,
        )?;
        Ok(MultisigOutcome::Pending(path.to_path_buf()))
    }
}

/// Fails early when a partially signed tx could not be saved to `path`.
pub fn check_output_path(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) if path.exists() => Err(anyhow!("output tx path {path:?} already exists")),
        _ => Ok(()),
    }
}

pub fn load_tx(path: &Path) -> Result<SignedTx> {
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tx file {path:?}"))?;
    SignedTx::from_hex(&hex).with_context(|| format!("failed to decode tx file {path:?}"))
}

/// Writes `tx` to `path` as checksummed hex.
pub fn save_tx(tx: &SignedTx, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!("output file {path:?} already exists"));
    }
    write_file(path, tx.to_hex()?.as_bytes())
}

/// Saves a partially signed transaction and tells the user how to continue.
#[allow(clippy::too_many_arguments)]
pub fn save_not_fully_signed_tx(
    out: &mut impl Write,
    tx: &SignedTx,
    subnet_name: &str,
    control_keys: &[ShortId],
    subnet_auth_keys: &[ShortId],
    network_id: u32,
    output_path: &Path,
    force: bool,
) -> Result<()> {
    let remaining = get_remaining_signers(tx, control_keys)?;
    let required = subnet_auth_keys.len();
    let signed = required.saturating_sub(remaining.len());
    let kind = tx.unsigned.kind();

    writeln!(out)?;
    if signed == required {
        writeln!(
            out,
            "All {required} required {kind} signatures have been signed. Saving tx to disk to enable commit."
        )?;
    } else {
        writeln!(
            out,
            "{signed} of {required} required {kind} signatures have been signed. Saving tx to disk to enable remaining signing."
        )?;
    }
    if force {
        writeln!(out)?;
        writeln!(out, "Overwriting {}", output_path.display())?;
    }
    save_tx(tx, output_path, force)?;

    writeln!(out)?;
    if signed == required {
        writeln!(out, "Tx is fully signed, and ready to be committed")?;
        writeln!(out)?;
        writeln!(out, "Commit command:")?;
        writeln!(
            out,
            "  avalanche transaction commit {subnet_name} --input-tx-filepath {}",
            output_path.display()
        )?;
    } else {
        writeln!(out, "Addresses remaining to sign the tx")?;
        for key in &remaining {
            writeln!(out, "  {}", ChainAddress::p_chain(network_id, *key))?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "Choose a stored key and run the signing command, or send {:?} to another user for signing.",
            output_path.display().to_string()
        )?;
        writeln!(out)?;
        writeln!(out, "Signing command:")?;
        writeln!(
            out,
            "  avalanche transaction sign {subnet_name} --input-tx-filepath {}",
            output_path.display()
        )?;
    }
    Ok(())
}
