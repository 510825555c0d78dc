// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use avalanche_api::codec::pchain::SignedTx;
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_api::ids::{Id, NodeId, ShortId};

pub use builder::{sign_subnet_auth, ChainContext, SubnetAuth, TxBuilder};
pub use local::LocalDeployer;
pub use public::PublicDeployer;

pub mod builder;
mod local;
mod public;

/// Outcome of a transaction that may need more signatures than the local keychain holds.
#[derive(Debug, Clone)]
pub struct MultisigTxResult {
    /// Whether every credential is signed. Fully signed transactions have been committed.
    pub fully_signed: bool,
    /// The id of the committed tx, or of the signed part so far.
    pub tx_id: Id,
    pub tx: SignedTx,
    /// Subnet auth keys that still have to sign.
    pub remaining_signers: Vec<ShortId>,
}

/// Trait to build, sign and issue the transactions that create and manage a subnet.
#[async_trait]
pub trait SubnetDeployer: Send + Sync {
    /// Creates a subnet owned by `control_keys`, of which `threshold` have to sign changes.
    /// Returns the subnet id.
    async fn deploy_subnet(&self, control_keys: &[ShortId], threshold: u32) -> Result<Id>;

    /// Creates a blockchain in the subnet. The subnet auth keys are the control keys that
    /// authorize the creation.
    async fn deploy_blockchain(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        chain_name: &str,
        vm_id: Id,
        genesis: Vec<u8>,
    ) -> Result<MultisigTxResult>;

    /// Adds `node_id` as validator of the subnet from `start` (unix seconds) for `duration`.
    #[allow(clippy::too_many_arguments)]
    async fn add_validator(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        node_id: NodeId,
        weight: u64,
        start: u64,
        duration: Duration,
    ) -> Result<MultisigTxResult>;

    async fn remove_validator(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        node_id: NodeId,
    ) -> Result<MultisigTxResult>;

    /// Turns the subnet into an elastic one with the token `config.asset_id`.
    async fn transform_subnet(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        config: &ElasticSubnetConfig,
    ) -> Result<MultisigTxResult>;

    async fn transfer_subnet_ownership(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        new_control_keys: &[ShortId],
        new_threshold: u32,
    ) -> Result<MultisigTxResult>;

    /// Mints an X-Chain asset held by `holders`. The returned tx id is the asset id.
    async fn create_asset(
        &self,
        name: &str,
        symbol: &str,
        denomination: u8,
        holders: &[(ShortId, u64)],
    ) -> Result<Id>;

    async fn export_to_p_chain(&self, asset_id: Id, owner: ShortId, amount: u64) -> Result<Id>;

    async fn import_from_x_chain(&self, owner: ShortId) -> Result<Id>;

    /// Adds the signatures the keychain holds for `subnet_auth_keys` to a partially signed
    /// transaction of `subnet_id`.
    async fn sign(
        &self,
        tx: SignedTx,
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
    ) -> Result<SignedTx>;

    /// Issues a signed transaction and waits for its acceptance.
    async fn commit(&self, tx: &SignedTx) -> Result<Id>;
}
