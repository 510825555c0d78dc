// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use avalanche_api::codec::pchain::SignedTx;
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_api::ids::{Id, NodeId, ShortId};
use avalanche_api::network::Network;
use avalanche_wallet::{Keychain, SoftKey};

use super::public::PublicDeployer;
use super::{MultisigTxResult, SubnetDeployer};
use crate::node::{NodeClient, TX_ACCEPTANCE_TIMEOUT, TX_POLL_INTERVAL};

/// Deploys to the local network, paying with the pre-funded ewoq key.
pub struct LocalDeployer {
    inner: PublicDeployer,
}

impl LocalDeployer {
    pub fn new(node: Arc<dyn NodeClient>) -> Result<Self> {
        Self::with_network(Network::local(), node)
    }

    pub fn with_network(network: Network, node: Arc<dyn NodeClient>) -> Result<Self> {
        let keychain = Keychain::new([SoftKey::ewoq()?]);
        Ok(Self {
            inner: PublicDeployer::new(network, node, keychain),
        })
    }

    /// The address of the ewoq key, the default control key of local subnets.
    pub fn ewoq_address(&self) -> Option<ShortId> {
        self.inner.keychain().addresses().first().copied()
    }

    /// Fails unless the local node speaks `rpc_version`.
    pub async fn check_rpc_version(&self, rpc_version: u32) -> Result<()> {
        let running = self.inner.node().rpc_protocol_version().await?;
        if running != rpc_version {
            return Err(anyhow!(
                "the local node uses RPC version {running} but the subnet requires {rpc_version}"
            ));
        }
        Ok(())
    }

    async fn wait_for_bootstrap(&self, blockchain_id: &Id) -> Result<()> {
        let started = tokio::time::Instant::now();
        let chain = blockchain_id.to_string();
        while !self.inner.node().is_bootstrapped(&chain).await? {
            if started.elapsed() >= TX_ACCEPTANCE_TIMEOUT {
                return Err(anyhow!("timeout waiting for blockchain {chain} to bootstrap"));
            }
            tokio::time::sleep(TX_POLL_INTERVAL).await;
        }
        log::info!("blockchain {chain} bootstrapped");
        Ok(())
    }
}

#[async_trait]
impl SubnetDeployer for LocalDeployer {
    async fn deploy_subnet(&self, control_keys: &[ShortId], threshold: u32) -> Result<Id> {
        self.inner.deploy_subnet(control_keys, threshold).await
    }

    async fn deploy_blockchain(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        chain_name: &str,
        vm_id: Id,
        genesis: Vec<u8>,
    ) -> Result<MultisigTxResult> {
        let result = self
            .inner
            .deploy_blockchain(
                control_keys,
                subnet_auth_keys,
                subnet_id,
                chain_name,
                vm_id,
                genesis,
            )
            .await?;
        if result.fully_signed {
            self.wait_for_bootstrap(&result.tx_id).await?;
        }
        Ok(result)
    }

    async fn add_validator(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        node_id: NodeId,
        weight: u64,
        start: u64,
        duration: Duration,
    ) -> Result<MultisigTxResult> {
        self.inner
            .add_validator(
                control_keys,
                subnet_auth_keys,
                subnet_id,
                node_id,
                weight,
                start,
                duration,
            )
            .await
    }

    async fn remove_validator(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        node_id: NodeId,
    ) -> Result<MultisigTxResult> {
        self.inner
            .remove_validator(control_keys, subnet_auth_keys, subnet_id, node_id)
            .await
    }

    async fn transform_subnet(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        config: &ElasticSubnetConfig,
    ) -> Result<MultisigTxResult> {
        self.inner
            .transform_subnet(control_keys, subnet_auth_keys, subnet_id, config)
            .await
    }

    async fn transfer_subnet_ownership(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        new_control_keys: &[ShortId],
        new_threshold: u32,
    ) -> Result<MultisigTxResult> {
        self.inner
            .transfer_subnet_ownership(
                control_keys,
                subnet_auth_keys,
                subnet_id,
                new_control_keys,
                new_threshold,
            )
            .await
    }

    async fn create_asset(
        &self,
        name: &str,
        symbol: &str,
        denomination: u8,
        holders: &[(ShortId, u64)],
    ) -> Result<Id> {
        self.inner
            .create_asset(name, symbol, denomination, holders)
            .await
    }

    async fn export_to_p_chain(&self, asset_id: Id, owner: ShortId, amount: u64) -> Result<Id> {
        self.inner.export_to_p_chain(asset_id, owner, amount).await
    }

    async fn import_from_x_chain(&self, owner: ShortId) -> Result<Id> {
        self.inner.import_from_x_chain(owner).await
    }

    async fn sign(
        &self,
        tx: SignedTx,
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
    ) -> Result<SignedTx> {
        self.inner.sign(tx, subnet_auth_keys, subnet_id).await
    }

    async fn commit(&self, tx: &SignedTx) -> Result<Id> {
        self.inner.commit(tx).await
    }
}
