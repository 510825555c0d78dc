// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use avalanche_api::address::{ChainAddress, X_CHAIN_ALIAS};
use avalanche_api::codec::avax::Utxo;
use avalanche_api::codec::pchain::{SignedTx, SubnetValidator};
use avalanche_api::codec::secp256k1fx::{OutputOwners, TransferOutput, EMPTY_SIGNATURE};
use avalanche_api::codec::Encode;
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_api::ids::{Id, NodeId, ShortId};
use avalanche_api::network::Network;
use avalanche_wallet::Keychain;

use super::builder::{sign_subnet_auth, ChainContext, SubnetAuth, TxBuilder};
use super::{MultisigTxResult, SubnetDeployer};
use crate::node::{wait_for_acceptance, Chain, NodeClient};

/// Deploys through the node API of any network, paying and signing with a keychain.
pub struct PublicDeployer {
    network: Network,
    node: Arc<dyn NodeClient>,
    keychain: Keychain,
}

impl PublicDeployer {
    pub fn new(network: Network, node: Arc<dyn NodeClient>, keychain: Keychain) -> Self {
        Self {
            network,
            node,
            keychain,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn node(&self) -> &Arc<dyn NodeClient> {
        &self.node
    }

    pub fn keychain(&self) -> &Keychain {
        &self.keychain
    }

    async fn context(&self) -> Result<ChainContext> {
        Ok(ChainContext {
            network_id: self.network.id(),
            x_chain_id: self.node.blockchain_id(X_CHAIN_ALIAS).await?,
            avax_asset_id: self.node.avax_asset_id().await?,
            fees: self.node.tx_fees().await?,
        })
    }

    fn addresses(&self, chain: Chain) -> Vec<ChainAddress> {
        self.keychain
            .addresses()
            .into_iter()
            .map(|id| ChainAddress::new(chain.as_ref(), self.network.hrp(), id))
            .collect()
    }

    async fn utxos(&self, chain: Chain, source: Option<Chain>) -> Result<Vec<Utxo>> {
        self.node
            .utxos(chain, &self.addresses(chain), source)
            .await
    }

    async fn issue(&self, chain: Chain, bytes: Vec<u8>) -> Result<Id> {
        let tx_id = self.node.issue_tx(chain, &bytes).await?;
        log::info!("issued tx {tx_id} on the {chain}-Chain");
        wait_for_acceptance(self.node.as_ref(), chain, &tx_id).await?;
        Ok(tx_id)
    }

    /// Commits `tx` when the keychain could sign all of it, otherwise hands it back for offline
    /// signing.
    async fn finish(&self, tx: SignedTx, auth: &SubnetAuth) -> Result<MultisigTxResult> {
        let remaining_signers = tx
            .creds
            .last()
            .map(|cred| {
                cred.sigs
                    .iter()
                    .zip(auth.signers())
                    .filter(|(sig, _)| **sig == EMPTY_SIGNATURE)
                    .map(|(_, addr)| *addr)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let fully_signed = tx.creds.iter().all(|c| c.is_fully_signed());

        let tx_id = if fully_signed {
            self.commit(&tx).await?
        } else {
            tx.id()?
        };
        Ok(MultisigTxResult {
            fully_signed,
            tx_id,
            tx,
            remaining_signers,
        })
    }
}

#[async_trait]
impl SubnetDeployer for PublicDeployer {
    async fn deploy_subnet(&self, control_keys: &[ShortId], threshold: u32) -> Result<Id> {
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::P, None).await?;
        let owner = OutputOwners::new(threshold, control_keys.to_vec());
        let tx = TxBuilder::new(&ctx, &self.keychain).create_subnet(&utxos, owner)?;
        let subnet_id = self.commit(&tx).await?;
        log::info!("subnet {subnet_id} created on {}", self.network);
        Ok(subnet_id)
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
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::P, None).await?;
        let auth = SubnetAuth::new(control_keys, subnet_auth_keys)?;
        let tx = TxBuilder::new(&ctx, &self.keychain).create_chain(
            &utxos, subnet_id, chain_name, vm_id, genesis, &auth,
        )?;
        self.finish(tx, &auth).await
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
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::P, None).await?;
        let auth = SubnetAuth::new(control_keys, subnet_auth_keys)?;
        let validator = SubnetValidator {
            node_id,
            start,
            end: start + duration.as_secs(),
            weight,
            subnet_id,
        };
        let tx = TxBuilder::new(&ctx, &self.keychain).add_subnet_validator(
            &utxos, validator, &auth,
        )?;
        self.finish(tx, &auth).await
    }

    async fn remove_validator(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        node_id: NodeId,
    ) -> Result<MultisigTxResult> {
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::P, None).await?;
        let auth = SubnetAuth::new(control_keys, subnet_auth_keys)?;
        let tx = TxBuilder::new(&ctx, &self.keychain).remove_subnet_validator(
            &utxos, node_id, subnet_id, &auth,
        )?;
        self.finish(tx, &auth).await
    }

    async fn transform_subnet(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        config: &ElasticSubnetConfig,
    ) -> Result<MultisigTxResult> {
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::P, None).await?;
        let auth = SubnetAuth::new(control_keys, subnet_auth_keys)?;
        let tx = TxBuilder::new(&ctx, &self.keychain).transform_subnet(
            &utxos, subnet_id, config, &auth,
        )?;
        self.finish(tx, &auth).await
    }

    async fn transfer_subnet_ownership(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
        new_control_keys: &[ShortId],
        new_threshold: u32,
    ) -> Result<MultisigTxResult> {
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::P, None).await?;
        let auth = SubnetAuth::new(control_keys, subnet_auth_keys)?;
        let owner = OutputOwners::new(new_threshold, new_control_keys.to_vec());
        let tx = TxBuilder::new(&ctx, &self.keychain).transfer_subnet_ownership(
            &utxos, subnet_id, owner, &auth,
        )?;
        self.finish(tx, &auth).await
    }

    async fn create_asset(
        &self,
        name: &str,
        symbol: &str,
        denomination: u8,
        holders: &[(ShortId, u64)],
    ) -> Result<Id> {
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::X, None).await?;
        let holders = holders
            .iter()
            .map(|(addr, amount)| TransferOutput {
                amount: *amount,
                owners: OutputOwners::new(1, vec![*addr]),
            })
            .collect();
        let tx = TxBuilder::new(&ctx, &self.keychain).create_asset(
            &utxos,
            name,
            symbol,
            denomination,
            holders,
        )?;
        self.issue(Chain::X, tx.to_bytes()?).await
    }

    async fn export_to_p_chain(&self, asset_id: Id, owner: ShortId, amount: u64) -> Result<Id> {
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::X, None).await?;
        let tx = TxBuilder::new(&ctx, &self.keychain).export_to_p_chain(
            &utxos,
            asset_id,
            amount,
            OutputOwners::new(1, vec![owner]),
        )?;
        self.issue(Chain::X, tx.to_bytes()?).await
    }

    async fn import_from_x_chain(&self, owner: ShortId) -> Result<Id> {
        let ctx = self.context().await?;
        let utxos = self.utxos(Chain::P, None).await?;
        let atomic = self.utxos(Chain::P, Some(Chain::X)).await?;
        let tx = TxBuilder::new(&ctx, &self.keychain).import_from_x_chain(
            &utxos,
            &atomic,
            OutputOwners::new(1, vec![owner]),
        )?;
        self.issue(Chain::P, tx.to_bytes()?).await
    }

    async fn sign(
        &self,
        mut tx: SignedTx,
        subnet_auth_keys: &[ShortId],
        subnet_id: Id,
    ) -> Result<SignedTx> {
        if !subnet_auth_keys.iter().any(|k| self.keychain.contains(k)) {
            return Err(anyhow!("auth wallet does not contain subnet auth keys"));
        }
        if tx.unsigned.subnet_id() != Some(subnet_id) {
            return Err(anyhow!("tx does not modify subnet {subnet_id}"));
        }
        let signed = sign_subnet_auth(&self.keychain, &mut tx, subnet_auth_keys)?;
        log::debug!("added {signed} subnet auth signatures");
        Ok(tx)
    }

    async fn commit(&self, tx: &SignedTx) -> Result<Id> {
        self.issue(Chain::P, tx.to_bytes()?).await
    }
}
