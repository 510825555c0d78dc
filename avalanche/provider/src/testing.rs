// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! In-memory node and deployer used by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use avalanche_api::address::ChainAddress;
use avalanche_api::codec::avax::{BaseTx, Utxo};
use avalanche_api::codec::pchain::{CreateChainTx, CreateSubnetTx, SignedTx, UnsignedTx};
use avalanche_api::codec::secp256k1fx::{
    Credential, Input, OutputOwners, EMPTY_SIGNATURE, SIGNATURE_LEN,
};
use avalanche_api::codec::{Encode, Tx};
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_api::ids::{Id, NodeId, ShortId};

use crate::manager::{MultisigTxResult, SubnetDeployer};
use crate::node::{Chain, NodeClient, TxFees, TxStatus, Validator};
use crate::validators::DEFAULT_STAKE_WEIGHT;

pub const AVAX_ASSET_ID: Id = Id::new([1u8; 32]);
pub const X_CHAIN_ID: Id = Id::new([2u8; 32]);

/// A `CreateSubnetTx` owned by `control_keys`.
pub fn create_subnet_tx(control_keys: &[ShortId], threshold: u32) -> SignedTx {
    Tx::new(UnsignedTx::CreateSubnet(CreateSubnetTx {
        base: BaseTx::default(),
        owner: OutputOwners::new(threshold, control_keys.to_vec()),
    }))
}

#[derive(Default)]
pub struct MockNode {
    pub rpc_version: u32,
    pub p_utxos: Vec<Utxo>,
    pub x_utxos: Vec<Utxo>,
    pub atomic_utxos: Vec<Utxo>,
    pub validators: Vec<NodeId>,
    /// `None` for subnets that are not elastic.
    pub supply: Option<u64>,
    pub txs: Mutex<HashMap<Id, Vec<u8>>>,
    pub issued: Mutex<Vec<Chain>>,
}

impl MockNode {
    pub fn with_tx(self, id: Id, tx: &SignedTx) -> Self {
        self.txs
            .lock()
            .expect("mock lock poisoned")
            .insert(id, tx.to_bytes().expect("mock tx encodes"));
        self
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn network_id(&self) -> Result<u32> {
        Ok(1337)
    }

    async fn blockchain_id(&self, _alias: &str) -> Result<Id> {
        Ok(X_CHAIN_ID)
    }

    async fn rpc_protocol_version(&self) -> Result<u32> {
        Ok(self.rpc_version)
    }

    async fn tx_fees(&self) -> Result<TxFees> {
        Ok(TxFees {
            tx_fee: 1_000,
            create_asset_tx_fee: 10_000,
            create_subnet_tx_fee: 100_000,
            transform_subnet_tx_fee: 1_000_000,
            create_blockchain_tx_fee: 100_000,
            add_subnet_validator_fee: 1_000,
        })
    }

    async fn avax_asset_id(&self) -> Result<Id> {
        Ok(AVAX_ASSET_ID)
    }

    async fn utxos(
        &self,
        chain: Chain,
        _addrs: &[ChainAddress],
        source_chain: Option<Chain>,
    ) -> Result<Vec<Utxo>> {
        Ok(match (chain, source_chain) {
            (Chain::P, None) => self.p_utxos.clone(),
            (Chain::P, Some(_)) => self.atomic_utxos.clone(),
            (Chain::X, _) => self.x_utxos.clone(),
        })
    }

    async fn issue_tx(&self, chain: Chain, tx_bytes: &[u8]) -> Result<Id> {
        let id = Id::of(tx_bytes);
        self.issued.lock().expect("mock lock poisoned").push(chain);
        self.txs
            .lock()
            .expect("mock lock poisoned")
            .insert(id, tx_bytes.to_vec());
        Ok(id)
    }

    async fn tx_status(&self, _chain: Chain, _tx_id: &Id) -> Result<TxStatus> {
        Ok(TxStatus::Accepted)
    }

    async fn get_tx(&self, tx_id: &Id) -> Result<Vec<u8>> {
        self.txs
            .lock()
            .expect("mock lock poisoned")
            .get(tx_id)
            .cloned()
            .ok_or_else(|| anyhow!("tx {tx_id} not found"))
    }

    async fn current_validators(&self, _subnet_id: &Id) -> Result<Vec<Validator>> {
        Ok(self
            .validators
            .iter()
            .map(|node_id| Validator {
                node_id: *node_id,
                weight: DEFAULT_STAKE_WEIGHT,
                ..Default::default()
            })
            .collect())
    }

    async fn current_supply(&self, subnet_id: &Id) -> Result<u64> {
        self.supply
            .ok_or_else(|| anyhow!("subnet {subnet_id} not found"))
    }

    async fn is_bootstrapped(&self, _chain: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Records the calls it receives and answers with fixed ids.
#[derive(Default)]
pub struct MockDeployer {
    pub calls: Mutex<Vec<&'static str>>,
    /// Whether multisig transactions come back fully signed.
    pub partially_signed: bool,
    /// A call that fails instead of answering.
    pub fail_on: Option<&'static str>,
}

impl MockDeployer {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        if self.fail_on == Some(call) {
            return Err(anyhow!("{call} failed"));
        }
        self.calls.lock().expect("mock lock poisoned").push(call);
        Ok(())
    }

    /// A chain creation whose subnet auth slots are all filled, or all empty when
    /// `partially_signed`.
    pub fn result(&self, id: &[u8], control_keys: &[ShortId], signers: &[ShortId]) -> MultisigTxResult {
        let mut sig_indices: Vec<u32> = signers
            .iter()
            .filter_map(|s| control_keys.iter().position(|c| c == s).map(|i| i as u32))
            .collect();
        sig_indices.sort();
        let mut tx = Tx::new(UnsignedTx::CreateChain(CreateChainTx {
            base: BaseTx::default(),
            subnet_id: Id::of(b"subnet"),
            chain_name: "mock".to_string(),
            vm_id: Id::EMPTY,
            fx_ids: vec![],
            genesis: vec![],
            subnet_auth: Input {
                sig_indices: sig_indices.clone(),
            },
        }));
        let auth_sig = if self.partially_signed {
            EMPTY_SIGNATURE
        } else {
            [1u8; SIGNATURE_LEN]
        };
        tx.creds = vec![
            Credential {
                sigs: vec![[1u8; SIGNATURE_LEN]],
            },
            Credential {
                sigs: vec![auth_sig; sig_indices.len()],
            },
        ];
        MultisigTxResult {
            fully_signed: !self.partially_signed,
            tx_id: Id::of(id),
            tx,
            remaining_signers: if self.partially_signed {
                signers.to_vec()
            } else {
                vec![]
            },
        }
    }
}

#[async_trait]
impl SubnetDeployer for MockDeployer {
    async fn deploy_subnet(&self, _control_keys: &[ShortId], _threshold: u32) -> Result<Id> {
        self.record("deploy_subnet")?;
        Ok(Id::of(b"subnet"))
    }

    async fn deploy_blockchain(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        _subnet_id: Id,
        _chain_name: &str,
        _vm_id: Id,
        _genesis: Vec<u8>,
    ) -> Result<MultisigTxResult> {
        self.record("deploy_blockchain")?;
        Ok(self.result(b"chain", control_keys, subnet_auth_keys))
    }

    async fn add_validator(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        _subnet_id: Id,
        _node_id: NodeId,
        _weight: u64,
        _start: u64,
        _duration: Duration,
    ) -> Result<MultisigTxResult> {
        self.record("add_validator")?;
        Ok(self.result(b"add", control_keys, subnet_auth_keys))
    }

    async fn remove_validator(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        _subnet_id: Id,
        _node_id: NodeId,
    ) -> Result<MultisigTxResult> {
        self.record("remove_validator")?;
        Ok(self.result(b"remove", control_keys, subnet_auth_keys))
    }

    async fn transform_subnet(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        _subnet_id: Id,
        _config: &ElasticSubnetConfig,
    ) -> Result<MultisigTxResult> {
        self.record("transform_subnet")?;
        Ok(self.result(b"transform", control_keys, subnet_auth_keys))
    }

    async fn transfer_subnet_ownership(
        &self,
        control_keys: &[ShortId],
        subnet_auth_keys: &[ShortId],
        _subnet_id: Id,
        _new_control_keys: &[ShortId],
        _new_threshold: u32,
    ) -> Result<MultisigTxResult> {
        self.record("transfer_subnet_ownership")?;
        Ok(self.result(b"transfer", control_keys, subnet_auth_keys))
    }

    async fn create_asset(
        &self,
        _name: &str,
        _symbol: &str,
        _denomination: u8,
        _holders: &[(ShortId, u64)],
    ) -> Result<Id> {
        self.record("create_asset")?;
        Ok(Id::of(b"asset"))
    }

    async fn export_to_p_chain(&self, _asset_id: Id, _owner: ShortId, _amount: u64) -> Result<Id> {
        self.record("export_to_p_chain")?;
        Ok(Id::of(b"export"))
    }

    async fn import_from_x_chain(&self, _owner: ShortId) -> Result<Id> {
        self.record("import_from_x_chain")?;
        Ok(Id::of(b"import"))
    }

    async fn sign(
        &self,
        tx: SignedTx,
        _subnet_auth_keys: &[ShortId],
        _subnet_id: Id,
    ) -> Result<SignedTx> {
        self.record("sign")?;
        Ok(tx)
    }

    async fn commit(&self, tx: &SignedTx) -> Result<Id> {
        self.record("commit")?;
        Ok(tx.id()?)
    }
}
