// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Request results of the node APIs. Integers are sent as decimal strings.

use avalanche_api::ids::{Id, NodeId};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// The static fees of the network, in nAVAX.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxFees {
    #[serde_as(as = "DisplayFromStr")]
    pub tx_fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub create_asset_tx_fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub create_subnet_tx_fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub transform_subnet_tx_fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub create_blockchain_tx_fee: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub add_subnet_validator_fee: u64,
}

impl TxFees {
    /// What an elastic transformation costs: the asset creation, the transformation, and the
    /// export and import of the token.
    pub fn elastic_transformation(&self) -> u64 {
        self.create_asset_tx_fee + self.transform_subnet_tx_fee + 2 * self.tx_fee
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockchainIdResponse {
    #[serde(rename = "blockchainID")]
    pub blockchain_id: Id,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct NodeVersionResponse {
    #[serde(rename = "rpcProtocolVersion")]
    #[serde_as(as = "DisplayFromStr")]
    pub rpc_protocol_version: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetDescriptionResponse {
    #[serde(rename = "assetID")]
    pub asset_id: Id,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UtxoIndex {
    pub address: String,
    pub utxo: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct GetUtxosResponse {
    #[serde(rename = "numFetched")]
    #[serde_as(as = "DisplayFromStr")]
    pub num_fetched: u32,
    pub utxos: Vec<String>,
    #[serde(rename = "endIndex", default)]
    pub end_index: UtxoIndex,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueTxResponse {
    #[serde(rename = "txID")]
    pub tx_id: Id,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TxStatusResponse {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetTxResponse {
    pub tx: String,
}

/// A current validator of a subnet. Times are unix seconds.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Validator {
    #[serde(rename = "nodeID")]
    pub node_id: NodeId,
    #[serde_as(as = "DisplayFromStr")]
    pub start_time: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub end_time: u64,
    /// Staked amount on elastic subnets, weight on permissioned ones.
    #[serde(alias = "stakeAmount")]
    #[serde_as(as = "DisplayFromStr")]
    pub weight: u64,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub delegator_weight: Option<u64>,
    pub connected: Option<bool>,
}

impl Validator {
    /// Own weight plus the weight delegated to the validator.
    pub fn total_weight(&self) -> u64 {
        self.weight.saturating_add(self.delegator_weight.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentValidatorsResponse {
    pub validators: Vec<Validator>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentSupplyResponse {
    #[serde_as(as = "DisplayFromStr")]
    pub supply: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IsBootstrappedResponse {
    #[serde(rename = "isBootstrapped")]
    pub is_bootstrapped: bool,
}
