// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! The sidecar: the per-subnet metadata record kept next to the genesis file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::ids::Id;
use crate::network::NetworkKind;

/// Version stamped into every sidecar on write.
pub const SIDECAR_VERSION: &str = "1.4.0";
pub const DEFAULT_TOKEN_NAME: &str = "TEST";

/// Step names of the elastic transformation log.
pub const CREATE_ASSET_TX: &str = "CreateAssetTx";
pub const EXPORT_TX: &str = "ExportTx";
pub const IMPORT_TX: &str = "ImportTx";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
pub enum VmType {
    #[serde(rename = "Subnet-EVM")]
    #[strum(serialize = "Subnet-EVM")]
    SubnetEvm,
    #[serde(rename = "Custom")]
    #[strum(serialize = "Custom")]
    Custom,
}

impl VmType {
    /// The VM name whose padded bytes form the well known VM id.
    pub fn default_vm_name(&self) -> Option<&'static str> {
        match self {
            VmType::SubnetEvm => Some("subnetevm"),
            VmType::Custom => None,
        }
    }
}

/// Deployment data of a subnet on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkData {
    #[serde(rename = "SubnetID")]
    pub subnet_id: Id,
    #[serde(rename = "BlockchainID")]
    pub blockchain_id: Id,
    #[serde(rename = "TransferSubnetOwnershipTxID")]
    pub transfer_subnet_ownership_tx_id: Id,
    #[serde(rename = "TeleporterMessengerAddress")]
    pub teleporter_messenger_address: String,
    #[serde(rename = "TeleporterRegistryAddress")]
    pub teleporter_registry_address: String,
    #[serde(rename = "RPCEndpoints")]
    pub rpc_endpoints: Vec<String>,
}

/// Elastic transformation state of a subnet on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticSubnet {
    #[serde(rename = "SubnetID")]
    pub subnet_id: Id,
    #[serde(rename = "AssetID")]
    pub asset_id: Id,
    #[serde(rename = "PChainTXID")]
    pub p_chain_tx_id: Id,
    #[serde(rename = "TokenName")]
    pub token_name: String,
    #[serde(rename = "TokenSymbol")]
    pub token_symbol: String,
    /// Step log of the transformation: step name to transaction id.
    #[serde(rename = "Txs")]
    pub txs: BTreeMap<String, Id>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "VM")]
    pub vm: VmType,
    #[serde(rename = "VMVersion", default)]
    pub vm_version: String,
    #[serde(rename = "RPCVersion", default)]
    pub rpc_version: u32,
    #[serde(rename = "Subnet", default)]
    pub subnet: String,
    #[serde(rename = "TokenName", default)]
    pub token_name: String,
    #[serde(rename = "TokenSymbol", default)]
    pub token_symbol: String,
    #[serde(rename = "ChainID", default)]
    pub chain_id: String,
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "ImportedFromAPM", default)]
    pub imported_from_apm: bool,
    #[serde(rename = "ImportedVMID", default)]
    pub imported_vm_id: String,
    #[serde(rename = "CustomVMRepoURL", default)]
    pub custom_vm_repo_url: String,
    #[serde(rename = "CustomVMBranch", default)]
    pub custom_vm_branch: String,
    #[serde(rename = "CustomVMBuildScript", default)]
    pub custom_vm_build_script: String,
    #[serde(rename = "Networks", default)]
    pub networks: BTreeMap<String, NetworkData>,
    #[serde(rename = "ElasticSubnet", default)]
    pub elastic_subnet: BTreeMap<String, ElasticSubnet>,
}

impl Sidecar {
    pub fn new(name: &str, vm: VmType) -> Self {
        Self {
            name: name.to_string(),
            vm,
            vm_version: String::new(),
            rpc_version: 0,
            subnet: name.to_string(),
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            token_symbol: String::new(),
            chain_id: String::new(),
            version: SIDECAR_VERSION.to_string(),
            imported_from_apm: false,
            imported_vm_id: String::new(),
            custom_vm_repo_url: String::new(),
            custom_vm_branch: String::new(),
            custom_vm_build_script: String::new(),
            networks: BTreeMap::new(),
            elastic_subnet: BTreeMap::new(),
        }
    }

    pub fn network(&self, kind: NetworkKind) -> Option<&NetworkData> {
        self.networks.get(kind.as_ref())
    }

    /// The subnet id on `kind`, if it was deployed there.
    pub fn subnet_id(&self, kind: NetworkKind) -> Option<Id> {
        self.network(kind)
            .map(|n| n.subnet_id)
            .filter(|id| !id.is_empty())
    }

    pub fn blockchain_id(&self, kind: NetworkKind) -> Option<Id> {
        self.network(kind)
            .map(|n| n.blockchain_id)
            .filter(|id| !id.is_empty())
    }

    /// A subnet counts as deployed on a network once both its subnet and blockchain ids are
    /// recorded.
    pub fn is_deployed(&self, kind: NetworkKind) -> bool {
        self.subnet_id(kind).is_some() && self.blockchain_id(kind).is_some()
    }

    /// Records the ids of a deployment. An empty blockchain id keeps the previous one.
    pub fn record_deployment(&mut self, kind: NetworkKind, subnet_id: Id, blockchain_id: Id) {
        let data = self.networks.entry(kind.to_string()).or_default();
        data.subnet_id = subnet_id;
        if !blockchain_id.is_empty() {
            data.blockchain_id = blockchain_id;
        }
    }

    pub fn record_ownership_transfer(&mut self, kind: NetworkKind, tx_id: Id) {
        let data = self.networks.entry(kind.to_string()).or_default();
        data.transfer_subnet_ownership_tx_id = tx_id;
    }

    pub fn ownership_transfer_tx(&self, kind: NetworkKind) -> Option<Id> {
        self.network(kind)
            .map(|n| n.transfer_subnet_ownership_tx_id)
            .filter(|id| !id.is_empty())
    }

    pub fn elastic(&self, kind: NetworkKind) -> Option<&ElasticSubnet> {
        self.elastic_subnet.get(kind.as_ref())
    }

    /// The transaction id of an already issued elastic transformation step.
    pub fn elastic_step(&self, kind: NetworkKind, step: &str) -> Option<Id> {
        self.elastic(kind).and_then(|e| e.txs.get(step).copied())
    }

    pub fn record_elastic_step(&mut self, kind: NetworkKind, step: &str, tx_id: Id) {
        self.elastic_subnet
            .entry(kind.to_string())
            .or_default()
            .txs
            .insert(step.to_string(), tx_id);
    }

    /// Marks the transformation on `kind` as completed. The step log is kept.
    pub fn complete_elastic(
        &mut self,
        kind: NetworkKind,
        subnet_id: Id,
        asset_id: Id,
        p_chain_tx_id: Id,
        token_name: &str,
        token_symbol: &str,
    ) {
        let entry = self.elastic_subnet.entry(kind.to_string()).or_default();
        entry.subnet_id = subnet_id;
        entry.asset_id = asset_id;
        entry.p_chain_tx_id = p_chain_tx_id;
        entry.token_name = token_name.to_string();
        entry.token_symbol = token_symbol.to_string();
    }

    /// A transformation is complete once the transform tx is recorded.
    pub fn is_elastic(&self, kind: NetworkKind) -> bool {
        self.elastic(kind)
            .map(|e| !e.p_chain_tx_id.is_empty())
            .unwrap_or(false)
    }
}
