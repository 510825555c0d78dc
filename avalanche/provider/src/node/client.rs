// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use avalanche_api::address::ChainAddress;
use avalanche_api::codec::avax::Utxo;
use avalanche_api::codec::formatting::{decode_hex_with_checksum, encode_hex_with_checksum};
use avalanche_api::ids::Id;
use avalanche_api::network::Network;
use avalanche_types::jsonrpc::client::info;
use serde_json::json;
use url::Url;

use super::message::{
    AssetDescriptionResponse, BlockchainIdResponse, CurrentSupplyResponse,
    CurrentValidatorsResponse, GetTxResponse, GetUtxosResponse, IsBootstrappedResponse,
    IssueTxResponse, NodeVersionResponse, TxStatusResponse, UtxoIndex,
};
use super::{Chain, NodeClient, TxFees, TxStatus, Validator};
use crate::jsonrpc::{JsonRpcClient, JsonRpcClientImpl, NO_PARAMS};

const UTXO_PAGE_LIMIT: u32 = 1024;
const HEX_ENCODING: &str = "hex";
const AVAX_SYMBOL: &str = "AVAX";

/// [`NodeClient`] over the JSON-RPC APIs of a node.
pub struct AvalancheNodeClient {
    endpoint: String,
    info: JsonRpcClientImpl,
    p_chain: JsonRpcClientImpl,
    x_chain: JsonRpcClientImpl,
}

impl AvalancheNodeClient {
    pub fn new(network: &Network, timeout: Option<Duration>) -> Result<Self> {
        let client = |url: String| -> Result<JsonRpcClientImpl> {
            let url = Url::parse(&url).with_context(|| format!("invalid node url {url}"))?;
            Ok(JsonRpcClientImpl::new(url, timeout))
        };
        Ok(Self {
            endpoint: network.endpoint().as_str().trim_end_matches('/').to_string(),
            info: client(network.info_url())?,
            p_chain: client(network.p_chain_url())?,
            x_chain: client(network.x_chain_url())?,
        })
    }

    fn chain_client(&self, chain: Chain) -> (&JsonRpcClientImpl, &'static str) {
        match chain {
            Chain::P => (&self.p_chain, "platform"),
            Chain::X => (&self.x_chain, "avm"),
        }
    }
}

#[async_trait]
impl NodeClient for AvalancheNodeClient {
    async fn network_id(&self) -> Result<u32> {
        let resp = info::get_network_id(&self.endpoint)
            .await
            .map_err(|e| anyhow!("cannot get the network id from {}: {e}", self.endpoint))?;
        resp.result
            .map(|r| r.network_id)
            .ok_or_else(|| anyhow!("node at {} returned no network id", self.endpoint))
    }

    async fn blockchain_id(&self, alias: &str) -> Result<Id> {
        let r: BlockchainIdResponse = self
            .info
            .request("info.getBlockchainID", json!({ "alias": alias }))
            .await?;
        Ok(r.blockchain_id)
    }

    async fn rpc_protocol_version(&self) -> Result<u32> {
        let r: NodeVersionResponse = self.info.request("info.getNodeVersion", NO_PARAMS).await?;
        Ok(r.rpc_protocol_version)
    }

    async fn tx_fees(&self) -> Result<TxFees> {
        self.info.request("info.getTxFee", NO_PARAMS).await
    }

    async fn avax_asset_id(&self) -> Result<Id> {
        let r: AssetDescriptionResponse = self
            .x_chain
            .request("avm.getAssetDescription", json!({ "assetID": AVAX_SYMBOL }))
            .await?;
        Ok(r.asset_id)
    }

    async fn utxos(
        &self,
        chain: Chain,
        addrs: &[ChainAddress],
        source_chain: Option<Chain>,
    ) -> Result<Vec<Utxo>> {
        let (client, prefix) = self.chain_client(chain);
        let method = format!("{prefix}.getUTXOs");
        let addresses = addrs.iter().map(|a| a.to_string()).collect::<Vec<_>>();

        let mut utxos = Vec::new();
        let mut start_index: Option<UtxoIndex> = None;
        loop {
            let mut params = json!({
                "addresses": addresses,
                "limit": UTXO_PAGE_LIMIT,
                "encoding": HEX_ENCODING,
            });
            if let Some(source) = source_chain {
                params["sourceChain"] = json!(source.as_ref());
            }
            if let Some(index) = &start_index {
                params["startIndex"] = json!(index);
            }

            let page: GetUtxosResponse = client.request(&method, params).await?;
            for raw in &page.utxos {
                let bytes = decode_hex_with_checksum(raw)?;
                utxos.push(Utxo::parse(&bytes)?);
            }
            if page.num_fetched < UTXO_PAGE_LIMIT {
                break;
            }
            start_index = Some(page.end_index);
        }
        tracing::debug!("fetched {} utxos from the {chain}-Chain", utxos.len());
        Ok(utxos)
    }

    async fn issue_tx(&self, chain: Chain, tx_bytes: &[u8]) -> Result<Id> {
        let (client, prefix) = self.chain_client(chain);
        let r: IssueTxResponse = client
            .request(
                &format!("{prefix}.issueTx"),
                json!({ "tx": encode_hex_with_checksum(tx_bytes), "encoding": HEX_ENCODING }),
            )
            .await?;
        Ok(r.tx_id)
    }

    async fn tx_status(&self, chain: Chain, tx_id: &Id) -> Result<TxStatus> {
        let (client, prefix) = self.chain_client(chain);
        let r: TxStatusResponse = client
            .request(
                &format!("{prefix}.getTxStatus"),
                json!({ "txID": tx_id.to_string() }),
            )
            .await?;
        Ok(parse_tx_status(&r.status, r.reason))
    }

    async fn get_tx(&self, tx_id: &Id) -> Result<Vec<u8>> {
        let r: GetTxResponse = self
            .p_chain
            .request(
                "platform.getTx",
                json!({ "txID": tx_id.to_string(), "encoding": HEX_ENCODING }),
            )
            .await?;
        Ok(decode_hex_with_checksum(&r.tx)?)
    }

    async fn current_validators(&self, subnet_id: &Id) -> Result<Vec<Validator>> {
        let r: CurrentValidatorsResponse = self
            .p_chain
            .request(
                "platform.getCurrentValidators",
                json!({ "subnetID": subnet_id.to_string() }),
            )
            .await?;
        Ok(r.validators)
    }

    async fn current_supply(&self, subnet_id: &Id) -> Result<u64> {
        let r: CurrentSupplyResponse = self
            .p_chain
            .request(
                "platform.getCurrentSupply",
                json!({ "subnetID": subnet_id.to_string() }),
            )
            .await?;
        Ok(r.supply)
    }

    async fn is_bootstrapped(&self, chain: &str) -> Result<bool> {
        let r: IsBootstrappedResponse = self
            .info
            .request("info.isBootstrapped", json!({ "chain": chain }))
            .await?;
        Ok(r.is_bootstrapped)
    }
}

fn parse_tx_status(status: &str, reason: Option<String>) -> TxStatus {
    match status {
        "Committed" | "Accepted" => TxStatus::Accepted,
        "Processing" => TxStatus::Processing,
        "Dropped" | "Aborted" | "Rejected" => {
            TxStatus::Dropped(reason.unwrap_or_else(|| status.to_string()))
        }
        _ => TxStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tx_status() {
        assert_eq!(parse_tx_status("Committed", None), TxStatus::Accepted);
        assert_eq!(parse_tx_status("Accepted", None), TxStatus::Accepted);
        assert_eq!(parse_tx_status("Processing", None), TxStatus::Processing);
        assert_eq!(
            parse_tx_status("Dropped", Some("insufficient funds".to_string())),
            TxStatus::Dropped("insufficient funds".to_string())
        );
        assert_eq!(parse_tx_status("Unknown", None), TxStatus::Unknown);
    }

    #[test]
    fn test_client_urls() {
        let client = AvalancheNodeClient::new(&Network::fuji(), None).unwrap();
        assert_eq!(
            client.p_chain.url().as_str(),
            "https://api.avax-test.network/ext/bc/P"
        );
        assert_eq!(client.chain_client(Chain::X).1, "avm");
    }
}
