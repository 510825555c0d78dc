// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Access to the info, P-Chain and X-Chain APIs of an avalanche node.

mod client;
pub mod message;

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use avalanche_api::address::ChainAddress;
use avalanche_api::codec::avax::Utxo;
use avalanche_api::ids::Id;
use strum::{AsRefStr, Display};

pub use client::AvalancheNodeClient;
pub use message::{TxFees, Validator};

/// Interval between two tx status queries.
pub const TX_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// How long to wait for a tx to be accepted.
pub const TX_ACCEPTANCE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum Chain {
    #[strum(serialize = "P")]
    P,
    #[strum(serialize = "X")]
    X,
}

/// Status of an issued transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// `Committed` on the P-Chain, `Accepted` on the X-Chain.
    Accepted,
    Processing,
    Dropped(String),
    Unknown,
}

#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn network_id(&self) -> Result<u32>;

    async fn blockchain_id(&self, alias: &str) -> Result<Id>;

    /// The RPC protocol version of the running node.
    async fn rpc_protocol_version(&self) -> Result<u32>;

    async fn tx_fees(&self) -> Result<TxFees>;

    async fn avax_asset_id(&self) -> Result<Id>;

    /// Unspent outputs of `addrs`. With `source_chain` set, the atomic utxos exported from that
    /// chain and not yet imported.
    async fn utxos(
        &self,
        chain: Chain,
        addrs: &[ChainAddress],
        source_chain: Option<Chain>,
    ) -> Result<Vec<Utxo>>;

    async fn issue_tx(&self, chain: Chain, tx_bytes: &[u8]) -> Result<Id>;

    async fn tx_status(&self, chain: Chain, tx_id: &Id) -> Result<TxStatus>;

    /// The signed bytes of an accepted P-Chain transaction.
    async fn get_tx(&self, tx_id: &Id) -> Result<Vec<u8>>;

    async fn current_validators(&self, subnet_id: &Id) -> Result<Vec<Validator>>;

    /// Current supply of the token of an elastic subnet. Fails for non elastic subnets.
    async fn current_supply(&self, subnet_id: &Id) -> Result<u64>;

    async fn is_bootstrapped(&self, chain: &str) -> Result<bool>;
}

/// Polls the status of `tx_id` until it is accepted.
pub async fn wait_for_acceptance(
    client: &(impl NodeClient + ?Sized),
    chain: Chain,
    tx_id: &Id,
) -> Result<()> {
    let started = tokio::time::Instant::now();
    loop {
        match client.tx_status(chain, tx_id).await? {
            TxStatus::Accepted => return Ok(()),
            TxStatus::Dropped(reason) => {
                return Err(anyhow!("tx {tx_id} was dropped: {reason}"));
            }
            TxStatus::Processing | TxStatus::Unknown => {}
        }
        if started.elapsed() >= TX_ACCEPTANCE_TIMEOUT {
            return Err(anyhow!(
                "timeout waiting for tx {tx_id} to be accepted on the {chain}-Chain"
            ));
        }
        tokio::time::sleep(TX_POLL_INTERVAL).await;
    }
}
