// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Key list cli handler

use async_trait::async_trait;
use clap::Args;
use std::fmt::Debug;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct KeyList;

#[async_trait]
impl CommandLineHandler for KeyList {
    type Arguments = KeyListArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("list keys with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let keys = provider.list_keys()?;
        if keys.is_empty() {
            println!("No keys found");
            return Ok(());
        }

        println!("{:<16} {:<16} P-Chain Address", "Key Name", "Network");
        for (name, key) in keys {
            for (kind, address) in provider.key_addresses(&key) {
                println!("{name:<16} {:<16} {address}", kind.to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(about = "List the stored keys with their address on every network")]
pub(crate) struct KeyListArgs {}
