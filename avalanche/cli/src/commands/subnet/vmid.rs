// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use avalanche_provider::subnet::vm_id_of;
use clap::Args;
use std::fmt::Debug;

use crate::{get_avalanche_provider, CommandLineHandler, GlobalArguments};

pub(crate) struct VmIdSubnet;

#[async_trait]
impl CommandLineHandler for VmIdSubnet {
    type Arguments = VmIdSubnetArgs;

    async fn handle(global: &GlobalArguments, arguments: &Self::Arguments) -> anyhow::Result<()> {
        log::debug!("vmid with args: {:?}", arguments);

        let provider = get_avalanche_provider(global)?;
        let vm_id = vm_id_of(&provider.store(), &arguments.name)?;
        println!("VM ID : {vm_id}");
        Ok(())
    }
}

#[derive(Debug, Args)]
#[command(name = "vmid", about = "Print the VM ID of a subnet")]
pub(crate) struct VmIdSubnetArgs {
    pub name: String,
}
