// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Configuring a node to track a deployed subnet.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use avalanche_api::ids::{Id, NodeId};
use serde_json::{Map, Value};

use crate::node::NodeClient;
use crate::store::write_file;

pub const TRACK_SUBNETS_KEY: &str = "track-subnets";
const NETWORK_ID_KEY: &str = "network-id";

/// Adds `subnet_id` to the tracked subnets of an avalanchego JSON config file, creating the file
/// when missing. Other entries are left untouched.
pub fn edit_config_file(path: &Path, subnet_id: &Id, network_id: u32) -> Result<()> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => b"{}".to_vec(),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to load avalanchego config file {path:?}"))
        }
    };
    let mut config: Map<String, Value> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to unpack the config file {path:?} to JSON"))?;

    let subnet_id = subnet_id.to_string();
    let tracked = match config.get(TRACK_SUBNETS_KEY) {
        None => subnet_id,
        Some(Value::String(existing)) if existing.is_empty() => subnet_id,
        Some(Value::String(existing)) => {
            if existing.split(',').any(|s| s == subnet_id) {
                existing.clone()
            } else {
                format!("{existing},{subnet_id}")
            }
        }
        Some(other) => {
            return Err(anyhow!(
                "expected a string value for {TRACK_SUBNETS_KEY}, but got {other}"
            ))
        }
    };
    config.insert(TRACK_SUBNETS_KEY.to_string(), Value::String(tracked));
    config.insert(
        NETWORK_ID_KEY.to_string(),
        Value::String(network_id.to_string()),
    );

    let bytes = serde_json::to_vec_pretty(&config)?;
    write_file(path, &bytes).context("failed to write JSON config file, check permissions?")
}

/// Whether `node_id` currently validates `subnet_id`.
pub async fn is_node_validating_subnet(
    node: &(impl NodeClient + ?Sized),
    subnet_id: &Id,
    node_id: &NodeId,
) -> Result<bool> {
    let validators = node.current_validators(subnet_id).await?;
    Ok(validators.iter().any(|v| &v.node_id == node_id))
}

pub fn print_join_instructions(
    out: &mut impl Write,
    subnet_id: &Id,
    network_id: u32,
    vm_path: &Path,
) -> Result<()> {
    writeln!(
        out,
        "
To setup your node, you must do two things:

1. Add your VM binary to your node's plugin directory
2. Update your node config to start validating the subnet

To add the VM to your plugin directory, copy or scp from {vm}

If you start your node from the command line WITHOUT a config file, add the following flag to
your node's startup command:

--{TRACK_SUBNETS_KEY}={subnet_id}
(if the node already tracks subnets, append the new value by comma-separating it).

For example:
./build/avalanchego --network-id={network_id} --{TRACK_SUBNETS_KEY}={subnet_id}

If you start the node via a JSON config file, add this to your config file:
{TRACK_SUBNETS_KEY}: {subnet_id}

After you update your config, you will need to restart your node for the changes to take effect.",
        vm = vm_path.display()
    )?;
    Ok(())
}

pub fn print_config_edited(out: &mut impl Write, path: &Path) -> Result<()> {
    writeln!(
        out,
        "The config file has been edited. To use it, make sure to start the node with the '--config-file' option, e.g.

./build/avalanchego --config-file {}

(using your binary location). The node has to be restarted for the changes to take effect.",
        path.display()
    )?;
    Ok(())
}
