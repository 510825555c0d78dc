// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Deserialization utils for config mod.

use crate::config::NetworkConfig;
use avalanche_api::network::NetworkKind;
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A serde deserialization method to deserialize a map of network overrides keyed by kind from
/// a vec of overrides. A kind may only appear once.
pub(crate) fn deserialize_networks_from_vec<'de, D>(
    deserializer: D,
) -> anyhow::Result<BTreeMap<NetworkKind, NetworkConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let networks = <Vec<NetworkConfig>>::deserialize(deserializer)?;

    let mut map = BTreeMap::new();
    for network in networks {
        let kind = network.kind;
        if map.insert(kind, network).is_some() {
            return Err(D::Error::custom(format!(
                "network {kind} is configured more than once"
            )));
        }
    }
    Ok(map)
}
