// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Serialization utils for config mod.

use crate::config::NetworkConfig;
use avalanche_api::network::NetworkKind;
use serde::ser::SerializeSeq;
use serde::Serializer;
use std::collections::BTreeMap;

/// A serde serialization method to serialize a map of network overrides to a vec, the inverse
/// of `deserialize_networks_from_vec`.
pub fn serialize_networks_to_vec<S>(
    networks: &BTreeMap<NetworkKind, NetworkConfig>,
    s: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = s.serialize_seq(Some(networks.len()))?;
    for network in networks.values() {
        seq.serialize_element(network)?;
    }
    seq.end()
}
