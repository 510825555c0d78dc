// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use std::time::Duration;

use avalanche_api::network::NetworkKind;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use url::Url;

/// Represents a network endpoint override in the config.
#[serde_as]
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub kind: NetworkKind,
    pub network_id: Option<u32>,
    pub endpoint: Url,
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(default)]
    pub request_timeout: Option<Duration>,
}
