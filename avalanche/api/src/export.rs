// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! The bundle written by `subnet export` and read back by `subnet import`.

use serde::{Deserialize, Serialize};

use crate::sidecar::Sidecar;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exportable {
    #[serde(rename = "Sidecar")]
    pub sidecar: Sidecar,
    #[serde(rename = "Genesis", with = "base64_bytes", default)]
    pub genesis: Option<Vec<u8>>,
    #[serde(rename = "NodeConfig", with = "base64_bytes", default)]
    pub node_config: Option<Vec<u8>>,
    #[serde(rename = "ChainConfig", with = "base64_bytes", default)]
    pub chain_config: Option<Vec<u8>>,
    #[serde(rename = "SubnetConfig", with = "base64_bytes", default)]
    pub subnet_config: Option<Vec<u8>>,
    #[serde(rename = "NetworkUpgrades", with = "base64_bytes", default)]
    pub network_upgrades: Option<Vec<u8>>,
}

/// Byte blobs as standard base64 strings, absent ones as `null`. An empty string reads back as
/// absent.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let s = Option::<String>::deserialize(deserializer)?;
        match s {
            Some(s) if !s.is_empty() => STANDARD.decode(s).map(Some).map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidecar::VmType;

    #[test]
    fn test_blob_encoding() {
        let bundle = Exportable {
            sidecar: Sidecar::new("mysubnet", VmType::SubnetEvm),
            genesis: Some(b"{}".to_vec()),
            node_config: None,
            chain_config: Some(b"{\"a\":1}".to_vec()),
            subnet_config: None,
            network_upgrades: None,
        };
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["Genesis"], "e30=");
        assert!(value["NodeConfig"].is_null());

        let back: Exportable = serde_json::from_value(value).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_empty_and_missing_blobs() {
        let json = r#"{"Sidecar": {"Name": "s", "VM": "Custom"}, "Genesis": ""}"#;
        let bundle: Exportable = serde_json::from_str(json).unwrap();
        assert!(bundle.genesis.is_none());
        assert!(bundle.subnet_config.is_none());
    }
}
