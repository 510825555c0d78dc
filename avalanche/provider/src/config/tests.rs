// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use std::time::Duration;

use avalanche_api::network::NetworkKind;
use indoc::formatdoc;
use url::Url;

use crate::config::{Config, DEFAULT_BASE_DIR, DEFAULT_CONFIG_TEMPLATE, DEFAULT_STEP_DELAY};

// Arguments for the config's fields
const BASE_DIR: &str = "/tmp/avalanche";
const KEYSTORE_PATH: &str = "~/.avalanche-cli/key";
const FUJI_ENDPOINT: &str = "http://127.0.0.1:9660/";
const DEVNET_ENDPOINT: &str = "http://10.0.0.1:9650/";
const DEVNET_ID: u32 = 1338;

#[test]
fn check_keystore_config() {
    let config = read_config();
    assert_eq!(
        config.keystore_path,
        Some(KEYSTORE_PATH.to_string()),
        "invalid provider keystore path"
    );
    assert_eq!(config.base_dir(), BASE_DIR);
}

#[test]
fn check_networks_config() {
    let config = read_config();

    let fuji = config.network(NetworkKind::Fuji).unwrap();
    assert_eq!(fuji.id(), 5);
    assert_eq!(*fuji.endpoint(), Url::parse(FUJI_ENDPOINT).unwrap());
    assert_eq!(
        config.request_timeout(NetworkKind::Fuji),
        Some(Duration::from_secs(30))
    );

    let devnet = config.network(NetworkKind::Devnet).unwrap();
    assert_eq!(devnet.id(), DEVNET_ID);
    assert_eq!(devnet.p_chain_url(), "http://10.0.0.1:9650/ext/bc/P");

    // not overridden
    let mainnet = config.network(NetworkKind::Mainnet).unwrap();
    assert_eq!(mainnet.endpoint().as_str(), "https://api.avax.network/");

    assert_eq!(config.elastic.step_delay, Duration::from_secs(1));
}

#[test]
fn check_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.base_dir(), DEFAULT_BASE_DIR);
    assert_eq!(config.elastic.step_delay, DEFAULT_STEP_DELAY);
    assert!(config.network(NetworkKind::Devnet).is_err());

    let template = Config::from_toml_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
    assert!(template.networks.is_empty());
    assert_eq!(template.elastic.step_delay, DEFAULT_STEP_DELAY);
}

#[test]
fn check_duplicate_network() {
    let s = formatdoc!(
        r#"
        [[networks]]
        kind = "fuji"
        endpoint = "{FUJI_ENDPOINT}"

        [[networks]]
        kind = "fuji"
        endpoint = "{FUJI_ENDPOINT}"
        "#
    );
    assert!(Config::from_toml_str(&s).is_err());
}

#[test]
fn check_write_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let config = read_config();
    config.write_to_file(&path).unwrap();
    assert_eq!(Config::from_file(&path).unwrap(), config);

    let missing = Config::from_file_or_default(dir.path().join("missing.toml")).unwrap();
    assert_eq!(missing, Config::new());
}

fn config_str() -> String {
    formatdoc!(
        r#"
        base_dir = "{BASE_DIR}"
        keystore_path = "{KEYSTORE_PATH}"

        [elastic]
        step_delay_secs = 1

        [[networks]]
        kind = "fuji"
        endpoint = "{FUJI_ENDPOINT}"
        request_timeout = 30

        [[networks]]
        kind = "devnet"
        network_id = {DEVNET_ID}
        endpoint = "{DEVNET_ENDPOINT}"
        "#
    )
}

fn read_config() -> Config {
    Config::from_toml_str(config_str().as_str()).unwrap()
}
