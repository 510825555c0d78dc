// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Local subnet configurations: creation, inspection and removal.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use avalanche_api::network::NetworkKind;
use avalanche_api::sidecar::{Sidecar, VmType};
use strum::IntoEnumIterator;

use crate::deploy::{sidecar_vm_id, validate_genesis};
use crate::node::NodeClient;
use crate::store::{evm_chain_id, ConfigFile, SubnetStore};

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub name: String,
    pub vm: VmType,
    pub genesis_path: PathBuf,
    /// Required for custom VMs.
    pub vm_binary: Option<PathBuf>,
    pub vm_version: String,
    pub token_name: Option<String>,
    pub force: bool,
}

pub fn check_subnet_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(anyhow!(
            "subnet name {name:?} contains invalid characters, only letters and digits are allowed"
        ));
    }
    Ok(())
}

pub fn create_subnet(store: &SubnetStore, request: CreateRequest) -> Result<Sidecar> {
    let name = request.name.as_str();
    check_subnet_name(name)?;
    if store.sidecar_exists(name) && !request.force {
        return Err(anyhow!(
            "configuration already exists. Use --force parameter to overwrite"
        ));
    }

    let genesis = fs::read(&request.genesis_path)
        .with_context(|| format!("failed to read genesis {:?}", request.genesis_path))?;
    validate_genesis(&genesis)?;

    let mut sidecar = Sidecar::new(name, request.vm);
    sidecar.vm_version = request.vm_version;
    if let Some(token_name) = request.token_name {
        sidecar.token_name = token_name;
    }

    match request.vm {
        VmType::SubnetEvm => {
            let chain_id = evm_chain_id(&genesis)
                .ok_or_else(|| anyhow!("genesis is missing config.chainId"))?;
            if store.subnet_evm_chain_id_exists(&chain_id, name)? {
                return Err(anyhow!(
                    "chain ID {chain_id} is already in use by another subnet"
                ));
            }
            sidecar.chain_id = chain_id;
        }
        VmType::Custom => {
            let binary = request
                .vm_binary
                .as_deref()
                .ok_or_else(|| anyhow!("a custom VM requires the path of its binary, set --vm"))?;
            store.copy_vm_binary(binary, name)?;
        }
    }

    store.write_genesis(name, &genesis)?;
    store.create_sidecar(&mut sidecar)?;
    log::info!("created {} subnet configuration {name}", sidecar.vm);
    Ok(sidecar)
}

/// Copies the given JSON config blobs next to the sidecar of `name`.
pub fn configure_subnet(
    store: &SubnetStore,
    name: &str,
    files: &[(ConfigFile, PathBuf)],
) -> Result<()> {
    if !store.sidecar_exists(name) {
        return Err(anyhow!("invalid subnet {name:?}"));
    }
    if files.is_empty() {
        return Err(anyhow!("no config file given"));
    }
    for (file, path) in files {
        let bytes = fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
        serde_json::from_slice::<serde_json::Value>(&bytes)
            .with_context(|| format!("invalid JSON in {path:?}"))?;
        store.write_config_file(name, *file, &bytes)?;
        log::info!("{file} of {name} set from {path:?}");
    }
    Ok(())
}

pub fn describe_subnet(
    out: &mut impl Write,
    store: &SubnetStore,
    name: &str,
    print_genesis: bool,
) -> Result<()> {
    if !store.sidecar_exists(name) {
        return Err(anyhow!("invalid subnet {name:?}"));
    }
    if print_genesis {
        out.write_all(&store.load_raw_genesis(name)?)?;
        writeln!(out)?;
        return Ok(());
    }

    let sidecar = store.load_sidecar(name)?;
    let mut rows = vec![
        ("Name", sidecar.name.clone()),
        ("VM", sidecar.vm.to_string()),
        ("VM Version", sidecar.vm_version.clone()),
        ("VM ID", sidecar_vm_id(&sidecar)?.to_string()),
        ("Token Name", sidecar.token_name.clone()),
    ];
    if !sidecar.chain_id.is_empty() {
        rows.push(("Chain ID", sidecar.chain_id.clone()));
    }
    if sidecar.imported_from_apm {
        rows.push(("From Repo", "Yes".to_string()));
    }
    print_rows(out, &rows)?;

    for kind in NetworkKind::iter() {
        let Some(subnet_id) = sidecar.subnet_id(kind) else {
            continue;
        };
        writeln!(out)?;
        writeln!(out, "{kind}")?;
        let mut rows = vec![("Subnet ID", subnet_id.to_string())];
        if let Some(blockchain_id) = sidecar.blockchain_id(kind) {
            rows.push(("Blockchain ID", blockchain_id.to_string()));
        }
        if let Some(tx_id) = sidecar.ownership_transfer_tx(kind) {
            rows.push(("Owner Tx ID", tx_id.to_string()));
        }
        if let Some(elastic) = sidecar.elastic(kind) {
            if sidecar.is_elastic(kind) {
                rows.push(("Elastic", "Yes".to_string()));
                rows.push(("Asset ID", elastic.asset_id.to_string()));
                rows.push(("Token Symbol", elastic.token_symbol.clone()));
            } else {
                rows.push(("Elastic", format!("{} steps done", elastic.txs.len())));
            }
        }
        print_rows(out, &rows)?;
    }
    Ok(())
}

fn print_rows(out: &mut impl Write, rows: &[(&str, String)]) -> Result<()> {
    for (key, value) in rows {
        writeln!(out, "{key:<14} {value}")?;
    }
    Ok(())
}

/// One line of `subnet list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetRow {
    pub subnet: String,
    pub chain: String,
    pub chain_id: String,
    pub vm_id: String,
    pub vm_type: String,
    pub from_repo: bool,
}

pub fn list_subnets(store: &SubnetStore) -> Result<Vec<SubnetRow>> {
    let mut rows = vec![];
    for name in store.sidecar_names()? {
        let sidecar = store.load_sidecar(&name)?;
        rows.push(SubnetRow {
            subnet: sidecar.subnet.clone(),
            chain: sidecar.name.clone(),
            chain_id: sidecar.chain_id.clone(),
            vm_id: sidecar_vm_id(&sidecar)?.to_string(),
            vm_type: sidecar.vm.to_string(),
            from_repo: sidecar.imported_from_apm,
        });
    }
    rows.sort_by(|a, b| a.subnet.cmp(&b.subnet));
    Ok(rows)
}

pub fn print_subnet_rows(out: &mut impl Write, rows: &[SubnetRow]) -> Result<()> {
    writeln!(
        out,
        "{:<16} {:<16} {:<10} {:<52} {:<12} {}",
        "SUBNET", "CHAIN", "CHAINID", "VMID", "TYPE", "FROM REPO"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:<16} {:<16} {:<10} {:<52} {:<12} {}",
            row.subnet,
            row.chain,
            row.chain_id,
            row.vm_id,
            row.vm_type,
            yes_no(row.from_repo)
        )?;
    }
    Ok(())
}

/// One line of `subnet list --deployed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedRow {
    pub subnet: String,
    pub chain: String,
    pub vm_id: String,
    pub local: bool,
    pub fuji: bool,
    pub mainnet: bool,
}

/// Deployment state per network. The local column needs the local node to know the chain; a
/// failing query only warns.
pub async fn list_deployed_subnets(
    store: &SubnetStore,
    local_node: Option<&dyn NodeClient>,
) -> Result<Vec<DeployedRow>> {
    let mut rows = vec![];
    for SubnetRow {
        subnet,
        chain,
        vm_id,
        ..
    } in list_subnets(store)?
    {
        let sidecar = store.load_sidecar(&chain)?;
        let local = match (sidecar.blockchain_id(NetworkKind::Local), local_node) {
            (Some(blockchain_id), Some(node)) => {
                match node.is_bootstrapped(&blockchain_id.to_string()).await {
                    Ok(deployed) => deployed,
                    Err(e) => {
                        log::warn!("failed to query local deployment of {chain}: {e:#}");
                        false
                    }
                }
            }
            _ => false,
        };
        rows.push(DeployedRow {
            subnet,
            chain,
            vm_id,
            local,
            fuji: sidecar.is_deployed(NetworkKind::Fuji),
            mainnet: sidecar.is_deployed(NetworkKind::Mainnet),
        });
    }
    Ok(rows)
}

pub fn print_deployed_rows(out: &mut impl Write, rows: &[DeployedRow]) -> Result<()> {
    writeln!(
        out,
        "{:<16} {:<16} {:<52} {:<14} {:<6} {}",
        "SUBNET",
        "CHAIN",
        "VM ID",
        NetworkKind::Local.to_string(),
        NetworkKind::Fuji.to_string(),
        NetworkKind::Mainnet.to_string()
    )?;
    for row in rows {
        writeln!(
            out,
            "{:<16} {:<16} {:<52} {:<14} {:<6} {}",
            row.subnet,
            row.chain,
            row.vm_id,
            yes_no(row.local),
            yes_no(row.fuji),
            yes_no(row.mainnet)
        )?;
    }
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

pub fn vm_id_of(store: &SubnetStore, name: &str) -> Result<String> {
    if !store.sidecar_exists(name) {
        return Err(anyhow!("invalid subnet {name:?}"));
    }
    Ok(sidecar_vm_id(&store.load_sidecar(name)?)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockNode;
    use avalanche_api::ids::Id;
    use std::path::Path;

    fn write_genesis(dir: &Path, chain_id: u64) -> PathBuf {
        let path = dir.join(format!("genesis-{chain_id}.json"));
        fs::write(
            &path,
            format!(r#"{{"config":{{"chainId":{chain_id}}},"alloc":{{}}}}"#),
        )
        .unwrap();
        path
    }

    fn evm_request(name: &str, genesis_path: PathBuf) -> CreateRequest {
        CreateRequest {
            name: name.to_string(),
            vm: VmType::SubnetEvm,
            genesis_path,
            vm_binary: None,
            vm_version: "v0.6.3".to_string(),
            token_name: None,
            force: false,
        }
    }

    #[test]
    fn test_create_subnet() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path().join("base"));
        let genesis = write_genesis(dir.path(), 1234);

        let sidecar = create_subnet(&store, evm_request("alpha", genesis.clone())).unwrap();
        assert_eq!(sidecar.chain_id, "1234");
        assert_eq!(store.load_sidecar("alpha").unwrap(), sidecar);

        let err = create_subnet(&store, evm_request("alpha", genesis.clone())).unwrap_err();
        assert!(err.to_string().contains("--force"));

        let err = create_subnet(&store, evm_request("beta", genesis.clone())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "chain ID 1234 is already in use by another subnet"
        );
        assert!(!store.genesis_exists("beta"));

        // recreating the same subnet keeps its chain id
        let mut forced = evm_request("alpha", genesis);
        forced.force = true;
        assert!(create_subnet(&store, forced).is_ok());

        assert!(create_subnet(&store, evm_request("bad-name", write_genesis(dir.path(), 9))).is_err());
    }

    #[test]
    fn test_create_custom_subnet() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path().join("base"));
        let genesis = dir.path().join("genesis.json");
        fs::write(&genesis, "{}").unwrap();

        let mut request = CreateRequest {
            vm: VmType::Custom,
            ..evm_request("custom", genesis)
        };
        assert!(create_subnet(&store, request.clone()).is_err());

        let binary = dir.path().join("vm");
        fs::write(&binary, b"\x7fELF").unwrap();
        request.vm_binary = Some(binary);
        create_subnet(&store, request).unwrap();
        assert_eq!(fs::read(store.custom_vm_path("custom")).unwrap(), b"\x7fELF");
    }

    #[test]
    fn test_configure_and_describe() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path().join("base"));
        create_subnet(&store, evm_request("alpha", write_genesis(dir.path(), 77))).unwrap();

        let chain = dir.path().join("chain.json");
        fs::write(&chain, r#"{"pruning-enabled":false}"#).unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();

        assert!(configure_subnet(&store, "alpha", &[(ConfigFile::Subnet, broken)]).is_err());
        configure_subnet(&store, "alpha", &[(ConfigFile::Chain, chain)]).unwrap();
        assert!(store
            .load_config_file("alpha", ConfigFile::Chain)
            .unwrap()
            .is_some());

        let mut sidecar = store.load_sidecar("alpha").unwrap();
        sidecar.record_deployment(NetworkKind::Fuji, Id::of(b"subnet"), Id::of(b"chain"));
        store.update_sidecar(&mut sidecar).unwrap();

        let mut out = Vec::new();
        describe_subnet(&mut out, &store, "alpha", false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Chain ID       77"));
        assert!(text.contains(&Id::of(b"chain").to_string()));

        let mut out = Vec::new();
        describe_subnet(&mut out, &store, "alpha", true).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"chainId\":77"));
    }

    #[tokio::test]
    async fn test_list_subnets() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path().join("base"));
        create_subnet(&store, evm_request("zeta", write_genesis(dir.path(), 2))).unwrap();
        create_subnet(&store, evm_request("alpha", write_genesis(dir.path(), 1))).unwrap();

        let mut sidecar = store.load_sidecar("zeta").unwrap();
        sidecar.record_deployment(NetworkKind::Local, Id::of(b"s"), Id::of(b"c"));
        sidecar.record_deployment(NetworkKind::Fuji, Id::of(b"s"), Id::of(b"c"));
        store.update_sidecar(&mut sidecar).unwrap();

        let rows = list_subnets(&store).unwrap();
        assert_eq!(
            rows.iter().map(|r| r.subnet.as_str()).collect::<Vec<_>>(),
            vec!["alpha", "zeta"]
        );
        assert_eq!(rows[0].vm_type, "Subnet-EVM");

        let node = MockNode::default();
        let rows = list_deployed_subnets(&store, Some(&node as &dyn NodeClient))
            .await.unwrap();
        assert!(!rows[0].local && !rows[0].fuji);
        assert!(rows[1].local && rows[1].fuji && !rows[1].mainnet);

        let mut out = Vec::new();
        print_deployed_rows(&mut out, &rows).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("SUBNET"));
    }

    #[test]
    fn test_vm_id_of() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        assert!(vm_id_of(&store, "missing").is_err());
        create_subnet(&store, evm_request("alpha", write_genesis(dir.path(), 1))).unwrap();
        assert_eq!(
            vm_id_of(&store, "alpha").unwrap(),
            avalanche_api::ids::vm_id("alpha").unwrap().to_string()
        );
    }
}
