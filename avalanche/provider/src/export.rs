// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Moving a subnet configuration between machines.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use avalanche_api::codec::pchain::{SignedTx, UnsignedTx};
use avalanche_api::codec::Decode;
use avalanche_api::export::Exportable;
use avalanche_api::ids::Id;
use avalanche_api::network::NetworkKind;
use avalanche_api::sidecar::{Sidecar, VmType};

use crate::node::NodeClient;
use crate::store::{evm_chain_id, write_file, ConfigFile, SubnetStore};
use crate::subnet::check_subnet_name;

const ALREADY_EXISTS: &str = "subnet already exists. Use --force parameter to overwrite";

/// Where the source of a custom VM lives, required to export one.
#[derive(Debug, Clone, Default)]
pub struct CustomVmSource {
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub build_script: Option<String>,
}

/// Bundles the sidecar, genesis and config blobs of `name` into `output` as JSON.
pub fn export_subnet(
    store: &SubnetStore,
    name: &str,
    source: &CustomVmSource,
    output: &Path,
) -> Result<()> {
    if !store.sidecar_exists(name) {
        return Err(anyhow!("invalid subnet {name:?}"));
    }
    let mut sidecar = store.load_sidecar(name)?;

    if sidecar.vm == VmType::Custom && sidecar.custom_vm_repo_url.is_empty() {
        let missing = |flag: &str| {
            anyhow!("custom VM source code repository not defined for subnet, set --{flag}")
        };
        sidecar.custom_vm_repo_url = source.repo_url.clone().ok_or_else(|| missing("custom-vm-repo-url"))?;
        sidecar.custom_vm_branch = source.branch.clone().ok_or_else(|| missing("custom-vm-branch"))?;
        sidecar.custom_vm_build_script = source
            .build_script
            .clone()
            .ok_or_else(|| missing("custom-vm-build-script"))?;
        store.update_sidecar(&mut sidecar)?;
    }

    let genesis = store.load_raw_genesis(name)?;
    let mut bundle = Exportable {
        sidecar,
        genesis: Some(genesis),
        node_config: None,
        chain_config: None,
        subnet_config: None,
        network_upgrades: None,
    };
    for (file, bytes) in store.config_files(name)? {
        *blob_mut(&mut bundle, file) = Some(bytes);
    }

    let bytes = serde_json::to_vec(&bundle)?;
    write_file(output, &bytes)?;
    log::info!("exported subnet {name} to {output:?}");
    Ok(())
}

/// Recreates a subnet from an export bundle. Returns the name of the imported subnet.
pub fn import_subnet(store: &SubnetStore, path: &Path, force: bool) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
    let mut bundle: Exportable =
        serde_json::from_slice(&bytes).context("failed to parse export data")?;

    let name = bundle.sidecar.name.clone();
    if name.is_empty() {
        return Err(anyhow!("export data is malformed: missing subnet name"));
    }
    check_subnet_name(&name)?;
    if store.genesis_exists(&name) && !force {
        return Err(anyhow!(ALREADY_EXISTS));
    }

    if bundle.sidecar.vm == VmType::Custom {
        let sc = &bundle.sidecar;
        if sc.custom_vm_repo_url.is_empty() {
            return Err(anyhow!("repository url must be defined for custom vm import"));
        }
        if sc.custom_vm_branch.is_empty() {
            return Err(anyhow!("repository branch must be defined for custom vm import"));
        }
        if sc.custom_vm_build_script.is_empty() {
            return Err(anyhow!("build script must be defined for custom vm import"));
        }
        log::warn!(
            "custom VM of {name} must be built from {} ({}) with {} and placed at {:?}",
            sc.custom_vm_repo_url,
            sc.custom_vm_branch,
            sc.custom_vm_build_script,
            store.custom_vm_path(&name)
        );
    }

    let genesis = bundle.genesis.take().unwrap_or_default();
    store.check_evm_chain_id(&bundle.sidecar, &genesis)?;
    store.write_genesis(&name, &genesis)?;

    for file in [
        ConfigFile::Node,
        ConfigFile::Chain,
        ConfigFile::Subnet,
        ConfigFile::NetworkUpgrades,
    ] {
        match blob_mut(&mut bundle, file).take() {
            Some(bytes) => store.write_config_file(&name, file, &bytes)?,
            None => store.remove_config_file(&name, file)?,
        }
    }

    store.create_sidecar(&mut bundle.sidecar)?;
    log::info!("imported subnet {name} from {path:?}");
    Ok(name)
}

#[derive(Debug, Clone)]
pub struct ImportPublicRequest {
    pub blockchain_id: Id,
    pub vm: VmType,
    /// Replaces the genesis carried by the chain creation tx.
    pub genesis_path: Option<PathBuf>,
    pub vm_version: String,
    pub force: bool,
}

/// Recreates the configuration of a blockchain running on `kind` from its `CreateChainTx`. The
/// RPC version is asked to `validator`, a node of the subnet, when one is given. Returns the name
/// of the imported subnet.
pub async fn import_public(
    store: &SubnetStore,
    node: &dyn NodeClient,
    validator: Option<&dyn NodeClient>,
    kind: NetworkKind,
    request: ImportPublicRequest,
) -> Result<String> {
    let blockchain_id = request.blockchain_id;
    let bytes = node
        .get_tx(&blockchain_id)
        .await
        .with_context(|| format!("blockchain tx {blockchain_id} query error"))?;
    let tx = SignedTx::from_bytes(&bytes)
        .with_context(|| format!("couldn't unmarshal tx {blockchain_id}"))?;
    let chain = match tx.unsigned {
        UnsignedTx::CreateChain(chain) => chain,
        other => return Err(anyhow!("expected a CreateChainTx, got {}", other.kind())),
    };
    log::info!(
        "retrieved blockchain {blockchain_id}: subnet {}, name {}, vm {}",
        chain.subnet_id,
        chain.chain_name,
        chain.vm_id
    );

    let name = chain.chain_name;
    check_subnet_name(&name)?;
    if store.sidecar_exists(&name) && !request.force {
        return Err(anyhow!(ALREADY_EXISTS));
    }
    let genesis = match &request.genesis_path {
        Some(path) => fs::read(path).with_context(|| format!("failed to read {path:?}"))?,
        None => chain.genesis,
    };

    let mut sidecar = Sidecar::new(&name, request.vm);
    sidecar.record_deployment(kind, chain.subnet_id, blockchain_id);
    sidecar.imported_vm_id = chain.vm_id.to_string();
    sidecar.imported_from_apm = true;
    sidecar.vm_version = request.vm_version;
    if let Some(validator) = validator {
        sidecar.rpc_version = validator
            .rpc_protocol_version()
            .await
            .context("failed to query node, is it running and reachable?")?;
    }
    if request.vm == VmType::SubnetEvm {
        sidecar.chain_id = evm_chain_id(&genesis)
            .ok_or_else(|| anyhow!("genesis of {name} has no EVM chain id"))?;
    }
    store.check_evm_chain_id(&sidecar, &genesis)?;

    store.write_genesis(&name, &genesis)?;
    store.create_sidecar(&mut sidecar)?;
    log::info!("imported subnet {name} from {kind}");
    Ok(name)
}

fn blob_mut(bundle: &mut Exportable, file: ConfigFile) -> &mut Option<Vec<u8>> {
    match file {
        ConfigFile::Node => &mut bundle.node_config,
        ConfigFile::Chain => &mut bundle.chain_config,
        ConfigFile::Subnet => &mut bundle.subnet_config,
        ConfigFile::NetworkUpgrades => &mut bundle.network_upgrades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_subnet_tx, MockNode};
    use avalanche_api::codec::avax::BaseTx;
    use avalanche_api::codec::pchain::CreateChainTx;
    use avalanche_api::codec::secp256k1fx::Input;

    const GENESIS: &[u8] = br#"{"config":{"chainId":43210}}"#;

    #[test]
    fn test_export_import_subnet() {
        let src = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(src.path());
        let mut sidecar = Sidecar::new("testSubnet", VmType::SubnetEvm);
        sidecar.vm_version = "v0.6.0".to_string();
        sidecar.chain_id = "43210".to_string();
        store.create_sidecar(&mut sidecar).unwrap();
        store.write_genesis("testSubnet", GENESIS).unwrap();
        store
            .write_config_file("testSubnet", ConfigFile::Chain, br#"{"log-level":"debug"}"#)
            .unwrap();

        let export_path = src.path().join("export.json");
        export_subnet(&store, "testSubnet", &CustomVmSource::default(), &export_path).unwrap();

        let bundle: Exportable =
            serde_json::from_slice(&fs::read(&export_path).unwrap()).unwrap();
        assert_eq!(bundle.sidecar, store.load_sidecar("testSubnet").unwrap());
        assert_eq!(bundle.genesis.as_deref(), Some(GENESIS));
        assert!(bundle.node_config.is_none());

        let dst = tempfile::tempdir().unwrap();
        let other = SubnetStore::new(dst.path());
        // a stale node config is removed by the import
        other
            .write_config_file("testSubnet", ConfigFile::Node, b"{}")
            .unwrap();

        let name = import_subnet(&other, &export_path, false).unwrap();
        assert_eq!(name, "testSubnet");
        assert_eq!(other.load_sidecar(&name).unwrap(), bundle.sidecar);
        assert_eq!(other.load_raw_genesis(&name).unwrap(), GENESIS);
        assert_eq!(
            other.load_config_file(&name, ConfigFile::Chain).unwrap().as_deref(),
            Some(&br#"{"log-level":"debug"}"#[..])
        );
        assert!(other.load_config_file(&name, ConfigFile::Node).unwrap().is_none());

        assert_eq!(
            import_subnet(&other, &export_path, false)
                .unwrap_err()
                .to_string(),
            "subnet already exists. Use --force parameter to overwrite"
        );
        assert!(import_subnet(&other, &export_path, true).is_ok());
    }

    fn write_bundle(path: &Path, sidecar: Sidecar) {
        let bundle = Exportable {
            sidecar,
            genesis: Some(GENESIS.to_vec()),
            node_config: Some(b"{}".to_vec()),
            chain_config: None,
            subnet_config: None,
            network_upgrades: None,
        };
        fs::write(path, serde_json::to_vec(&bundle).unwrap()).unwrap();
    }

    #[test]
    fn test_import_rejects_path_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path().join("subnets"));
        let path = dir.path().join("bundle.json");
        write_bundle(&path, Sidecar::new("../../escaped", VmType::SubnetEvm));

        let err = import_subnet(&store, &path, false).unwrap_err();
        assert!(err.to_string().contains("contains invalid characters"));
        assert!(!dir.path().join("escaped").exists());
        assert!(!store.genesis_exists("../../escaped"));
    }

    #[test]
    fn test_import_duplicate_chain_id_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        let mut existing = Sidecar::new("first", VmType::SubnetEvm);
        existing.chain_id = "43210".to_string();
        store.write_genesis("first", GENESIS).unwrap();
        store.create_sidecar(&mut existing).unwrap();

        let path = dir.path().join("bundle.json");
        write_bundle(&path, Sidecar::new("second", VmType::SubnetEvm));
        assert_eq!(
            import_subnet(&store, &path, false).unwrap_err().to_string(),
            "chain ID 43210 is already in use by another subnet"
        );
        assert!(!store.genesis_exists("second"));
        assert!(!store.sidecar_exists("second"));
        assert!(store
            .load_config_file("second", ConfigFile::Node)
            .unwrap()
            .is_none());

        // once the clash is gone the import goes through without --force
        store.delete_subnet("first").unwrap();
        assert_eq!(import_subnet(&store, &path, false).unwrap(), "second");
    }

    fn create_chain_tx(name: &str, genesis: &[u8]) -> SignedTx {
        SignedTx::new(UnsignedTx::CreateChain(CreateChainTx {
            base: BaseTx::default(),
            subnet_id: Id::of(b"subnet"),
            chain_name: name.to_string(),
            vm_id: Id::of(b"vm"),
            fx_ids: vec![],
            genesis: genesis.to_vec(),
            subnet_auth: Input {
                sig_indices: vec![0],
            },
        }))
    }

    fn public_request(blockchain_id: Id) -> ImportPublicRequest {
        ImportPublicRequest {
            blockchain_id,
            vm: VmType::SubnetEvm,
            genesis_path: None,
            vm_version: "v0.6.0".to_string(),
            force: false,
        }
    }

    #[tokio::test]
    async fn test_import_public() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        let blockchain_id = Id::of(b"chain");
        let node = MockNode::default().with_tx(blockchain_id, &create_chain_tx("running", GENESIS));
        let validator = MockNode::default();

        let name = import_public(
            &store,
            &node,
            Some(&validator as &dyn NodeClient),
            NetworkKind::Fuji,
            public_request(blockchain_id),
        )
        .await
        .unwrap();
        assert_eq!(name, "running");
        assert_eq!(store.load_raw_genesis(&name).unwrap(), GENESIS);

        let sidecar = store.load_sidecar(&name).unwrap();
        assert_eq!(sidecar.subnet_id(NetworkKind::Fuji), Some(Id::of(b"subnet")));
        assert_eq!(sidecar.blockchain_id(NetworkKind::Fuji), Some(blockchain_id));
        assert_eq!(sidecar.imported_vm_id, Id::of(b"vm").to_string());
        assert!(sidecar.imported_from_apm);
        assert_eq!(sidecar.chain_id, "43210");
        assert_eq!(sidecar.vm_version, "v0.6.0");
        assert_eq!(sidecar.rpc_version, validator.rpc_protocol_version().await.unwrap());

        let err = import_public(&store, &node, None, NetworkKind::Fuji, public_request(blockchain_id))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), ALREADY_EXISTS);
    }

    #[tokio::test]
    async fn test_import_public_genesis_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path().join("subnets"));
        let blockchain_id = Id::of(b"chain");
        let node = MockNode::default().with_tx(blockchain_id, &create_chain_tx("running", b"{}"));

        let genesis_path = dir.path().join("genesis.json");
        fs::write(&genesis_path, GENESIS).unwrap();
        let request = ImportPublicRequest {
            genesis_path: Some(genesis_path),
            ..public_request(blockchain_id)
        };
        let name = import_public(&store, &node, None, NetworkKind::Mainnet, request)
            .await
            .unwrap();
        assert_eq!(store.load_raw_genesis(&name).unwrap(), GENESIS);
        assert_eq!(store.load_sidecar(&name).unwrap().rpc_version, 0);
    }

    #[tokio::test]
    async fn test_import_public_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        let subnet_id = Id::of(b"subnet");
        let escaping_id = Id::of(b"escaping");
        let node = MockNode::default()
            .with_tx(subnet_id, &create_subnet_tx(&[], 1))
            .with_tx(escaping_id, &create_chain_tx("../escaped", GENESIS));

        let err = import_public(&store, &node, None, NetworkKind::Fuji, public_request(subnet_id))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "expected a CreateChainTx, got Create Subnet");

        let err = import_public(&store, &node, None, NetworkKind::Fuji, public_request(escaping_id))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("contains invalid characters"));
        assert!(store.sidecar_names().unwrap().is_empty());
    }

    #[test]
    fn test_export_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        let out = dir.path().join("out.json");
        assert_eq!(
            export_subnet(&store, "missing", &CustomVmSource::default(), &out)
                .unwrap_err()
                .to_string(),
            "invalid subnet \"missing\""
        );

        let mut sidecar = Sidecar::new("custom", VmType::Custom);
        store.create_sidecar(&mut sidecar).unwrap();
        store.write_genesis("custom", b"{}").unwrap();
        assert!(export_subnet(&store, "custom", &CustomVmSource::default(), &out).is_err());

        let source = CustomVmSource {
            repo_url: Some("https://example.org/vm".to_string()),
            branch: Some("main".to_string()),
            build_script: Some("scripts/build.sh".to_string()),
        };
        export_subnet(&store, "custom", &source, &out).unwrap();
        assert_eq!(store.load_sidecar("custom").unwrap().custom_vm_branch, "main");
    }

    #[test]
    fn test_import_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        let path = dir.path().join("bundle.json");
        let bundle = Exportable {
            sidecar: Sidecar::new("", VmType::SubnetEvm),
            genesis: None,
            node_config: None,
            chain_config: None,
            subnet_config: None,
            network_upgrades: None,
        };
        fs::write(&path, serde_json::to_vec(&bundle).unwrap()).unwrap();
        assert_eq!(
            import_subnet(&store, &path, false).unwrap_err().to_string(),
            "export data is malformed: missing subnet name"
        );

        let bundle = Exportable {
            sidecar: Sidecar::new("vm", VmType::Custom),
            ..bundle
        };
        fs::write(&path, serde_json::to_vec(&bundle).unwrap()).unwrap();
        assert_eq!(
            import_subnet(&store, &path, false).unwrap_err().to_string(),
            "repository url must be defined for custom vm import"
        );
    }
}
