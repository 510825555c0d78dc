// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Signing and committing the transactions saved by the multisig flows.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Result};
use avalanche_api::codec::pchain::{SignedTx, UnsignedTx};
use avalanche_api::ids::{Id, ShortId};
use avalanche_api::network::{Network, NetworkKind, FUJI_ID, LOCAL_NETWORK_ID, MAINNET_ID};
use avalanche_api::sidecar::Sidecar;

use crate::manager::SubnetDeployer;
use crate::multisig::{
    get_auth_signers, get_owners, get_remaining_signers, is_ready_to_commit,
    save_not_fully_signed_tx,
};
use crate::node::NodeClient;
use crate::store::SubnetStore;
use crate::validators::NO_SUBNET_ID;

/// The network a transaction was built for.
pub fn tx_network_kind(tx: &SignedTx) -> NetworkKind {
    match tx.unsigned.base().network_id {
        MAINNET_ID => NetworkKind::Mainnet,
        FUJI_ID => NetworkKind::Fuji,
        LOCAL_NETWORK_ID => NetworkKind::Local,
        _ => NetworkKind::Devnet,
    }
}

/// The subnet of `subnet_name` on `kind`, which `tx` has to modify.
fn tx_subnet(sidecar: &Sidecar, kind: NetworkKind, tx: &SignedTx) -> Result<Id> {
    let subnet_id = sidecar.subnet_id(kind).ok_or_else(|| anyhow!(NO_SUBNET_ID))?;
    match tx.unsigned.subnet_id() {
        Some(id) if id == subnet_id => Ok(subnet_id),
        Some(id) => Err(anyhow!(
            "tx modifies subnet {id}, but {} is {subnet_id}",
            sidecar.name
        )),
        None => Err(anyhow!(
            "unexpected {} tx, expected a subnet changing tx",
            tx.unsigned.kind()
        )),
    }
}

/// Adds the signatures the keychain holds to the tx stored at `path` and saves it back.
#[allow(clippy::too_many_arguments)]
pub async fn sign(
    out: &mut (impl Write + Send),
    store: &SubnetStore,
    deployer: &dyn SubnetDeployer,
    node: &dyn NodeClient,
    network: &Network,
    keychain: &[ShortId],
    subnet_name: &str,
    tx: SignedTx,
    path: &Path,
) -> Result<SignedTx> {
    let kind = network.kind();
    let sidecar = store.load_sidecar(subnet_name)?;
    let subnet_id = tx_subnet(&sidecar, kind, &tx)?;
    let (control_keys, _) = get_owners(node, &sidecar, kind, subnet_id).await?;

    let remaining = get_remaining_signers(&tx, &control_keys)?;
    if remaining.is_empty() {
        return Err(anyhow!("tx is already fully signed"));
    }
    if !remaining.iter().any(|k| keychain.contains(k)) {
        return Err(anyhow!("wallet does not contain subnet auth keys"));
    }
    let subnet_auth_keys = get_auth_signers(&tx, &control_keys)?;

    let tx = deployer.sign(tx, &subnet_auth_keys, subnet_id).await?;
    log::info!("signed {} tx for {subnet_name}", tx.unsigned.kind());
    save_not_fully_signed_tx(
        out,
        &tx,
        subnet_name,
        &control_keys,
        &subnet_auth_keys,
        network.id(),
        path,
        true,
    )?;
    Ok(tx)
}

/// Issues a fully signed tx and records its effect on the subnet in the sidecar.
pub async fn commit(
    out: &mut (impl Write + Send),
    store: &SubnetStore,
    deployer: &dyn SubnetDeployer,
    node: &dyn NodeClient,
    network: &Network,
    subnet_name: &str,
    tx: SignedTx,
) -> Result<Id> {
    let kind = network.kind();
    let mut sidecar = store.load_sidecar(subnet_name)?;
    let subnet_id = tx_subnet(&sidecar, kind, &tx)?;
    let (control_keys, _) = get_owners(node, &sidecar, kind, subnet_id).await?;

    if !is_ready_to_commit(&tx, &control_keys)? {
        return Err(anyhow!("tx is not fully signed"));
    }

    let tx_id = deployer.commit(&tx).await?;
    log::info!("committed {} tx {tx_id} for {subnet_name}", tx.unsigned.kind());
    writeln!(out, "Transaction successful, transaction ID: {tx_id}")?;

    match &tx.unsigned {
        UnsignedTx::CreateChain(create) => {
            sidecar.record_deployment(kind, subnet_id, tx_id);
            store.update_sidecar(&mut sidecar)?;
            crate::deploy::print_deploy_results(
                out,
                network,
                &create.chain_name,
                subnet_id,
                create.vm_id,
                tx_id,
            )?;
        }
        UnsignedTx::TransferSubnetOwnership(_) => {
            sidecar.record_ownership_transfer(kind, tx_id);
            store.update_sidecar(&mut sidecar)?;
        }
        _ => {}
    }
    Ok(tx_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::manager::PublicDeployer;
    use crate::multisig::{load_tx, save_tx};
    use crate::testing::{create_subnet_tx, MockDeployer, MockNode};
    use avalanche_api::codec::avax::BaseTx;
    use avalanche_api::codec::pchain::CreateChainTx;
    use avalanche_api::codec::secp256k1fx::{Credential, Input};
    use avalanche_api::sidecar::VmType;
    use avalanche_types::key::secp256k1::public_key;
    use avalanche_wallet::{Keychain, SoftKey};

    const SUBNET: &str = "multisig";

    struct Fixture {
        dir: tempfile::TempDir,
        store: SubnetStore,
        node: MockNode,
        key: ShortId,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        let mut sidecar = Sidecar::new(SUBNET, VmType::Custom);
        let subnet_id = Id::of(b"subnet");
        sidecar.record_deployment(NetworkKind::Fuji, subnet_id, Id::EMPTY);
        store.update_sidecar(&mut sidecar).unwrap();
        let key = ShortId::new([7; 20]);
        let node = MockNode::default().with_tx(subnet_id, &create_subnet_tx(&[key], 1));
        Fixture {
            dir,
            store,
            node,
            key,
        }
    }

    fn chain_tx(key: ShortId, partially_signed: bool) -> SignedTx {
        MockDeployer {
            partially_signed,
            ..Default::default()
        }
        .result(b"chain", &[key], &[key])
        .tx
    }

    #[test]
    fn test_tx_network_kind() {
        let mut tx = create_subnet_tx(&[], 0);
        assert_eq!(tx_network_kind(&tx), NetworkKind::Devnet);
        if let UnsignedTx::CreateSubnet(create) = &mut tx.unsigned {
            create.base.network_id = FUJI_ID;
        }
        assert_eq!(tx_network_kind(&tx), NetworkKind::Fuji);
    }

    #[tokio::test]
    async fn test_sign() {
        let f = fixture();
        let path = f.dir.path().join("chain.tx");
        let deployer = MockDeployer::default();
        let network = Network::fuji();

        let err = sign(
            &mut Vec::new(),
            &f.store,
            &deployer,
            &f.node,
            &network,
            &[f.key],
            SUBNET,
            chain_tx(f.key, false),
            &path,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "tx is already fully signed");

        let err = sign(
            &mut Vec::new(),
            &f.store,
            &deployer,
            &f.node,
            &network,
            &[ShortId::new([9; 20])],
            SUBNET,
            chain_tx(f.key, true),
            &path,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "wallet does not contain subnet auth keys");

        let pending = chain_tx(f.key, true);
        save_tx(&pending, &path, false).unwrap();
        let mut out = Vec::new();
        sign(
            &mut out,
            &f.store,
            &deployer,
            &f.node,
            &network,
            &[f.key],
            SUBNET,
            pending.clone(),
            &path,
        )
        .await
        .unwrap();
        assert_eq!(deployer.calls(), vec!["sign"]);
        // the file is overwritten in place
        assert_eq!(load_tx(&path).unwrap(), pending);
        assert!(String::from_utf8(out).unwrap().contains("Overwriting"));
    }

    fn recover_signer(hash: &[u8; 32], sig: &[u8]) -> ShortId {
        let key = public_key::Key::from_signature(hash, sig).unwrap();
        ShortId::from(&key.to_short_id().unwrap())
    }

    #[tokio::test]
    async fn test_sign_through_file_until_ready() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubnetStore::new(dir.path());
        let first = SoftKey::random();
        let second = SoftKey::random();
        let subnet_id = Id::of(b"subnet");
        let mut sidecar = Sidecar::new(SUBNET, VmType::Custom);
        sidecar.record_deployment(NetworkKind::Fuji, subnet_id, Id::EMPTY);
        store.update_sidecar(&mut sidecar).unwrap();
        let owners = [first.address(), second.address()];
        let mut control_keys = owners.to_vec();
        control_keys.sort();
        let node = MockNode::default().with_tx(subnet_id, &create_subnet_tx(&owners, 2));
        let network = Network::fuji();

        let mut pending = SignedTx::new(UnsignedTx::CreateChain(CreateChainTx {
            base: BaseTx {
                network_id: FUJI_ID,
                ..Default::default()
            },
            subnet_id,
            chain_name: "chain".to_string(),
            vm_id: Id::of(b"vm"),
            fx_ids: vec![],
            genesis: b"{}".to_vec(),
            subnet_auth: Input {
                sig_indices: vec![0, 1],
            },
        }));
        pending.creds = vec![Credential::unsigned(2)];
        let path = dir.path().join("chain.tx");
        save_tx(&pending, &path, false).unwrap();
        let hash = pending.unsigned_hash().unwrap();

        for (signer, expected_remaining) in [(&first, 1), (&second, 0)] {
            let deployer = PublicDeployer::new(
                network.clone(),
                Arc::new(MockNode::default()),
                Keychain::new([signer.clone()]),
            );
            let tx = load_tx(&path).unwrap();
            sign(
                &mut Vec::new(),
                &store,
                &deployer,
                &node,
                &network,
                &[signer.address()],
                SUBNET,
                tx,
                &path,
            )
            .await
            .unwrap();

            let saved = load_tx(&path).unwrap();
            let slot = control_keys
                .iter()
                .position(|k| *k == signer.address())
                .unwrap();
            assert_eq!(recover_signer(&hash, &saved.creds[0].sigs[slot]), signer.address());
            assert_eq!(
                get_remaining_signers(&saved, &control_keys).unwrap().len(),
                expected_remaining
            );
            assert_eq!(saved.unsigned, pending.unsigned);
        }

        let tx = load_tx(&path).unwrap();
        assert!(tx.creds[0].is_fully_signed());
        let deployer = MockDeployer::default();
        let tx_id = commit(&mut Vec::new(), &store, &deployer, &node, &network, SUBNET, tx)
            .await
            .unwrap();
        let sidecar = store.load_sidecar(SUBNET).unwrap();
        assert_eq!(sidecar.blockchain_id(NetworkKind::Fuji), Some(tx_id));
    }

    #[tokio::test]
    async fn test_commit_records_blockchain() {
        let f = fixture();
        let deployer = MockDeployer::default();
        let network = Network::fuji();

        let err = commit(
            &mut Vec::new(),
            &f.store,
            &deployer,
            &f.node,
            &network,
            SUBNET,
            chain_tx(f.key, true),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "tx is not fully signed");

        let tx = chain_tx(f.key, false);
        let tx_id = commit(
            &mut Vec::new(),
            &f.store,
            &deployer,
            &f.node,
            &network,
            SUBNET,
            tx.clone(),
        )
        .await
        .unwrap();
        assert_eq!(tx_id, tx.id().unwrap());
        let sidecar = f.store.load_sidecar(SUBNET).unwrap();
        assert_eq!(sidecar.blockchain_id(NetworkKind::Fuji), Some(tx_id));
        assert_eq!(sidecar.subnet_id(NetworkKind::Fuji), Some(Id::of(b"subnet")));
    }

    #[tokio::test]
    async fn test_commit_rejects_other_subnet() {
        let f = fixture();
        let err = commit(
            &mut Vec::new(),
            &f.store,
            &MockDeployer::default(),
            &f.node,
            &Network::local(),
            SUBNET,
            chain_tx(f.key, false),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), NO_SUBNET_ID);
    }
}
