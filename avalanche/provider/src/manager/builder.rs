// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Builds and signs transactions out of the utxos a keychain controls.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use avalanche_api::codec::avax::{BaseTx, TransferableInput, TransferableOutput, Utxo};
use avalanche_api::codec::pchain::{
    self, AddSubnetValidatorTx, CreateChainTx, CreateSubnetTx, ImportTx,
    RemoveSubnetValidatorTx, SubnetValidator, TransferSubnetOwnershipTx, TransformSubnetTx,
};
use avalanche_api::codec::secp256k1fx::{
    Credential, Input, OutputOwners, TransferInput, TransferOutput, EMPTY_SIGNATURE,
};
use avalanche_api::codec::xchain::{self, CreateAssetTx, InitialState, SECP256K1_FX_INDEX};
use avalanche_api::codec::{Tx, TxBody};
use avalanche_api::elastic::ElasticSubnetConfig;
use avalanche_api::ids::{Id, NodeId, ShortId};
use avalanche_wallet::Keychain;

use crate::node::TxFees;

/// The chain ids, asset and fees transactions are built against.
#[derive(Debug, Clone)]
pub struct ChainContext {
    pub network_id: u32,
    pub x_chain_id: Id,
    pub avax_asset_id: Id,
    pub fees: TxFees,
}

/// The control keys of a subnet and the subset of them that authorizes a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetAuth {
    input: Input,
    signers: Vec<ShortId>,
}

impl SubnetAuth {
    pub fn new(control_keys: &[ShortId], auth_keys: &[ShortId]) -> Result<Self> {
        let owners = OutputOwners::new(0, control_keys.to_vec());
        let mut sig_indices = auth_keys
            .iter()
            .map(|k| {
                owners
                    .index_of(k)
                    .ok_or_else(|| anyhow!("subnet auth key {k} does not belong to control keys"))
            })
            .collect::<Result<Vec<_>>>()?;
        sig_indices.sort_unstable();
        sig_indices.dedup();

        let signers = sig_indices
            .iter()
            .map(|i| owners.addrs[*i as usize])
            .collect();
        Ok(Self {
            input: Input { sig_indices },
            signers,
        })
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Signers of the auth credential, in signature slot order.
    pub fn signers(&self) -> &[ShortId] {
        &self.signers
    }
}

/// Inputs consumed to pay for a transaction, with the change they leave.
#[derive(Debug, Default)]
struct Spend {
    ins: Vec<TransferableInput>,
    signers: Vec<Vec<ShortId>>,
    change: Vec<TransferableOutput>,
}

pub struct TxBuilder<'a> {
    ctx: &'a ChainContext,
    keychain: &'a Keychain,
    now: u64,
}

impl<'a> TxBuilder<'a> {
    pub fn new(ctx: &'a ChainContext, keychain: &'a Keychain) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self { ctx, keychain, now }
    }

    pub fn create_subnet(&self, utxos: &[Utxo], owner: OutputOwners) -> Result<pchain::SignedTx> {
        let spend = self.spend_avax(utxos, self.ctx.fees.create_subnet_tx_fee)?;
        let (base, signers) = self.p_base(spend);
        let unsigned = pchain::UnsignedTx::CreateSubnet(CreateSubnetTx { base, owner });
        self.sign(unsigned, signers)
    }

    pub fn create_chain(
        &self,
        utxos: &[Utxo],
        subnet_id: Id,
        chain_name: &str,
        vm_id: Id,
        genesis: Vec<u8>,
        auth: &SubnetAuth,
    ) -> Result<pchain::SignedTx> {
        let spend = self.spend_avax(utxos, self.ctx.fees.create_blockchain_tx_fee)?;
        let (base, mut signers) = self.p_base(spend);
        signers.push(auth.signers.clone());
        let unsigned = pchain::UnsignedTx::CreateChain(CreateChainTx {
            base,
            subnet_id,
            chain_name: chain_name.to_string(),
            vm_id,
            fx_ids: vec![],
            genesis,
            subnet_auth: auth.input.clone(),
        });
        self.sign(unsigned, signers)
    }

    pub fn add_subnet_validator(
        &self,
        utxos: &[Utxo],
        validator: SubnetValidator,
        auth: &SubnetAuth,
    ) -> Result<pchain::SignedTx> {
        let spend = self.spend_avax(utxos, self.ctx.fees.add_subnet_validator_fee)?;
        let (base, mut signers) = self.p_base(spend);
        signers.push(auth.signers.clone());
        let unsigned = pchain::UnsignedTx::AddSubnetValidator(AddSubnetValidatorTx {
            base,
            validator,
            subnet_auth: auth.input.clone(),
        });
        self.sign(unsigned, signers)
    }

    pub fn remove_subnet_validator(
        &self,
        utxos: &[Utxo],
        node_id: NodeId,
        subnet_id: Id,
        auth: &SubnetAuth,
    ) -> Result<pchain::SignedTx> {
        let spend = self.spend_avax(utxos, self.ctx.fees.tx_fee)?;
        let (base, mut signers) = self.p_base(spend);
        signers.push(auth.signers.clone());
        let unsigned = pchain::UnsignedTx::RemoveSubnetValidator(RemoveSubnetValidatorTx {
            base,
            node_id,
            subnet_id,
            subnet_auth: auth.input.clone(),
        });
        self.sign(unsigned, signers)
    }

    /// The transformation burns the part of the asset supply that is not initially minted.
    pub fn transform_subnet(
        &self,
        utxos: &[Utxo],
        subnet_id: Id,
        config: &ElasticSubnetConfig,
        auth: &SubnetAuth,
    ) -> Result<pchain::SignedTx> {
        let mut burn = BTreeMap::new();
        burn.insert(self.ctx.avax_asset_id, self.ctx.fees.transform_subnet_tx_fee);
        *burn.entry(config.asset_id).or_default() +=
            config.max_supply.saturating_sub(config.initial_supply);

        let spend = self.spend(utxos, &burn)?;
        let (base, mut signers) = self.p_base(spend);
        signers.push(auth.signers.clone());

        let (min_stake_duration, max_stake_duration) = config.stake_duration_secs();
        let unsigned = pchain::UnsignedTx::TransformSubnet(TransformSubnetTx {
            base,
            subnet_id,
            asset_id: config.asset_id,
            initial_supply: config.initial_supply,
            max_supply: config.max_supply,
            min_consumption_rate: config.min_consumption_rate,
            max_consumption_rate: config.max_consumption_rate,
            min_validator_stake: config.min_validator_stake,
            max_validator_stake: config.max_validator_stake,
            min_stake_duration,
            max_stake_duration,
            min_delegation_fee: config.min_delegation_fee,
            min_delegator_stake: config.min_delegator_stake,
            max_validator_weight_factor: config.max_validator_weight_factor,
            uptime_requirement: config.uptime_requirement,
            subnet_auth: auth.input.clone(),
        });
        self.sign(unsigned, signers)
    }

    pub fn transfer_subnet_ownership(
        &self,
        utxos: &[Utxo],
        subnet_id: Id,
        owner: OutputOwners,
        auth: &SubnetAuth,
    ) -> Result<pchain::SignedTx> {
        let spend = self.spend_avax(utxos, self.ctx.fees.tx_fee)?;
        let (base, mut signers) = self.p_base(spend);
        signers.push(auth.signers.clone());
        let unsigned = pchain::UnsignedTx::TransferSubnetOwnership(TransferSubnetOwnershipTx {
            base,
            subnet_id,
            subnet_auth: auth.input.clone(),
            owner,
        });
        self.sign(unsigned, signers)
    }

    /// Imports every atomic utxo exported from the X-Chain to the keychain. The fee is paid out of
    /// the imported AVAX when there is enough of it.
    pub fn import_from_x_chain(
        &self,
        utxos: &[Utxo],
        atomic_utxos: &[Utxo],
        owner: OutputOwners,
    ) -> Result<pchain::SignedTx> {
        let mut imported = vec![];
        let mut amounts: BTreeMap<Id, u64> = BTreeMap::new();
        for utxo in atomic_utxos {
            if let Some((input, signers)) = self.consume(utxo) {
                *amounts.entry(utxo.asset_id).or_default() += input.input.amount;
                imported.push((input, signers));
            }
        }
        if imported.is_empty() {
            return Err(anyhow!("no funds to import from the X-Chain"));
        }
        imported.sort_by(|(a, _), (b, _)| {
            (a.tx_id, a.output_index).cmp(&(b.tx_id, b.output_index))
        });

        let fee = self.ctx.fees.tx_fee;
        let spend = match amounts.get_mut(&self.ctx.avax_asset_id) {
            Some(avax) if *avax >= fee => {
                *avax -= fee;
                Spend::default()
            }
            _ => self.spend_avax(utxos, fee)?,
        };

        let mut outs = spend.change;
        for (asset_id, amount) in amounts {
            if amount > 0 {
                outs.push(TransferableOutput {
                    asset_id,
                    output: TransferOutput {
                        amount,
                        owners: owner.clone(),
                    },
                });
            }
        }

        let mut signers = spend.signers;
        let (imported_inputs, imported_signers): (Vec<_>, Vec<_>) = imported.into_iter().unzip();
        signers.extend(imported_signers);

        let base = BaseTx::new(self.ctx.network_id, Id::EMPTY, spend.ins, outs);
        let unsigned = pchain::UnsignedTx::Import(ImportTx {
            base,
            source_chain: self.ctx.x_chain_id,
            imported_inputs,
        });
        self.sign(unsigned, signers)
    }

    /// Mints a new asset on the X-Chain. The tx id is the asset id.
    pub fn create_asset(
        &self,
        utxos: &[Utxo],
        name: &str,
        symbol: &str,
        denomination: u8,
        holders: Vec<TransferOutput>,
    ) -> Result<xchain::SignedTx> {
        let spend = self.spend_avax(utxos, self.ctx.fees.create_asset_tx_fee)?;
        let base = BaseTx::new(
            self.ctx.network_id,
            self.ctx.x_chain_id,
            spend.ins,
            spend.change,
        );
        let unsigned = xchain::UnsignedTx::CreateAsset(CreateAssetTx {
            base,
            name: name.to_string(),
            symbol: symbol.to_string(),
            denomination,
            initial_states: vec![InitialState {
                fx_index: SECP256K1_FX_INDEX,
                outs: holders,
            }],
        });
        self.sign(unsigned, spend.signers)
    }

    pub fn export_to_p_chain(
        &self,
        utxos: &[Utxo],
        asset_id: Id,
        amount: u64,
        owner: OutputOwners,
    ) -> Result<xchain::SignedTx> {
        let mut burn = BTreeMap::new();
        burn.insert(self.ctx.avax_asset_id, self.ctx.fees.tx_fee);
        *burn.entry(asset_id).or_default() += amount;
        let spend = self.spend(utxos, &burn)?;

        let base = BaseTx::new(
            self.ctx.network_id,
            self.ctx.x_chain_id,
            spend.ins,
            spend.change,
        );
        let mut exported_outputs = vec![TransferableOutput {
            asset_id,
            output: TransferOutput {
                amount,
                owners: owner,
            },
        }];
        avalanche_api::codec::avax::sort_outputs(&mut exported_outputs);
        let unsigned = xchain::UnsignedTx::Export(xchain::ExportTx {
            base,
            destination_chain: Id::EMPTY,
            exported_outputs,
        });
        self.sign(unsigned, spend.signers)
    }

    fn p_base(&self, spend: Spend) -> (BaseTx, Vec<Vec<ShortId>>) {
        let base = BaseTx::new(self.ctx.network_id, Id::EMPTY, spend.ins, spend.change);
        (base, spend.signers)
    }

    fn spend_avax(&self, utxos: &[Utxo], fee: u64) -> Result<Spend> {
        let mut burn = BTreeMap::new();
        burn.insert(self.ctx.avax_asset_id, fee);
        self.spend(utxos, &burn)
    }

    /// Consumes utxos until `burn` is covered for every asset. What is left over goes back to
    /// the first keychain address.
    fn spend(&self, utxos: &[Utxo], burn: &BTreeMap<Id, u64>) -> Result<Spend> {
        let change_addr = self
            .keychain
            .addresses()
            .first()
            .copied()
            .ok_or_else(|| anyhow!("keychain has no keys"))?;

        let mut remaining = burn.clone();
        remaining.retain(|_, amount| *amount > 0);
        let mut consumed: BTreeMap<Id, u64> = BTreeMap::new();
        let mut pairs = vec![];

        for utxo in utxos {
            let needed = match remaining.get(&utxo.asset_id) {
                Some(needed) => *needed,
                None => continue,
            };
            let Some((input, signers)) = self.consume(utxo) else {
                continue;
            };
            let amount = input.input.amount;
            *consumed.entry(utxo.asset_id).or_default() += amount;
            if amount >= needed {
                remaining.remove(&utxo.asset_id);
            } else {
                remaining.insert(utxo.asset_id, needed - amount);
            }
            pairs.push((input, signers));
        }

        if let Some((asset_id, missing)) = remaining.iter().next() {
            return Err(anyhow!(
                "insufficient funds: missing {missing} of asset {asset_id}"
            ));
        }

        pairs.sort_by(|(a, _), (b, _)| (a.tx_id, a.output_index).cmp(&(b.tx_id, b.output_index)));
        let (ins, signers) = pairs.into_iter().unzip();

        let change = consumed
            .into_iter()
            .filter_map(|(asset_id, amount)| {
                let change = amount - burn.get(&asset_id).copied().unwrap_or_default();
                (change > 0).then(|| TransferableOutput {
                    asset_id,
                    output: TransferOutput {
                        amount: change,
                        owners: OutputOwners::new(1, vec![change_addr]),
                    },
                })
            })
            .collect();

        Ok(Spend {
            ins,
            signers,
            change,
        })
    }

    /// The input spending `utxo` and its signers, if the keychain alone can spend it now.
    fn consume(&self, utxo: &Utxo) -> Option<(TransferableInput, Vec<ShortId>)> {
        let out = utxo.output.as_ref()?;
        if out.owners.locktime > self.now {
            return None;
        }
        let threshold = out.owners.threshold as usize;
        let (sig_indices, signers): (Vec<u32>, Vec<ShortId>) = out
            .owners
            .addrs
            .iter()
            .enumerate()
            .filter(|(_, addr)| self.keychain.contains(addr))
            .take(threshold)
            .map(|(i, addr)| (i as u32, *addr))
            .unzip();
        if signers.len() < threshold {
            return None;
        }

        let input = TransferableInput {
            tx_id: utxo.tx_id,
            output_index: utxo.output_index,
            asset_id: utxo.asset_id,
            input: TransferInput {
                amount: out.amount,
                input: Input { sig_indices },
            },
        };
        Some((input, signers))
    }

    fn sign<U: TxBody>(&self, unsigned: U, signers: Vec<Vec<ShortId>>) -> Result<Tx<U>> {
        let mut tx = Tx::new(unsigned);
        let hash = tx.unsigned_hash()?;
        tx.creds = signers
            .iter()
            .map(|addrs| {
                let sigs = addrs
                    .iter()
                    .map(|addr| Ok(self.keychain.sign(addr, &hash)?.unwrap_or(EMPTY_SIGNATURE)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Credential { sigs })
            })
            .collect::<Result<_>>()?;
        Ok(tx)
    }
}

/// Fills the empty slots of the subnet auth credential, the last one of `tx`, that `keychain`
/// can sign. `auth_signers` are the signers of that credential in slot order. Returns how many
/// signatures were added.
pub fn sign_subnet_auth(
    keychain: &Keychain,
    tx: &mut pchain::SignedTx,
    auth_signers: &[ShortId],
) -> Result<usize> {
    let hash = tx.unsigned_hash()?;
    let cred = tx
        .creds
        .last_mut()
        .ok_or_else(|| anyhow!("tx has no credentials"))?;
    if cred.sigs.len() != auth_signers.len() {
        return Err(anyhow!(
            "expected {} subnet auth signature slots, found {}",
            auth_signers.len(),
            cred.sigs.len()
        ));
    }

    let mut signed = 0;
    for (slot, addr) in cred.sigs.iter_mut().zip(auth_signers) {
        if *slot != EMPTY_SIGNATURE {
            continue;
        }
        if let Some(sig) = keychain.sign(addr, &hash)? {
            *slot = sig;
            signed += 1;
        }
    }
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use avalanche_wallet::SoftKey;

    const AVAX: Id = Id::new([1u8; 32]);

    fn context() -> ChainContext {
        ChainContext {
            network_id: 1337,
            x_chain_id: Id::new([2u8; 32]),
            avax_asset_id: AVAX,
            fees: TxFees {
                tx_fee: 1_000,
                create_asset_tx_fee: 10_000,
                create_subnet_tx_fee: 100_000,
                transform_subnet_tx_fee: 1_000_000,
                create_blockchain_tx_fee: 100_000,
                add_subnet_validator_fee: 1_000,
            },
        }
    }

    fn utxo(seed: u8, asset_id: Id, amount: u64, owners: OutputOwners) -> Utxo {
        Utxo {
            tx_id: Id::new([seed; 32]),
            output_index: 0,
            asset_id,
            output: Some(TransferOutput { amount, owners }),
        }
    }

    fn owned_by(key: &SoftKey) -> OutputOwners {
        OutputOwners::new(1, vec![key.address()])
    }

    #[test]
    fn test_create_subnet_pays_fee_with_change() {
        let ctx = context();
        let key = SoftKey::random();
        let keychain = Keychain::new([key.clone()]);
        let builder = TxBuilder::new(&ctx, &keychain);

        let utxos = vec![
            utxo(9, AVAX, 60_000, owned_by(&key)),
            utxo(3, AVAX, 70_000, owned_by(&key)),
            // not ours
            utxo(5, AVAX, 1_000_000, owned_by(&SoftKey::random())),
        ];
        let tx = builder
            .create_subnet(&utxos, OutputOwners::new(1, vec![key.address()]))
            .unwrap();

        let base = tx.unsigned.base();
        assert_eq!(base.ins.len(), 2);
        assert!(base.ins[0].tx_id < base.ins[1].tx_id);
        assert_eq!(base.outs.len(), 1);
        assert_eq!(base.outs[0].output.amount, 30_000);
        assert_eq!(tx.creds.len(), 2);
        assert!(tx.creds.iter().all(|c| c.is_fully_signed()));
    }

    #[test]
    fn test_insufficient_funds() {
        let ctx = context();
        let key = SoftKey::random();
        let keychain = Keychain::new([key.clone()]);
        let builder = TxBuilder::new(&ctx, &keychain);

        let err = builder
            .create_subnet(&[utxo(1, AVAX, 10, owned_by(&key))], owned_by(&key))
            .unwrap_err();
        assert!(err.to_string().starts_with("insufficient funds"));
    }

    #[test]
    fn test_subnet_auth_slots() {
        let ctx = context();
        let payer = SoftKey::random();
        let other = SoftKey::random();
        let keychain = Keychain::new([payer.clone()]);
        let builder = TxBuilder::new(&ctx, &keychain);

        let control = vec![other.address(), payer.address()];
        let auth = SubnetAuth::new(&control, &control).unwrap();
        let tx = builder
            .create_chain(
                &[utxo(1, AVAX, 1_000_000, owned_by(&payer))],
                Id::new([7u8; 32]),
                "chain",
                Id::new([8u8; 32]),
                b"{}".to_vec(),
                &auth,
            )
            .unwrap();

        assert_eq!(auth.input().sig_indices, vec![0, 1]);
        let cred = tx.creds.last().unwrap();
        assert_eq!(cred.sigs.len(), 2);
        assert!(!cred.is_fully_signed());

        // the other control key completes the credential
        let mut tx = tx;
        let other_chain = Keychain::new([other]);
        let added = sign_subnet_auth(&other_chain, &mut tx, auth.signers()).unwrap();
        assert_eq!(added, 1);
        assert!(tx.creds.last().unwrap().is_fully_signed());
    }

    #[test]
    fn test_subnet_auth_rejects_foreign_key() {
        let control = vec![SoftKey::random().address()];
        let foreign = SoftKey::random().address();
        assert!(SubnetAuth::new(&control, &[foreign]).is_err());
    }

    #[test]
    fn test_import_pays_fee_from_imported_avax() {
        let ctx = context();
        let key = SoftKey::random();
        let keychain = Keychain::new([key.clone()]);
        let builder = TxBuilder::new(&ctx, &keychain);
        let asset = Id::new([4u8; 32]);

        let atomic = vec![
            utxo(1, asset, 500, owned_by(&key)),
            utxo(2, AVAX, 5_000, owned_by(&key)),
        ];
        let tx = builder
            .import_from_x_chain(&[], &atomic, owned_by(&key))
            .unwrap();
        let pchain::UnsignedTx::Import(import) = &tx.unsigned else {
            panic!("expected an import tx");
        };
        assert!(import.base.ins.is_empty());
        assert_eq!(import.imported_inputs.len(), 2);
        let total: u64 = import.base.outs.iter().map(|o| o.output.amount).sum();
        assert_eq!(total, 500 + 4_000);
        assert_eq!(tx.creds.len(), 2);
    }
}
