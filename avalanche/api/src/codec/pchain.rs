// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! P-Chain transactions.

use strum::Display;

use super::avax::{BaseTx, TransferableInput, TransferableOutput};
use super::secp256k1fx::{Input, OutputOwners, INPUT_TYPE_ID, OUTPUT_OWNERS_TYPE_ID};
use super::{CodecError, Decode, Encode, Packer, TxBody, Unpacker};
use crate::ids::{Id, NodeId};

pub const ADD_SUBNET_VALIDATOR_TX_TYPE_ID: u32 = 13;
pub const CREATE_CHAIN_TX_TYPE_ID: u32 = 15;
pub const CREATE_SUBNET_TX_TYPE_ID: u32 = 16;
pub const IMPORT_TX_TYPE_ID: u32 = 17;
pub const EXPORT_TX_TYPE_ID: u32 = 18;
pub const REMOVE_SUBNET_VALIDATOR_TX_TYPE_ID: u32 = 23;
pub const TRANSFORM_SUBNET_TX_TYPE_ID: u32 = 24;
pub const TRANSFER_SUBNET_OWNERSHIP_TX_TYPE_ID: u32 = 33;

fn encode_subnet_auth(auth: &Input, packer: &mut Packer) -> Result<(), CodecError> {
    packer.pack_u32(INPUT_TYPE_ID)?;
    auth.encode(packer)
}

fn decode_subnet_auth(unpacker: &mut Unpacker<'_>) -> Result<Input, CodecError> {
    unpacker.expect_type_id(INPUT_TYPE_ID)?;
    Input::decode(unpacker)
}

fn encode_owner(owner: &OutputOwners, packer: &mut Packer) -> Result<(), CodecError> {
    packer.pack_u32(OUTPUT_OWNERS_TYPE_ID)?;
    owner.encode(packer)
}

fn decode_owner(unpacker: &mut Unpacker<'_>) -> Result<OutputOwners, CodecError> {
    unpacker.expect_type_id(OUTPUT_OWNERS_TYPE_ID)?;
    OutputOwners::decode(unpacker)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubnetTx {
    pub base: BaseTx,
    pub owner: OutputOwners,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateChainTx {
    pub base: BaseTx,
    pub subnet_id: Id,
    pub chain_name: String,
    pub vm_id: Id,
    pub fx_ids: Vec<Id>,
    pub genesis: Vec<u8>,
    pub subnet_auth: Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetValidator {
    pub node_id: NodeId,
    /// Unix seconds.
    pub start: u64,
    pub end: u64,
    pub weight: u64,
    pub subnet_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSubnetValidatorTx {
    pub base: BaseTx,
    pub validator: SubnetValidator,
    pub subnet_auth: Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveSubnetValidatorTx {
    pub base: BaseTx,
    pub node_id: NodeId,
    pub subnet_id: Id,
    pub subnet_auth: Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSubnetTx {
    pub base: BaseTx,
    pub subnet_id: Id,
    pub asset_id: Id,
    pub initial_supply: u64,
    pub max_supply: u64,
    pub min_consumption_rate: u64,
    pub max_consumption_rate: u64,
    pub min_validator_stake: u64,
    pub max_validator_stake: u64,
    pub min_stake_duration: u32,
    pub max_stake_duration: u32,
    pub min_delegation_fee: u32,
    pub min_delegator_stake: u64,
    pub max_validator_weight_factor: u8,
    pub uptime_requirement: u32,
    pub subnet_auth: Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSubnetOwnershipTx {
    pub base: BaseTx,
    pub subnet_id: Id,
    pub subnet_auth: Input,
    pub owner: OutputOwners,
}

/// Import of atomic utxos from another chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: Id,
    pub exported_outputs: Vec<TransferableOutput>,
}

/// Human readable names, as shown when reporting signature progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TxKind {
    #[strum(serialize = "Create Subnet")]
    CreateSubnet,
    #[strum(serialize = "Create Chain")]
    CreateChain,
    #[strum(serialize = "Add Subnet Validator")]
    AddSubnetValidator,
    #[strum(serialize = "Remove Subnet Validator")]
    RemoveSubnetValidator,
    #[strum(serialize = "Transform Subnet")]
    TransformSubnet,
    #[strum(serialize = "Transfer Subnet Ownership")]
    TransferSubnetOwnership,
    #[strum(serialize = "Import")]
    Import,
    #[strum(serialize = "Export")]
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTx {
    CreateSubnet(CreateSubnetTx),
    CreateChain(CreateChainTx),
    AddSubnetValidator(AddSubnetValidatorTx),
    RemoveSubnetValidator(RemoveSubnetValidatorTx),
    TransformSubnet(TransformSubnetTx),
    TransferSubnetOwnership(TransferSubnetOwnershipTx),
    Import(ImportTx),
    Export(ExportTx),
}

impl UnsignedTx {
    pub fn type_id(&self) -> u32 {
        match self {
            UnsignedTx::CreateSubnet(_) => CREATE_SUBNET_TX_TYPE_ID,
            UnsignedTx::CreateChain(_) => CREATE_CHAIN_TX_TYPE_ID,
            UnsignedTx::AddSubnetValidator(_) => ADD_SUBNET_VALIDATOR_TX_TYPE_ID,
            UnsignedTx::RemoveSubnetValidator(_) => REMOVE_SUBNET_VALIDATOR_TX_TYPE_ID,
            UnsignedTx::TransformSubnet(_) => TRANSFORM_SUBNET_TX_TYPE_ID,
            UnsignedTx::TransferSubnetOwnership(_) => TRANSFER_SUBNET_OWNERSHIP_TX_TYPE_ID,
            UnsignedTx::Import(_) => IMPORT_TX_TYPE_ID,
            UnsignedTx::Export(_) => EXPORT_TX_TYPE_ID,
        }
    }

    pub fn kind(&self) -> TxKind {
        match self {
            UnsignedTx::CreateSubnet(_) => TxKind::CreateSubnet,
            UnsignedTx::CreateChain(_) => TxKind::CreateChain,
            UnsignedTx::AddSubnetValidator(_) => TxKind::AddSubnetValidator,
            UnsignedTx::RemoveSubnetValidator(_) => TxKind::RemoveSubnetValidator,
            UnsignedTx::TransformSubnet(_) => TxKind::TransformSubnet,
            UnsignedTx::TransferSubnetOwnership(_) => TxKind::TransferSubnetOwnership,
            UnsignedTx::Import(_) => TxKind::Import,
            UnsignedTx::Export(_) => TxKind::Export,
        }
    }

    pub fn base(&self) -> &BaseTx {
        match self {
            UnsignedTx::CreateSubnet(tx) => &tx.base,
            UnsignedTx::CreateChain(tx) => &tx.base,
            UnsignedTx::AddSubnetValidator(tx) => &tx.base,
            UnsignedTx::RemoveSubnetValidator(tx) => &tx.base,
            UnsignedTx::TransformSubnet(tx) => &tx.base,
            UnsignedTx::TransferSubnetOwnership(tx) => &tx.base,
            UnsignedTx::Import(tx) => &tx.base,
            UnsignedTx::Export(tx) => &tx.base,
        }
    }

    /// The control key authorization of subnet changing transactions.
    pub fn subnet_auth(&self) -> Option<&Input> {
        match self {
            UnsignedTx::CreateChain(tx) => Some(&tx.subnet_auth),
            UnsignedTx::AddSubnetValidator(tx) => Some(&tx.subnet_auth),
            UnsignedTx::RemoveSubnetValidator(tx) => Some(&tx.subnet_auth),
            UnsignedTx::TransformSubnet(tx) => Some(&tx.subnet_auth),
            UnsignedTx::TransferSubnetOwnership(tx) => Some(&tx.subnet_auth),
            UnsignedTx::CreateSubnet(_) | UnsignedTx::Import(_) | UnsignedTx::Export(_) => None,
        }
    }

    /// The subnet a transaction modifies.
    pub fn subnet_id(&self) -> Option<Id> {
        match self {
            UnsignedTx::CreateChain(tx) => Some(tx.subnet_id),
            UnsignedTx::AddSubnetValidator(tx) => Some(tx.validator.subnet_id),
            UnsignedTx::RemoveSubnetValidator(tx) => Some(tx.subnet_id),
            UnsignedTx::TransformSubnet(tx) => Some(tx.subnet_id),
            UnsignedTx::TransferSubnetOwnership(tx) => Some(tx.subnet_id),
            UnsignedTx::CreateSubnet(_) | UnsignedTx::Import(_) | UnsignedTx::Export(_) => None,
        }
    }

    /// The subnet owners set by a `CreateSubnetTx` or a `TransferSubnetOwnershipTx`.
    pub fn owner(&self) -> Option<&OutputOwners> {
        match self {
            UnsignedTx::CreateSubnet(tx) => Some(&tx.owner),
            UnsignedTx::TransferSubnetOwnership(tx) => Some(&tx.owner),
            _ => None,
        }
    }
}

impl Encode for UnsignedTx {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.type_id())?;
        self.base().encode(packer)?;
        match self {
            UnsignedTx::CreateSubnet(tx) => encode_owner(&tx.owner, packer),
            UnsignedTx::CreateChain(tx) => {
                tx.subnet_id.encode(packer)?;
                packer.pack_str(&tx.chain_name)?;
                tx.vm_id.encode(packer)?;
                packer.pack_slice(&tx.fx_ids)?;
                packer.pack_bytes(&tx.genesis)?;
                encode_subnet_auth(&tx.subnet_auth, packer)
            }
            UnsignedTx::AddSubnetValidator(tx) => {
                let v = &tx.validator;
                v.node_id.encode(packer)?;
                packer.pack_u64(v.start)?;
                packer.pack_u64(v.end)?;
                packer.pack_u64(v.weight)?;
                v.subnet_id.encode(packer)?;
                encode_subnet_auth(&tx.subnet_auth, packer)
            }
            UnsignedTx::RemoveSubnetValidator(tx) => {
                tx.node_id.encode(packer)?;
                tx.subnet_id.encode(packer)?;
                encode_subnet_auth(&tx.subnet_auth, packer)
            }
            UnsignedTx::TransformSubnet(tx) => {
                tx.subnet_id.encode(packer)?;
                tx.asset_id.encode(packer)?;
                packer.pack_u64(tx.initial_supply)?;
                packer.pack_u64(tx.max_supply)?;
                packer.pack_u64(tx.min_consumption_rate)?;
                packer.pack_u64(tx.max_consumption_rate)?;
                packer.pack_u64(tx.min_validator_stake)?;
                packer.pack_u64(tx.max_validator_stake)?;
                packer.pack_u32(tx.min_stake_duration)?;
                packer.pack_u32(tx.max_stake_duration)?;
                packer.pack_u32(tx.min_delegation_fee)?;
                packer.pack_u64(tx.min_delegator_stake)?;
                packer.pack_u8(tx.max_validator_weight_factor)?;
                packer.pack_u32(tx.uptime_requirement)?;
                encode_subnet_auth(&tx.subnet_auth, packer)
            }
            UnsignedTx::TransferSubnetOwnership(tx) => {
                tx.subnet_id.encode(packer)?;
                encode_subnet_auth(&tx.subnet_auth, packer)?;
                encode_owner(&tx.owner, packer)
            }
            UnsignedTx::Import(tx) => {
                tx.source_chain.encode(packer)?;
                packer.pack_slice(&tx.imported_inputs)
            }
            UnsignedTx::Export(tx) => {
                tx.destination_chain.encode(packer)?;
                packer.pack_slice(&tx.exported_outputs)
            }
        }
    }
}

impl Decode for UnsignedTx {
    fn decode(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let type_id = u.unpack_u32()?;
        // reject unknown types before reading further
        if !matches!(
            type_id,
            ADD_SUBNET_VALIDATOR_TX_TYPE_ID
                | CREATE_CHAIN_TX_TYPE_ID
                | CREATE_SUBNET_TX_TYPE_ID
                | IMPORT_TX_TYPE_ID
                | EXPORT_TX_TYPE_ID
                | REMOVE_SUBNET_VALIDATOR_TX_TYPE_ID
                | TRANSFORM_SUBNET_TX_TYPE_ID
                | TRANSFER_SUBNET_OWNERSHIP_TX_TYPE_ID
        ) {
            return Err(CodecError::UnknownTypeId(type_id));
        }
        let base = BaseTx::decode(u)?;
        let tx = match type_id {
            CREATE_SUBNET_TX_TYPE_ID => UnsignedTx::CreateSubnet(CreateSubnetTx {
                base,
                owner: decode_owner(u)?,
            }),
            CREATE_CHAIN_TX_TYPE_ID => UnsignedTx::CreateChain(CreateChainTx {
                base,
                subnet_id: Id::decode(u)?,
                chain_name: u.unpack_str()?,
                vm_id: Id::decode(u)?,
                fx_ids: u.unpack_slice()?,
                genesis: u.unpack_bytes()?,
                subnet_auth: decode_subnet_auth(u)?,
            }),
            ADD_SUBNET_VALIDATOR_TX_TYPE_ID => {
                UnsignedTx::AddSubnetValidator(AddSubnetValidatorTx {
                    base,
                    validator: SubnetValidator {
                        node_id: NodeId::decode(u)?,
                        start: u.unpack_u64()?,
                        end: u.unpack_u64()?,
                        weight: u.unpack_u64()?,
                        subnet_id: Id::decode(u)?,
                    },
                    subnet_auth: decode_subnet_auth(u)?,
                })
            }
            REMOVE_SUBNET_VALIDATOR_TX_TYPE_ID => {
                UnsignedTx::RemoveSubnetValidator(RemoveSubnetValidatorTx {
                    base,
                    node_id: NodeId::decode(u)?,
                    subnet_id: Id::decode(u)?,
                    subnet_auth: decode_subnet_auth(u)?,
                })
            }
            TRANSFORM_SUBNET_TX_TYPE_ID => UnsignedTx::TransformSubnet(TransformSubnetTx {
                base,
                subnet_id: Id::decode(u)?,
                asset_id: Id::decode(u)?,
                initial_supply: u.unpack_u64()?,
                max_supply: u.unpack_u64()?,
                min_consumption_rate: u.unpack_u64()?,
                max_consumption_rate: u.unpack_u64()?,
                min_validator_stake: u.unpack_u64()?,
                max_validator_stake: u.unpack_u64()?,
                min_stake_duration: u.unpack_u32()?,
                max_stake_duration: u.unpack_u32()?,
                min_delegation_fee: u.unpack_u32()?,
                min_delegator_stake: u.unpack_u64()?,
                max_validator_weight_factor: u.unpack_u8()?,
                uptime_requirement: u.unpack_u32()?,
                subnet_auth: decode_subnet_auth(u)?,
            }),
            TRANSFER_SUBNET_OWNERSHIP_TX_TYPE_ID => {
                UnsignedTx::TransferSubnetOwnership(TransferSubnetOwnershipTx {
                    base,
                    subnet_id: Id::decode(u)?,
                    subnet_auth: decode_subnet_auth(u)?,
                    owner: decode_owner(u)?,
                })
            }
            IMPORT_TX_TYPE_ID => UnsignedTx::Import(ImportTx {
                base,
                source_chain: Id::decode(u)?,
                imported_inputs: u.unpack_slice()?,
            }),
            _ => UnsignedTx::Export(ExportTx {
                base,
                destination_chain: Id::decode(u)?,
                exported_outputs: u.unpack_slice()?,
            }),
        };
        Ok(tx)
    }
}

impl TxBody for UnsignedTx {
    fn funding_inputs(&self) -> usize {
        let imported = match self {
            UnsignedTx::Import(tx) => tx.imported_inputs.len(),
            _ => 0,
        };
        self.base().ins.len() + imported
    }
}

pub type SignedTx = super::Tx<UnsignedTx>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::avax::{TransferableInput, TransferableOutput};
    use crate::codec::secp256k1fx::{Credential, TransferInput, TransferOutput};
    use crate::codec::CODEC_VERSION;
    use crate::ids::ShortId;

    fn base() -> BaseTx {
        BaseTx::new(
            5,
            Id::EMPTY,
            vec![TransferableInput {
                tx_id: Id::of(b"utxo"),
                output_index: 0,
                asset_id: Id::of(b"avax"),
                input: TransferInput {
                    amount: 1_000_000_000,
                    input: Input {
                        sig_indices: vec![0],
                    },
                },
            }],
            vec![],
        )
    }

    fn create_chain() -> UnsignedTx {
        UnsignedTx::CreateChain(CreateChainTx {
            base: base(),
            subnet_id: Id::of(b"subnet"),
            chain_name: "mychain".to_string(),
            vm_id: Id::of(b"vm"),
            fx_ids: vec![],
            genesis: b"{}".to_vec(),
            subnet_auth: Input {
                sig_indices: vec![0, 1],
            },
        })
    }

    #[test]
    fn test_create_chain_header() {
        let tx = SignedTx::new(create_chain());
        let bytes = tx.unsigned_bytes().unwrap();
        assert_eq!(&bytes[..2], &CODEC_VERSION.to_be_bytes());
        assert_eq!(&bytes[2..6], &CREATE_CHAIN_TX_TYPE_ID.to_be_bytes());
        assert_eq!(tx.unsigned.kind().to_string(), "Create Chain");
        assert_eq!(tx.unsigned.subnet_id(), Some(Id::of(b"subnet")));
        assert_eq!(tx.unsigned.funding_inputs(), 1);
    }

    #[test]
    fn test_signed_tx_hex_form() {
        let mut tx = SignedTx::new(create_chain());
        tx.creds = vec![Credential::unsigned(1), Credential::unsigned(2)];
        let decoded = SignedTx::from_hex(&tx.to_hex().unwrap()).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.id().unwrap(), tx.id().unwrap());
        // credentials do not change what is signed
        let unsigned = SignedTx::new(create_chain());
        assert_eq!(decoded.unsigned_hash().unwrap(), unsigned.unsigned_hash().unwrap());
        assert_ne!(decoded.id().unwrap(), unsigned.id().unwrap());
    }

    #[test]
    fn test_owner_of_ownership_txs() {
        let owner = OutputOwners::new(2, vec![ShortId::new([1; 20]), ShortId::new([2; 20])]);
        let create = UnsignedTx::CreateSubnet(CreateSubnetTx {
            base: base(),
            owner: owner.clone(),
        });
        assert_eq!(create.owner(), Some(&owner));
        assert!(create.subnet_auth().is_none());

        let transfer = UnsignedTx::TransferSubnetOwnership(TransferSubnetOwnershipTx {
            base: base(),
            subnet_id: Id::of(b"subnet"),
            subnet_auth: Input {
                sig_indices: vec![1],
            },
            owner: owner.clone(),
        });
        let decoded = UnsignedTx::from_bytes(&transfer.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.owner(), Some(&owner));
        assert_eq!(decoded.kind(), TxKind::TransferSubnetOwnership);
    }

    /// A Fuji base tx spending one utxo into one change output.
    fn golden_base() -> BaseTx {
        BaseTx {
            network_id: 5,
            blockchain_id: Id::EMPTY,
            outs: vec![TransferableOutput {
                asset_id: Id::new([0x44; 32]),
                output: TransferOutput {
                    amount: 500,
                    owners: OutputOwners::new(1, vec![ShortId::new([0x22; 20])]),
                },
            }],
            ins: vec![TransferableInput {
                tx_id: Id::new([0x33; 32]),
                output_index: 1,
                asset_id: Id::new([0x44; 32]),
                input: TransferInput {
                    amount: 1_000_000_000,
                    input: Input {
                        sig_indices: vec![0],
                    },
                },
            }],
            memo: vec![],
        }
    }

    fn golden_base_hex(type_id: &str) -> String {
        [
            "0000",     // codec version
            type_id,    // tx type
            "00000005", // network id
            &"00".repeat(32),
            // outputs
            "00000001",
            &"44".repeat(32),
            "00000007",
            "00000000000001f4",
            "0000000000000000",
            "00000001",
            "00000001",
            &"22".repeat(20),
            // inputs
            "00000001",
            &"33".repeat(32),
            "00000001",
            &"44".repeat(32),
            "00000005",
            "000000003b9aca00",
            "00000001",
            "00000000",
            // memo
            "00000000",
        ]
        .concat()
    }

    fn assert_golden(tx: &SignedTx, expected: &str) {
        let bytes = hex::decode(expected).unwrap();
        assert_eq!(hex::encode(tx.to_bytes().unwrap()), expected);
        assert_eq!(&SignedTx::from_bytes(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_create_subnet_golden_bytes() {
        let tx = SignedTx::new(UnsignedTx::CreateSubnet(CreateSubnetTx {
            base: golden_base(),
            owner: OutputOwners::new(1, vec![ShortId::new([0x22; 20])]),
        }));
        let unsigned = [
            golden_base_hex("00000010"),
            "0000000b".to_string(),
            "0000000000000000".to_string(),
            "00000001".to_string(),
            "00000001".to_string(),
            "22".repeat(20),
        ]
        .concat();
        assert_eq!(hex::encode(tx.unsigned_bytes().unwrap()), unsigned);
        // no credentials yet
        assert_golden(&tx, &format!("{unsigned}00000000"));

        let mut signed = tx.clone();
        signed.creds = vec![Credential {
            sigs: vec![[0xab; 65]],
        }];
        let creds = ["00000001", "00000009", "00000001", &"ab".repeat(65)].concat();
        assert_golden(&signed, &format!("{unsigned}{creds}"));
        assert_eq!(signed.unsigned_hash().unwrap(), tx.unsigned_hash().unwrap());
    }

    #[test]
    fn test_create_chain_golden_bytes() {
        let tx = SignedTx::new(UnsignedTx::CreateChain(CreateChainTx {
            base: golden_base(),
            subnet_id: Id::new([0x66; 32]),
            chain_name: "mychain".to_string(),
            vm_id: Id::new([0x55; 32]),
            fx_ids: vec![],
            genesis: b"{}".to_vec(),
            subnet_auth: Input {
                sig_indices: vec![0],
            },
        }));
        let expected = [
            golden_base_hex("0000000f"),
            "66".repeat(32),
            "0007".to_string(),
            hex::encode("mychain"),
            "55".repeat(32),
            "00000000".to_string(),
            "00000002".to_string(),
            "7b7d".to_string(),
            "0000000a".to_string(),
            "00000001".to_string(),
            "00000000".to_string(),
            "00000000".to_string(),
        ]
        .concat();
        assert_golden(&tx, &expected);
    }

    #[test]
    fn test_transform_subnet_golden_bytes() {
        let tx = SignedTx::new(UnsignedTx::TransformSubnet(TransformSubnetTx {
            base: golden_base(),
            subnet_id: Id::new([0x66; 32]),
            asset_id: Id::new([0x77; 32]),
            initial_supply: 1000,
            max_supply: 2000,
            min_consumption_rate: 100_000,
            max_consumption_rate: 120_000,
            min_validator_stake: 1,
            max_validator_stake: 1000,
            min_stake_duration: 86_400,
            max_stake_duration: 31_536_000,
            min_delegation_fee: 20_000,
            min_delegator_stake: 1,
            max_validator_weight_factor: 5,
            uptime_requirement: 800_000,
            subnet_auth: Input {
                sig_indices: vec![0],
            },
        }));
        let expected = [
            golden_base_hex("00000018"),
            "66".repeat(32),
            "77".repeat(32),
            [
                "00000000000003e8",
                "00000000000007d0",
                "00000000000186a0",
                "000000000001d4c0",
                "0000000000000001",
                "00000000000003e8",
                "00015180",
                "01e13380",
                "00004e20",
                "0000000000000001",
                "05",
                "000c3500",
                "0000000a",
                "00000001",
                "00000000",
                "00000000",
            ]
            .concat(),
        ]
        .concat();
        assert_golden(&tx, &expected);
    }

    #[test]
    fn test_unknown_type_id() {
        let mut bytes = create_chain().to_bytes().unwrap();
        bytes[..4].copy_from_slice(&99u32.to_be_bytes());
        assert_eq!(
            UnsignedTx::from_bytes(&bytes),
            Err(CodecError::UnknownTypeId(99))
        );
    }
}
