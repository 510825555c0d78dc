// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! X-Chain transactions used to mint and move the token of an elastic subnet.

use super::avax::{BaseTx, TransferableOutput};
use super::secp256k1fx::{TransferOutput, TRANSFER_OUTPUT_TYPE_ID};
use super::{CodecError, Decode, Encode, Packer, TxBody, Unpacker};
use crate::ids::Id;

pub const BASE_TX_TYPE_ID: u32 = 0;
pub const CREATE_ASSET_TX_TYPE_ID: u32 = 1;
pub const EXPORT_TX_TYPE_ID: u32 = 4;

/// Index of the secp256k1 feature extension.
pub const SECP256K1_FX_INDEX: u32 = 0;

/// Outputs minted by a `CreateAssetTx` under one feature extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    pub fx_index: u32,
    pub outs: Vec<TransferOutput>,
}

impl Encode for InitialState {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.fx_index)?;
        packer.pack_u32(self.outs.len() as u32)?;
        for out in &self.outs {
            packer.pack_u32(TRANSFER_OUTPUT_TYPE_ID)?;
            out.encode(packer)?;
        }
        Ok(())
    }
}

impl Decode for InitialState {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let fx_index = unpacker.unpack_u32()?;
        let len = unpacker.unpack_u32()? as usize;
        let outs = (0..len)
            .map(|_| {
                unpacker.expect_type_id(TRANSFER_OUTPUT_TYPE_ID)?;
                TransferOutput::decode(unpacker)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fx_index, outs })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAssetTx {
    pub base: BaseTx,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
    pub initial_states: Vec<InitialState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: Id,
    pub exported_outputs: Vec<TransferableOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTx {
    Base(BaseTx),
    CreateAsset(CreateAssetTx),
    Export(ExportTx),
}

impl UnsignedTx {
    pub fn base(&self) -> &BaseTx {
        match self {
            UnsignedTx::Base(base) => base,
            UnsignedTx::CreateAsset(tx) => &tx.base,
            UnsignedTx::Export(tx) => &tx.base,
        }
    }
}

impl Encode for UnsignedTx {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        match self {
            UnsignedTx::Base(base) => {
                packer.pack_u32(BASE_TX_TYPE_ID)?;
                base.encode(packer)
            }
            UnsignedTx::CreateAsset(tx) => {
                packer.pack_u32(CREATE_ASSET_TX_TYPE_ID)?;
                tx.base.encode(packer)?;
                packer.pack_str(&tx.name)?;
                packer.pack_str(&tx.symbol)?;
                packer.pack_u8(tx.denomination)?;
                packer.pack_slice(&tx.initial_states)
            }
            UnsignedTx::Export(tx) => {
                packer.pack_u32(EXPORT_TX_TYPE_ID)?;
                tx.base.encode(packer)?;
                tx.destination_chain.encode(packer)?;
                packer.pack_slice(&tx.exported_outputs)
            }
        }
    }
}

impl Decode for UnsignedTx {
    fn decode(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match u.unpack_u32()? {
            BASE_TX_TYPE_ID => Ok(UnsignedTx::Base(BaseTx::decode(u)?)),
            CREATE_ASSET_TX_TYPE_ID => Ok(UnsignedTx::CreateAsset(CreateAssetTx {
                base: BaseTx::decode(u)?,
                name: u.unpack_str()?,
                symbol: u.unpack_str()?,
                denomination: u.unpack_u8()?,
                initial_states: u.unpack_slice()?,
            })),
            EXPORT_TX_TYPE_ID => Ok(UnsignedTx::Export(ExportTx {
                base: BaseTx::decode(u)?,
                destination_chain: Id::decode(u)?,
                exported_outputs: u.unpack_slice()?,
            })),
            other => Err(CodecError::UnknownTypeId(other)),
        }
    }
}

impl TxBody for UnsignedTx {
    fn funding_inputs(&self) -> usize {
        self.base().ins.len()
    }
}

pub type SignedTx = super::Tx<UnsignedTx>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::secp256k1fx::OutputOwners;
    use crate::ids::ShortId;

    #[test]
    fn test_create_asset_encoding() {
        let tx = UnsignedTx::CreateAsset(CreateAssetTx {
            base: BaseTx::new(5, Id::of(b"x"), vec![], vec![]),
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            denomination: 9,
            initial_states: vec![InitialState {
                fx_index: SECP256K1_FX_INDEX,
                outs: vec![TransferOutput {
                    amount: 720_000_000,
                    owners: OutputOwners::new(1, vec![ShortId::new([4; 20])]),
                }],
            }],
        });
        let bytes = tx.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &CREATE_ASSET_TX_TYPE_ID.to_be_bytes());
        assert_eq!(UnsignedTx::from_bytes(&bytes).unwrap(), tx);

        let signed = SignedTx::new(tx);
        assert_eq!(SignedTx::from_hex(&signed.to_hex().unwrap()).unwrap(), signed);
    }

    #[test]
    fn test_unknown_x_chain_type() {
        // an OperationTx
        assert_eq!(
            UnsignedTx::from_bytes(&2u32.to_be_bytes()),
            Err(CodecError::UnknownTypeId(2))
        );
    }
}
