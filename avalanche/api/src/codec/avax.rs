// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Components shared by the P-Chain and X-Chain formats.

use super::secp256k1fx::{
    TransferInput, TransferOutput, TRANSFER_INPUT_TYPE_ID, TRANSFER_OUTPUT_TYPE_ID,
};
use super::{CodecError, Decode, Encode, Packer, Unpacker, CODEC_VERSION};
use crate::ids::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOutput {
    pub asset_id: Id,
    pub output: TransferOutput,
}

impl Encode for TransferableOutput {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.asset_id.encode(packer)?;
        packer.pack_u32(TRANSFER_OUTPUT_TYPE_ID)?;
        self.output.encode(packer)
    }
}

impl Decode for TransferableOutput {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let asset_id = Id::decode(unpacker)?;
        unpacker.expect_type_id(TRANSFER_OUTPUT_TYPE_ID)?;
        Ok(Self {
            asset_id,
            output: TransferOutput::decode(unpacker)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableInput {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub input: TransferInput,
}

impl Encode for TransferableInput {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.tx_id.encode(packer)?;
        packer.pack_u32(self.output_index)?;
        self.asset_id.encode(packer)?;
        packer.pack_u32(TRANSFER_INPUT_TYPE_ID)?;
        self.input.encode(packer)
    }
}

impl Decode for TransferableInput {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let tx_id = Id::decode(unpacker)?;
        let output_index = unpacker.unpack_u32()?;
        let asset_id = Id::decode(unpacker)?;
        unpacker.expect_type_id(TRANSFER_INPUT_TYPE_ID)?;
        Ok(Self {
            tx_id,
            output_index,
            asset_id,
            input: TransferInput::decode(unpacker)?,
        })
    }
}

/// Sorts inputs by the utxo they spend.
pub fn sort_inputs(ins: &mut [TransferableInput]) {
    ins.sort_by(|a, b| (a.tx_id, a.output_index).cmp(&(b.tx_id, b.output_index)));
}

/// Sorts outputs by their encoded bytes.
pub fn sort_outputs(outs: &mut [TransferableOutput]) {
    // transfer outputs always encode
    outs.sort_by_cached_key(|o| o.to_bytes().unwrap_or_default());
}

/// The fields every transaction starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outs: Vec<TransferableOutput>,
    pub ins: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl BaseTx {
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        mut ins: Vec<TransferableInput>,
        mut outs: Vec<TransferableOutput>,
    ) -> Self {
        sort_inputs(&mut ins);
        sort_outputs(&mut outs);
        Self {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo: Vec::new(),
        }
    }
}

impl Encode for BaseTx {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.network_id)?;
        self.blockchain_id.encode(packer)?;
        packer.pack_slice(&self.outs)?;
        packer.pack_slice(&self.ins)?;
        packer.pack_bytes(&self.memo)
    }
}

impl Decode for BaseTx {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            network_id: unpacker.unpack_u32()?,
            blockchain_id: Id::decode(unpacker)?,
            outs: unpacker.unpack_slice()?,
            ins: unpacker.unpack_slice()?,
            memo: unpacker.unpack_bytes()?,
        })
    }
}

/// An unspent output as returned by `getUTXOs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    /// `None` for output types other than a plain transfer, e.g. stakeable locked outputs.
    pub output: Option<TransferOutput>,
}

impl Utxo {
    /// Parses a single utxo blob. Bytes after an unsupported output type are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        let version = unpacker.unpack_u16()?;
        if version != CODEC_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let tx_id = Id::decode(&mut unpacker)?;
        let output_index = unpacker.unpack_u32()?;
        let asset_id = Id::decode(&mut unpacker)?;
        let output = match unpacker.unpack_u32()? {
            TRANSFER_OUTPUT_TYPE_ID => Some(TransferOutput::decode(&mut unpacker)?),
            _ => None,
        };
        Ok(Self {
            tx_id,
            output_index,
            asset_id,
            output,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut packer = Packer::new();
        packer.pack_u16(CODEC_VERSION)?;
        self.tx_id.encode(&mut packer)?;
        packer.pack_u32(self.output_index)?;
        self.asset_id.encode(&mut packer)?;
        if let Some(out) = &self.output {
            packer.pack_u32(TRANSFER_OUTPUT_TYPE_ID)?;
            out.encode(&mut packer)?;
        }
        Ok(packer.into_bytes())
    }
}
