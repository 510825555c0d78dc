// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use super::formatting::{decode_hex_with_checksum, encode_hex_with_checksum};
use super::secp256k1fx::Credential;
use super::{CodecError, Decode, Encode, Packer, Unpacker, CODEC_VERSION};
use crate::ids::{sha256, Id};

/// The unsigned part of a transaction of one chain, encoded with its type id.
pub trait TxBody: Encode + Decode + Clone {
    /// Number of credentials that authorize spending, one per consumed utxo.
    fn funding_inputs(&self) -> usize;
}

/// A transaction with its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx<U> {
    pub unsigned: U,
    pub creds: Vec<Credential>,
}

impl<U: TxBody> Tx<U> {
    pub fn new(unsigned: U) -> Self {
        Self {
            unsigned,
            creds: Vec::new(),
        }
    }

    pub fn unsigned_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut packer = Packer::new();
        packer.pack_u16(CODEC_VERSION)?;
        self.unsigned.encode(&mut packer)?;
        Ok(packer.into_bytes())
    }

    /// The message every credential signs.
    pub fn unsigned_hash(&self) -> Result<[u8; 32], CodecError> {
        Ok(sha256(&self.unsigned_bytes()?))
    }

    pub fn id(&self) -> Result<Id, CodecError> {
        Ok(Id::of(&self.to_bytes()?))
    }

    pub fn to_hex(&self) -> Result<String, CodecError> {
        Ok(encode_hex_with_checksum(&self.to_bytes()?))
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        Self::from_bytes(&decode_hex_with_checksum(s)?)
    }
}

impl<U: TxBody> Encode for Tx<U> {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u16(CODEC_VERSION)?;
        self.unsigned.encode(packer)?;
        packer.pack_slice(&self.creds)
    }
}

impl<U: TxBody> Decode for Tx<U> {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let version = unpacker.unpack_u16()?;
        if version != CODEC_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        Ok(Self {
            unsigned: U::decode(unpacker)?,
            creds: unpacker.unpack_slice()?,
        })
    }
}
