// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Outputs, inputs and credentials of the secp256k1 feature extension.

use super::{CodecError, Decode, Encode, Packer, Unpacker};
use crate::ids::ShortId;

pub const TRANSFER_INPUT_TYPE_ID: u32 = 5;
pub const TRANSFER_OUTPUT_TYPE_ID: u32 = 7;
pub const CREDENTIAL_TYPE_ID: u32 = 9;
pub const INPUT_TYPE_ID: u32 = 10;
pub const OUTPUT_OWNERS_TYPE_ID: u32 = 11;

pub const SIGNATURE_LEN: usize = 65;

/// A recoverable secp256k1 signature `r || s || v`.
pub type Signature = [u8; SIGNATURE_LEN];

pub const EMPTY_SIGNATURE: Signature = [0u8; SIGNATURE_LEN];

/// A set of addresses of which `threshold` must sign to spend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOwners {
    pub locktime: u64,
    pub threshold: u32,
    /// Kept sorted ascending.
    pub addrs: Vec<ShortId>,
}

impl OutputOwners {
    pub fn new(threshold: u32, mut addrs: Vec<ShortId>) -> Self {
        addrs.sort();
        addrs.dedup();
        Self {
            locktime: 0,
            threshold,
            addrs,
        }
    }

    /// The position of `addr` in the owners, which is its signature index.
    pub fn index_of(&self, addr: &ShortId) -> Option<u32> {
        self.addrs.iter().position(|a| a == addr).map(|i| i as u32)
    }
}

impl Encode for OutputOwners {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.locktime)?;
        packer.pack_u32(self.threshold)?;
        packer.pack_slice(&self.addrs)
    }
}

impl Decode for OutputOwners {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            locktime: unpacker.unpack_u64()?,
            threshold: unpacker.unpack_u32()?,
            addrs: unpacker.unpack_slice()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

impl Encode for TransferOutput {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.amount)?;
        self.owners.encode(packer)
    }
}

impl Decode for TransferOutput {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: unpacker.unpack_u64()?,
            owners: OutputOwners::decode(unpacker)?,
        })
    }
}

/// Signature indices into the owners of the output being spent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    pub sig_indices: Vec<u32>,
}

impl Encode for Input {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_slice(&self.sig_indices)
    }
}

impl Decode for Input {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            sig_indices: unpacker.unpack_slice()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInput {
    pub amount: u64,
    pub input: Input,
}

impl Encode for TransferInput {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.amount)?;
        self.input.encode(packer)
    }
}

impl Decode for TransferInput {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: unpacker.unpack_u64()?,
            input: Input::decode(unpacker)?,
        })
    }
}

/// One signature per signature index of the matching input. Unsigned slots are zero filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub sigs: Vec<Signature>,
}

impl Credential {
    pub fn unsigned(slots: usize) -> Self {
        Self {
            sigs: vec![EMPTY_SIGNATURE; slots],
        }
    }

    pub fn is_fully_signed(&self) -> bool {
        self.sigs.iter().all(|s| s != &EMPTY_SIGNATURE)
    }
}

impl Encode for Credential {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(CREDENTIAL_TYPE_ID)?;
        packer.pack_u32(self.sigs.len() as u32)?;
        for sig in &self.sigs {
            packer.pack_fixed(sig)?;
        }
        Ok(())
    }
}

impl Decode for Credential {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        unpacker.expect_type_id(CREDENTIAL_TYPE_ID)?;
        let len = unpacker.unpack_u32()? as usize;
        let sigs = (0..len)
            .map(|_| unpacker.unpack_fixed::<SIGNATURE_LEN>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sigs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owners_sorted_and_indexed() {
        let a = ShortId::new([1u8; 20]);
        let b = ShortId::new([2u8; 20]);
        let owners = OutputOwners::new(1, vec![b, a, b]);
        assert_eq!(owners.addrs, vec![a, b]);
        assert_eq!(owners.index_of(&b), Some(1));
        assert_eq!(owners.index_of(&ShortId::new([3u8; 20])), None);
    }

    #[test]
    fn test_transfer_output_layout() {
        let out = TransferOutput {
            amount: 1,
            owners: OutputOwners::new(1, vec![ShortId::new([0xaa; 20])]),
        };
        let bytes = out.to_bytes().unwrap();
        // amount, locktime, threshold, address count, address
        assert_eq!(bytes.len(), 8 + 8 + 4 + 4 + 20);
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(TransferOutput::from_bytes(&bytes).unwrap(), out);
    }

    #[test]
    fn test_credential_signed_state() {
        let mut cred = Credential::unsigned(2);
        assert!(!cred.is_fully_signed());
        cred.sigs[0] = [1u8; SIGNATURE_LEN];
        cred.sigs[1] = [2u8; SIGNATURE_LEN];
        assert!(cred.is_fully_signed());

        let bytes = cred.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &CREDENTIAL_TYPE_ID.to_be_bytes());
        assert_eq!(Credential::from_bytes(&bytes).unwrap(), cred);
    }
}
