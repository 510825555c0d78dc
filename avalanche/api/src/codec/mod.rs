// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Binary codec of the P-Chain and X-Chain transactions issued by the tooling.
//!
//! Values are packed big-endian. Slices carry a `u32` length prefix, strings a `u16` one,
//! and interface values a `u32` type id ahead of their fields. Encoding fails on values whose
//! length does not fit their prefix.

use avalanche_types::packer;
use thiserror::Error;

use crate::ids::{Id, NodeId, ShortId};

pub mod avax;
pub mod formatting;
pub mod pchain;
pub mod secp256k1fx;
mod tx;
pub mod xchain;

pub use tx::{Tx, TxBody};

/// The only codec version produced and accepted.
pub const CODEC_VERSION: u16 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("unknown type id {0}")]
    UnknownTypeId(u32),
    #[error("unsupported codec version {0}")]
    UnsupportedVersion(u16),
    #[error("{0} trailing bytes after decoding")]
    TrailingBytes(usize),
    #[error("invalid utf-8 string")]
    InvalidString,
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
    #[error("checksum mismatch")]
    InvalidChecksum,
    #[error("value of {len} bytes exceeds the limit of {max}")]
    TooLong { len: usize, max: usize },
    #[error("packing failed: {0}")]
    Pack(String),
}

/// Largest encoded value the packer accepts.
pub const MAX_ENCODED_LEN: usize = i32::MAX as usize;

/// Appends big-endian values on top of the avalanche-types packer.
pub struct Packer {
    inner: packer::Packer,
}

impl Default for Packer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Packer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packer").finish_non_exhaustive()
    }
}

fn pack_err(e: impl std::fmt::Display) -> CodecError {
    CodecError::Pack(e.to_string())
}

impl Packer {
    pub fn new() -> Self {
        Self {
            inner: packer::Packer::new(MAX_ENCODED_LEN, 128),
        }
    }

    pub fn pack_u8(&mut self, v: u8) -> Result<(), CodecError> {
        self.pack_fixed(&[v])
    }

    pub fn pack_u16(&mut self, v: u16) -> Result<(), CodecError> {
        self.inner.pack_u16(v).map_err(pack_err)
    }

    pub fn pack_u32(&mut self, v: u32) -> Result<(), CodecError> {
        self.inner.pack_u32(v).map_err(pack_err)
    }

    pub fn pack_u64(&mut self, v: u64) -> Result<(), CodecError> {
        self.inner.pack_u64(v).map_err(pack_err)
    }

    pub fn pack_fixed(&mut self, v: &[u8]) -> Result<(), CodecError> {
        self.inner.pack_bytes(v).map_err(pack_err)
    }

    pub fn pack_bytes(&mut self, v: &[u8]) -> Result<(), CodecError> {
        let len = u32::try_from(v.len()).map_err(|_| CodecError::TooLong {
            len: v.len(),
            max: u32::MAX as usize,
        })?;
        self.pack_u32(len)?;
        self.pack_fixed(v)
    }

    /// Strings carry a `u16` length, longer ones are refused.
    pub fn pack_str(&mut self, v: &str) -> Result<(), CodecError> {
        let len = u16::try_from(v.len()).map_err(|_| CodecError::TooLong {
            len: v.len(),
            max: u16::MAX as usize,
        })?;
        self.pack_u16(len)?;
        self.pack_fixed(v.as_bytes())
    }

    pub fn pack_slice<T: Encode>(&mut self, items: &[T]) -> Result<(), CodecError> {
        let len = u32::try_from(items.len()).map_err(|_| CodecError::TooLong {
            len: items.len(),
            max: u32::MAX as usize,
        })?;
        self.pack_u32(len)?;
        for item in items {
            item.encode(self)?;
        }
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.take_bytes().to_vec()
    }
}

/// Reads big-endian values off a byte slice.
#[derive(Debug)]
pub struct Unpacker<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn unpack_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn unpack_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn unpack_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn unpack_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    pub fn unpack_fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        self.take_array()
    }

    pub fn unpack_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.unpack_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn unpack_str(&mut self) -> Result<String, CodecError> {
        let len = self.unpack_u16()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidString)
    }

    pub fn unpack_slice<T: Decode>(&mut self) -> Result<Vec<T>, CodecError> {
        let len = self.unpack_u32()? as usize;
        // every element takes at least one byte
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        (0..len).map(|_| T::decode(self)).collect()
    }

    /// Reads a type id and checks it against `expected`.
    pub fn expect_type_id(&mut self, expected: u32) -> Result<(), CodecError> {
        let found = self.unpack_u32()?;
        if found != expected {
            return Err(CodecError::UnknownTypeId(found));
        }
        Ok(())
    }

    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

pub trait Encode {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError>;

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut packer = Packer::new();
        self.encode(&mut packer)?;
        Ok(packer.into_bytes())
    }
}

pub trait Decode: Sized {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError>;

    /// Decodes a value that must span the whole of `bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        let value = Self::decode(&mut unpacker)?;
        unpacker.finish()?;
        Ok(value)
    }
}

impl Encode for Id {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes())
    }
}

impl Decode for Id {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Id::new(unpacker.unpack_fixed()?))
    }
}

impl Encode for ShortId {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes())
    }
}

impl Decode for ShortId {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(ShortId::new(unpacker.unpack_fixed()?))
    }
}

impl Encode for NodeId {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        self.short_id().encode(packer)
    }
}

impl Decode for NodeId {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(NodeId::new(ShortId::decode(unpacker)?))
    }
}

impl Encode for u32 {
    fn encode(&self, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(*self)
    }
}

impl Decode for u32 {
    fn decode(unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        unpacker.unpack_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_are_big_endian() {
        let mut p = Packer::new();
        p.pack_u16(0x0102).unwrap();
        p.pack_u32(7).unwrap();
        p.pack_str("ab").unwrap();
        p.pack_bytes(&[9]).unwrap();
        assert_eq!(
            p.into_bytes(),
            vec![1, 2, 0, 0, 0, 7, 0, 2, b'a', b'b', 0, 0, 0, 1, 9]
        );
    }

    #[test]
    fn test_overlong_string_is_refused() {
        let mut p = Packer::new();
        let long = "a".repeat(u16::MAX as usize + 1);
        assert_eq!(
            p.pack_str(&long),
            Err(CodecError::TooLong {
                len: u16::MAX as usize + 1,
                max: u16::MAX as usize
            })
        );
        assert!(p.pack_str(&long[1..]).is_ok());
    }

    #[test]
    fn test_unpack_errors() {
        let mut u = Unpacker::new(&[0, 0, 0]);
        assert_eq!(
            u.unpack_u32(),
            Err(CodecError::UnexpectedEof {
                needed: 4,
                remaining: 3
            })
        );

        assert_eq!(
            u32::from_bytes(&[0, 0, 0, 1, 5]),
            Err(CodecError::TrailingBytes(1))
        );

        // a slice claiming more elements than there are bytes
        let mut u = Unpacker::new(&[0, 0, 1, 0]);
        assert!(u.unpack_slice::<u32>().is_err());

        let mut u = Unpacker::new(&[0, 0, 0, 3]);
        assert_eq!(u.expect_type_id(7), Err(CodecError::UnknownTypeId(3)));
    }
}
