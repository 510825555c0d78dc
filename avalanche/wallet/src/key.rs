// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

//! secp256k1 soft keys.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use avalanche_api::address::ChainAddress;
use avalanche_api::codec::secp256k1fx::Signature;
use avalanche_api::ids::{cb58_decode, cb58_encode, ShortId};
use avalanche_types::key::secp256k1::private_key;
use zeroize::{Zeroize, Zeroizing};

use crate::keystore::KeyInfo;

pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// The pre-funded key of local networks.
pub const EWOQ_PRIVATE_KEY: &str =
    "PrivateKey-ewoqjP7PxY4yr3iLTpLisriqt94hdyDFNgchSxGGztUrTXtNN";

/// A private key held in memory together with its address.
#[derive(Clone)]
pub struct SoftKey {
    secret: Zeroizing<[u8; 32]>,
    address: ShortId,
}

impl SoftKey {
    pub fn random() -> Self {
        loop {
            let mut bytes = Zeroizing::new(rand::random::<[u8; 32]>());
            // out of range scalars are rejected, draw again
            if let Ok(key) = Self::from_bytes(bytes.as_slice()) {
                bytes.zeroize();
                return key;
            }
        }
    }

    pub fn ewoq() -> Result<Self> {
        Self::from_str(EWOQ_PRIVATE_KEY)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key = private_key::Key::from_bytes(bytes)
            .map_err(|e| anyhow!("invalid secp256k1 private key: {e}"))?;
        let short = key
            .to_public_key()
            .to_short_id()
            .map_err(|e| anyhow!("cannot derive key address: {e}"))?;
        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&key.to_bytes());
        Ok(Self {
            secret,
            address: ShortId::from(&short),
        })
    }

    fn signing_key(&self) -> Result<private_key::Key> {
        private_key::Key::from_bytes(self.secret.as_slice())
            .map_err(|e| anyhow!("invalid secp256k1 private key: {e}"))
    }

    pub fn address(&self) -> ShortId {
        self.address
    }

    pub fn p_chain_address(&self, network_id: u32) -> ChainAddress {
        ChainAddress::p_chain(network_id, self.address)
    }

    pub fn x_chain_address(&self, network_id: u32) -> ChainAddress {
        ChainAddress::x_chain(network_id, self.address)
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        self.secret.clone()
    }

    pub fn to_key_info(&self) -> KeyInfo {
        KeyInfo::new(self.to_bytes().to_vec())
    }

    /// The `PrivateKey-<cb58>` form.
    pub fn to_cb58_string(&self) -> String {
        format!("{PRIVATE_KEY_PREFIX}{}", cb58_encode(self.secret.as_slice()))
    }

    /// Signs a 32 byte digest into a recoverable `r || s || v` signature.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<Signature> {
        let sig = self
            .signing_key()?
            .sign_digest(hash)
            .map_err(|e| anyhow!("failed to sign digest: {e}"))?;
        let mut out = [0u8; 65];
        out.copy_from_slice(&sig.to_bytes());
        Ok(out)
    }
}

impl std::fmt::Debug for SoftKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&KeyInfo> for SoftKey {
    type Error = anyhow::Error;

    fn try_from(info: &KeyInfo) -> Result<Self> {
        Self::from_bytes(info.private_key())
    }
}

impl FromStr for SoftKey {
    type Err = anyhow::Error;

    /// Accepts the `PrivateKey-<cb58>` form and plain hex.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut bytes = match s.strip_prefix(PRIVATE_KEY_PREFIX) {
            Some(encoded) => cb58_decode(encoded)?,
            None => hex::decode(s.trim_start_matches("0x"))
                .map_err(|_| anyhow!("private key must be {PRIVATE_KEY_PREFIX}<cb58> or hex"))?,
        };
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avalanche_types::key::secp256k1::public_key;

    const EWOQ_HEX: &str = "56289e99c94b6912bfc12adc093c9b51124f0dc54ac7a766b2bc5ccf558d8027";

    #[test]
    fn test_ewoq_key() {
        let key = SoftKey::ewoq().unwrap();
        assert_eq!(hex::encode(key.to_bytes().as_slice()), EWOQ_HEX);
        assert_eq!(key.to_cb58_string(), EWOQ_PRIVATE_KEY);
        assert_eq!(
            key.x_chain_address(1337).to_string(),
            "X-custom18jma8ppw3nhx5r4ap8clazz0dps7rv5u9xde7p"
        );

        let from_hex = SoftKey::from_str(EWOQ_HEX).unwrap();
        assert_eq!(from_hex.address(), key.address());
    }

    #[test]
    fn test_sign_hash_recovers_signer() {
        let key = SoftKey::random();
        let hash = [7u8; 32];
        let sig = key.sign_hash(&hash).unwrap();

        let public = public_key::Key::from_signature(&hash, &sig).unwrap();
        assert_eq!(ShortId::from(&public.to_short_id().unwrap()), key.address());
    }

    #[test]
    fn test_ewoq_signature_is_deterministic() {
        let key = SoftKey::ewoq().unwrap();
        let hash = [1u8; 32];
        assert_eq!(key.sign_hash(&hash).unwrap(), key.sign_hash(&hash).unwrap());
        assert!(key.sign_hash(&hash).unwrap()[64] <= 1);
    }

    #[test]
    fn test_invalid_keys() {
        assert!(SoftKey::from_str("PrivateKey-notcb58").is_err());
        assert!(SoftKey::from_str("zz").is_err());
        assert!(SoftKey::from_bytes(&[0u8; 32]).is_err());
    }
}
