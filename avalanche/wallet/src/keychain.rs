// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use anyhow::Result;
use avalanche_api::codec::secp256k1fx::Signature;
use avalanche_api::ids::ShortId;

use crate::key::SoftKey;

/// The set of keys a command can sign with.
#[derive(Debug, Clone, Default)]
pub struct Keychain {
    keys: BTreeMap<ShortId, SoftKey>,
}

impl Keychain {
    pub fn new(keys: impl IntoIterator<Item = SoftKey>) -> Self {
        let mut keychain = Self::default();
        for key in keys {
            keychain.add(key);
        }
        keychain
    }

    pub fn add(&mut self, key: SoftKey) {
        self.keys.insert(key.address(), key);
    }

    /// Addresses in ascending order.
    pub fn addresses(&self) -> Vec<ShortId> {
        self.keys.keys().copied().collect()
    }

    pub fn contains(&self, addr: &ShortId) -> bool {
        self.keys.contains_key(addr)
    }

    pub fn get(&self, addr: &ShortId) -> Option<&SoftKey> {
        self.keys.get(addr)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Signs `hash` with the key of `addr`, `None` when the key is not held.
    pub fn sign(&self, addr: &ShortId, hash: &[u8; 32]) -> Result<Option<Signature>> {
        self.keys.get(addr).map(|k| k.sign_hash(hash)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keychain() {
        let a = SoftKey::random();
        let b = SoftKey::random();
        let kc = Keychain::new([a.clone(), b.clone(), a.clone()]);

        assert_eq!(kc.addresses().len(), 2);
        assert!(kc.contains(&a.address()));
        assert!(kc.sign(&b.address(), &[1u8; 32]).unwrap().is_some());
        assert!(kc.sign(&ShortId::new([0u8; 20]), &[1u8; 32]).unwrap().is_none());

        let mut sorted = vec![a.address(), b.address()];
        sorted.sort();
        assert_eq!(kc.addresses(), sorted);
    }
}
