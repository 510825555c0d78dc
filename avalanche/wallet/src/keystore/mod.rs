// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

//! Named soft key store.

mod memory;
mod persistent;

use anyhow::Result;
use zeroize::Zeroize;

pub use crate::keystore::memory::MemoryKeyStore;
pub use crate::keystore::persistent::{PersistentKeyInfo, PersistentKeyStore};

pub const DEFAULT_KEYSTORE_NAME: &str = "key_store.json";

/// The key store trait, keys are addressed by a user given name.
pub trait KeyStore {
    /// Get the key info by name
    fn get(&self, name: &str) -> Result<Option<KeyInfo>>;
    /// List all key names, sorted
    fn list(&self) -> Result<Vec<String>>;
    /// Put a new key under `name`, replacing any previous one
    fn put(&mut self, name: &str, info: KeyInfo) -> Result<()>;
    /// Remove a key from the key store
    fn remove(&mut self, name: &str) -> Result<()>;
    /// Set default key
    fn set_default(&mut self, name: &str) -> Result<()>;
    /// Get default key
    fn get_default(&self) -> Result<Option<String>>;
}

/// The raw secp256k1 private key
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KeyInfo {
    private_key: Vec<u8>,
}

impl KeyInfo {
    pub fn new(private_key: Vec<u8>) -> Self {
        Self { private_key }
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

impl Drop for KeyInfo {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}
