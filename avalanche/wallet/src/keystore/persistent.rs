// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

//! Persistent file key store

use crate::key::SoftKey;
use crate::keystore::memory::MemoryKeyStore;
use crate::keystore::{KeyInfo, KeyStore};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::PathBuf;
use zeroize::Zeroize;

#[derive(Default)]
pub struct PersistentKeyStore {
    memory: MemoryKeyStore,
    file_path: PathBuf,
}

/// The persistent key information written to disk
#[derive(Serialize, Deserialize)]
pub struct PersistentKeyInfo {
    name: String,
    /// The short id of the key. It can be derived from the private key but we keep it for the
    /// ease of debugging
    address: String,
    /// Hex encoded private key
    private_key: String,
    #[serde(default)]
    default: bool,
}

impl PersistentKeyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl Drop for PersistentKeyInfo {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl KeyStore for PersistentKeyStore {
    fn get(&self, name: &str) -> Result<Option<KeyInfo>> {
        self.memory.get(name)
    }

    fn list(&self) -> Result<Vec<String>> {
        self.memory.list()
    }

    fn put(&mut self, name: &str, info: KeyInfo) -> Result<()> {
        // reject keys that are not valid secp256k1 scalars before persisting them
        SoftKey::try_from(&info)?;
        self.memory.put(name, info)?;
        self.flush_no_encryption()
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.memory.remove(name)?;
        self.flush_no_encryption()
    }

    fn set_default(&mut self, name: &str) -> Result<()> {
        self.memory.set_default(name)?;
        self.flush_no_encryption()
    }

    fn get_default(&self) -> Result<Option<String>> {
        self.memory.get_default()
    }
}

impl PersistentKeyStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let p = match File::open(&path) {
            Ok(p) => p,
            Err(e) => {
                return if e.kind() == ErrorKind::NotFound {
                    log::info!("key store does not exist, initialized to empty key store");
                    Ok(Self {
                        memory: MemoryKeyStore::default(),
                        file_path: path,
                    })
                } else {
                    Err(anyhow!("cannot open key store: {e:}"))
                };
            }
        };
        let reader = BufReader::new(p);

        let persisted_key_info: Vec<PersistentKeyInfo> = serde_json::from_reader(reader)
            .with_context(|| format!("failed to deserialize key store at {path:?}"))?;

        let mut data = BTreeMap::new();
        let mut default = None;
        for info in persisted_key_info.iter() {
            let key_info = KeyInfo::new(hex::decode(&info.private_key)?);
            if info.default {
                default = Some(info.name.clone());
            }
            data.insert(info.name.clone(), key_info);
        }

        Ok(Self {
            memory: MemoryKeyStore { data, default },
            file_path: path,
        })
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    /// Write all keys to file without any encryption.
    fn flush_no_encryption(&self) -> Result<()> {
        let dir = self
            .file_path
            .parent()
            .ok_or_else(|| anyhow!("key store parent path does not exist"))?;

        fs::create_dir_all(dir)?;

        let file = File::create(&self.file_path)?;
        let writer = BufWriter::new(file);

        let to_persist = self
            .memory
            .data
            .iter()
            .map(|(name, val)| {
                let address = SoftKey::try_from(val)?.address().to_string();
                Ok(PersistentKeyInfo {
                    name: name.clone(),
                    address,
                    private_key: hex::encode(val.private_key()),
                    default: self.memory.default.as_deref() == Some(name.as_str()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        serde_json::to_writer_pretty(writer, &to_persist)
            .map_err(|e| anyhow!("failed to serialize and write key info: {e}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::keystore::{KeyInfo, KeyStore, PersistentKeyStore};
    use crate::SoftKey;

    fn random_key_info() -> KeyInfo {
        SoftKey::random().to_key_info()
    }

    #[test]
    fn test_read_write_keystore() {
        let keystore_folder = tempfile::tempdir().unwrap().into_path();
        let keystore_location = keystore_folder.join("key_store.json");

        let mut ks = PersistentKeyStore::new(keystore_location.clone()).unwrap();

        let key_info = random_key_info();
        ks.put("alice", key_info.clone()).unwrap();

        let key_from_store = ks.get("alice").unwrap();
        assert!(key_from_store.is_some());
        assert_eq!(key_from_store.unwrap(), key_info);

        // Create the key store again
        let ks = PersistentKeyStore::new(keystore_location).unwrap();
        let key_from_store = ks.get("alice").unwrap();
        assert!(key_from_store.is_some());
        assert_eq!(key_from_store.unwrap(), key_info);
        assert_eq!(ks.list().unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_default() {
        let keystore_folder = tempfile::tempdir().unwrap().into_path();
        let keystore_location = keystore_folder.join("key_store.json");

        let mut ks = PersistentKeyStore::new(keystore_location.clone()).unwrap();

        // can't set default if the key hasn't been put yet.
        assert!(ks.set_default("alice").is_err());
        ks.put("alice", random_key_info()).unwrap();
        ks.set_default("alice").unwrap();
        assert_eq!(ks.get_default().unwrap().unwrap(), "alice");

        // set other default
        ks.put("bob", random_key_info()).unwrap();
        ks.set_default("bob").unwrap();
        assert_eq!(ks.get_default().unwrap().unwrap(), "bob");

        // the default is also recovered from persistent storage
        let mut ks = PersistentKeyStore::new(keystore_location.clone()).unwrap();
        assert_eq!(ks.get_default().unwrap().unwrap(), "bob");

        ks.remove("bob").unwrap();
        let ks = PersistentKeyStore::new(keystore_location).unwrap();
        assert_eq!(ks.get_default().unwrap(), None);
        assert_eq!(ks.list().unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_rejects_invalid_key() {
        let keystore_folder = tempfile::tempdir().unwrap().into_path();
        let mut ks = PersistentKeyStore::new(keystore_folder.join("key_store.json")).unwrap();
        assert!(ks.put("zero", KeyInfo::new(vec![0u8; 32])).is_err());
        assert!(ks.list().unwrap().is_empty());
    }
}
