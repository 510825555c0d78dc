// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

//! Memory key store

use crate::keystore::{KeyInfo, KeyStore};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MemoryKeyStore {
    pub(crate) data: BTreeMap<String, KeyInfo>,
    pub(crate) default: Option<String>,
}

impl KeyStore for MemoryKeyStore {
    fn get(&self, name: &str) -> Result<Option<KeyInfo>> {
        Ok(self.data.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.data.keys().cloned().collect())
    }

    fn put(&mut self, name: &str, info: KeyInfo) -> Result<()> {
        if name.is_empty() {
            return Err(anyhow!("key name cannot be empty"));
        }
        self.data.insert(name.to_string(), info);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        if self.data.remove(name).is_none() {
            return Err(anyhow!("key {name} not found in keystore"));
        }
        // removing the default key also clears the default
        if self.default.as_deref() == Some(name) {
            self.default = None;
        }
        Ok(())
    }

    fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.data.contains_key(name) {
            return Err(anyhow!("can't set default key: not found in keystore"));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    fn get_default(&self) -> Result<Option<String>> {
        Ok(self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_remove() {
        let mut ks = MemoryKeyStore::default();
        ks.put("b", KeyInfo::new(vec![2])).unwrap();
        ks.put("a", KeyInfo::new(vec![1])).unwrap();
        assert_eq!(ks.list().unwrap(), vec!["a", "b"]);
        assert!(ks.put("", KeyInfo::new(vec![3])).is_err());

        ks.set_default("a").unwrap();
        ks.remove("a").unwrap();
        assert_eq!(ks.get_default().unwrap(), None);
        assert!(ks.get("a").unwrap().is_none());
        assert!(ks.remove("a").is_err());
    }
}
