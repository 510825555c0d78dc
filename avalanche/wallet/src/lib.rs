// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

mod key;
mod keychain;
mod keystore;

pub use crate::key::{SoftKey, EWOQ_PRIVATE_KEY, PRIVATE_KEY_PREFIX};
pub use crate::keychain::Keychain;
pub use crate::keystore::{
    KeyInfo, KeyStore, MemoryKeyStore, PersistentKeyInfo, PersistentKeyStore,
    DEFAULT_KEYSTORE_NAME,
};
