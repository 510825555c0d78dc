// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! Common types shared by the avalanche subnet tooling: identifiers, addresses, networks,
//! the on-disk sidecar model and the transaction codec.

pub mod address;
pub mod codec;
pub mod elastic;
pub mod error;
pub mod export;
pub mod ids;
pub mod network;
pub mod sidecar;

/// Implements `Serialize` and `Deserialize` through the `Display` and `FromStr` impls of the
/// type, the way avalanchego renders its identifiers in JSON.
#[macro_export]
macro_rules! as_human_readable_str {
    ($typ:ty) => {
        impl serde::Serialize for $typ {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $typ {
            fn deserialize<D>(deserializer: D) -> Result<$typ, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                use serde::de::Error as DeserializeError;

                let s = String::deserialize(deserializer)?;
                <$typ as std::str::FromStr>::from_str(&s).map_err(|e| {
                    D::Error::custom(format!(
                        "cannot parse {} from str: {e}",
                        core::any::type_name::<$typ>()
                    ))
                })
            }
        }
    };
}
