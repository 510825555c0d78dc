// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid cb58 string {0}: {1}")]
    InvalidCb58(String, String),
    #[error("invalid id length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid node id {0}: missing NodeID- prefix")]
    InvalidNodeID(String),
    #[error("VM name must be less than 33 bytes, found {0}")]
    VmNameTooLong(usize),
    #[error("invalid address {0}: {1}")]
    InvalidAddress(String, String),
    #[error("unknown network {0}")]
    UnknownNetwork(String),
}
