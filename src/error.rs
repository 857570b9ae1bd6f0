//! Error types for the Ethereum command-line client

use alloy::primitives::TxHash;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load key file {}: {reason}", path.display())]
    KeyLoad { path: PathBuf, reason: String },

    #[error("Failed to decrypt account {name}: {reason}")]
    Decryption { name: String, reason: String },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction {0} has been reverted by the EVM")]
    Reverted(TxHash),

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Method {method} not found in contract ABI")]
    MethodNotFound { method: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a node or transport failure, naming the JSON-RPC method involved.
    pub fn rpc(method: &str, err: impl std::fmt::Display) -> Self {
        Error::Rpc(format!("{method} failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
