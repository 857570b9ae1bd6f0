//! Unlocked account management
//!
//! This module is the only place where decrypted private keys live. Keys are
//! read from encrypted keystore files, held in memory for the duration of the
//! process, and never written back to disk.

pub(crate) mod identity;
mod keystore;
pub(crate) mod store;

pub use identity::SigningIdentity;
pub use keystore::{EthKeystore, KeystoreDecryptor};
pub use store::{AccountRecord, AccountStore};
