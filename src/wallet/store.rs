//! Named account registry

use super::{KeystoreDecryptor, SigningIdentity};
use crate::chain::ChainClient;
use crate::{Error, Result};
use alloy::primitives::Address;
use secrecy::SecretString;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// An unlocked account known by a human-readable name
#[derive(Debug, Clone)]
pub struct AccountRecord {
    name: String,
    identity: SigningIdentity,
}

impl AccountRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always the identity's own address
    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }
}

/// In-memory registry of unlocked accounts
///
/// Populated once at startup and only read afterwards. Every identity loaded
/// here is also registered with the chain client so that requests sent from
/// its address can be signed.
pub struct AccountStore {
    chain: Arc<dyn ChainClient>,
    decryptor: Box<dyn KeystoreDecryptor>,
    records: HashMap<String, AccountRecord>,
    /// Names in first-load order
    order: Vec<String>,
}

impl AccountStore {
    pub fn new(chain: Arc<dyn ChainClient>, decryptor: Box<dyn KeystoreDecryptor>) -> Self {
        Self {
            chain,
            decryptor,
            records: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Decrypt the key at `key_path` and register it under `name`,
    /// replacing any account previously loaded with that name.
    pub fn load_account(
        &mut self,
        name: &str,
        key_path: &Path,
        password: &SecretString,
    ) -> Result<&AccountRecord> {
        info!(name, key_path = %key_path.display(), "Loading account");

        let identity = self.decryptor.decrypt(name, key_path, password)?;
        self.chain.register_signer(identity.signer())?;

        let record = AccountRecord {
            name: name.to_string(),
            identity,
        };
        if self.records.insert(name.to_string(), record).is_some() {
            tracing::warn!(name, "Account name loaded twice, keeping the latest key");
        } else {
            self.order.push(name.to_string());
        }

        self.get_account(name)
    }

    pub fn get_account(&self, name: &str) -> Result<&AccountRecord> {
        self.records
            .get(name)
            .ok_or_else(|| Error::AccountNotFound(name.to_string()))
    }

    /// Loaded accounts in the order their names were first seen
    pub fn accounts(&self) -> impl Iterator<Item = &AccountRecord> {
        self.order.iter().filter_map(|name| self.records.get(name))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
