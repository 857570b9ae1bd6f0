//! Decrypted signing identity
//!
//! SECURITY: the private key is held in alloy's PrivateKeySigner and is
//! - never serialized (no Serialize impl)
//! - never logged (Debug is redacted)
//! - only usable through signing operations

use crate::{Error, Result};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

/// A private key loaded into memory
#[derive(Clone)]
pub struct SigningIdentity {
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
}

impl SigningIdentity {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self { signer, address }
    }

    /// Create an identity from a hex-encoded private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::InvalidArgument(format!("Invalid private key: {}", e)))?;

        Ok(Self::new(signer))
    }

    /// Address derived from the key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signer handle for registering with a signing context
    pub fn signer(&self) -> PrivateKeySigner {
        self.signer.clone()
    }

    /// Sign a fully populated request and return the EIP-2718 encoded payload.
    ///
    /// The request's `from` is forced to this identity's address.
    pub async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let envelope = request
            .with_from(self.address)
            .build(&wallet)
            .await
            .map_err(|e| Error::rpc("signTransaction", e))?;
        Ok(envelope.encoded_2718().into())
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
