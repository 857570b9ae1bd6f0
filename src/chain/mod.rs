//! Node access
//!
//! Everything the client needs from an Ethereum node goes through the
//! [`ChainClient`] trait. The production implementation talks JSON-RPC via
//! alloy; tests swap in a recording fake.

#[cfg(test)]
pub(crate) mod mock;
mod rpc;

pub use rpc::RpcChainClient;

use crate::Result;
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::fmt;

/// Summary of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Address of the contract created by this transaction, if any
    pub contract_address: Option<Address>,
    pub status: bool,
}

impl Receipt {
    pub fn from_response<R: ReceiptResponse>(receipt: &R) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            contract_address: receipt.contract_address(),
            status: receipt.status(),
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hash={} ", self.transaction_hash)?;
        match self.block_number {
            Some(block) => write!(f, "block={} ", block)?,
            None => write!(f, "block=pending ")?,
        }
        write!(f, "gasUsed={} ", self.gas_used)?;
        if let Some(address) = self.contract_address {
            write!(f, "contractAddress={} ", address)?;
        }
        write!(f, "status={}", if self.status { "success" } else { "reverted" })
    }
}

/// JSON-RPC facade over an Ethereum-compatible node
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Make `signer` available to [`ChainClient::sign_transaction`] for requests
    /// sent from its address.
    fn register_signer(&self, signer: PrivateKeySigner) -> Result<()>;

    async fn chain_id(&self) -> Result<u64>;

    async fn gas_price(&self) -> Result<u128>;

    async fn balance(&self, address: Address) -> Result<U256>;

    /// Next nonce for `address`, counting pending transactions
    async fn nonce(&self, address: Address) -> Result<u64>;

    /// Transactions sent from `address` as of the latest block
    async fn transaction_count(&self, address: Address) -> Result<u64>;

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64>;

    /// Execute `request` against current state without creating a transaction
    async fn call(&self, request: &TransactionRequest) -> Result<Bytes>;

    /// Sign a fully populated request with the registered signer matching
    /// `request.from`, returning the EIP-2718 encoded payload.
    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes>;

    async fn send_raw_transaction(&self, payload: &Bytes) -> Result<TxHash>;

    /// Receipt for `hash`, or `None` while the transaction is still pending
    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>>;

    async fn block_number(&self) -> Result<u64>;
}
