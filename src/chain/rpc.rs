//! JSON-RPC backed [`ChainClient`]

use super::{ChainClient, Receipt};
use crate::{Error, Result};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::sync::RwLock;

/// Node client holding the signing context for every unlocked account
pub struct RpcChainClient {
    provider: DynProvider,
    /// Written only while accounts are loaded at startup
    wallet: RwLock<Option<EthereumWallet>>,
}

impl RpcChainClient {
    /// Connect to the node at `url` over HTTP
    pub fn connect(url: url::Url) -> Self {
        tracing::debug!(%url, "Connecting to node");
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Self {
            provider,
            wallet: RwLock::new(None),
        }
    }

    fn wallet(&self) -> Result<EthereumWallet> {
        let guard = self
            .wallet
            .read()
            .map_err(|_| Error::Rpc("signing context lock poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| Error::Rpc("no signing accounts registered".to_string()))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn register_signer(&self, signer: PrivateKeySigner) -> Result<()> {
        let mut guard = self
            .wallet
            .write()
            .map_err(|_| Error::Rpc("signing context lock poisoned".to_string()))?;
        match guard.as_mut() {
            Some(wallet) => wallet.register_signer(signer),
            None => *guard = Some(EthereumWallet::from(signer)),
        }
        Ok(())
    }

    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| Error::rpc("eth_chainId", e))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::rpc("eth_gasPrice", e))
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| Error::rpc("eth_getBalance", e))
    }

    async fn nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| Error::rpc("eth_getTransactionCount", e))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .latest()
            .await
            .map_err(|e| Error::rpc("eth_getTransactionCount", e))
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        self.provider
            .estimate_gas(request.clone())
            .await
            .map_err(|e| Error::rpc("eth_estimateGas", e))
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        self.provider
            .call(request.clone())
            .await
            .map_err(|e| Error::rpc("eth_call", e))
    }

    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes> {
        let wallet = self.wallet()?;
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| Error::rpc("signTransaction", e))?;
        Ok(envelope.encoded_2718().into())
    }

    async fn send_raw_transaction(&self, payload: &Bytes) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(payload)
            .await
            .map_err(|e| Error::rpc("eth_sendRawTransaction", e))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| Error::rpc("eth_getTransactionReceipt", e))?;
        Ok(receipt.as_ref().map(Receipt::from_response))
    }

    async fn block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| Error::rpc("eth_blockNumber", e))
    }
}
