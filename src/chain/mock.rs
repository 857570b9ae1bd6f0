//! Recording in-memory [`ChainClient`] for tests

use super::{ChainClient, Receipt};
use crate::{Error, Result};
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

pub(crate) const GAS_PRICE: u128 = 1_000_000_000;
pub(crate) const ESTIMATE: u64 = 54_321;
pub(crate) const RECEIPT_BLOCK: u64 = 100;

/// Fake node that records every call in order
#[derive(Default)]
pub(crate) struct MockChain {
    calls: Mutex<Vec<String>>,
    signers: Mutex<HashSet<Address>>,
    /// Polls returning `None` before a receipt shows up
    pending_polls: Mutex<u32>,
    /// Scripted `eth_blockNumber` results; `RECEIPT_BLOCK + n` once drained
    blocks: Mutex<VecDeque<Result<u64>>>,
    call_result: Mutex<Bytes>,
    created_contract: Mutex<Option<Address>>,
    reverted: Mutex<bool>,
    fail_send_to: Mutex<Option<Address>>,
    last_request: Mutex<Option<TransactionRequest>>,
    next_block: Mutex<u64>,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub(crate) fn has_signer(&self, address: Address) -> bool {
        self.signers.lock().unwrap().contains(&address)
    }

    pub(crate) fn last_request(&self) -> Option<TransactionRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub(crate) fn with_pending_polls(self, polls: u32) -> Self {
        *self.pending_polls.lock().unwrap() = polls;
        self
    }

    pub(crate) fn with_blocks(self, blocks: Vec<Result<u64>>) -> Self {
        *self.blocks.lock().unwrap() = blocks.into();
        self
    }

    pub(crate) fn with_call_result(self, data: Bytes) -> Self {
        *self.call_result.lock().unwrap() = data;
        self
    }

    pub(crate) fn with_created_contract(self, address: Address) -> Self {
        *self.created_contract.lock().unwrap() = Some(address);
        self
    }

    pub(crate) fn reverting(self) -> Self {
        *self.reverted.lock().unwrap() = true;
        self
    }

    pub(crate) fn failing_send_to(self, address: Address) -> Self {
        *self.fail_send_to.lock().unwrap() = Some(address);
        self
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn register_signer(&self, signer: PrivateKeySigner) -> Result<()> {
        self.record(format!("register:{}", signer.address()));
        self.signers.lock().unwrap().insert(signer.address());
        Ok(())
    }

    async fn chain_id(&self) -> Result<u64> {
        self.record("chain_id");
        Ok(1337)
    }

    async fn gas_price(&self) -> Result<u128> {
        self.record("gas_price");
        Ok(GAS_PRICE)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.record(format!("balance:{}", address));
        Ok(U256::from(2_000_000_000_000_000_000u128))
    }

    async fn nonce(&self, address: Address) -> Result<u64> {
        self.record(format!("nonce:{}", address));
        Ok(self.count("send") as u64)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.record(format!("transaction_count:{}", address));
        Ok(self.count("send") as u64)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        self.record("estimate_gas");
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(ESTIMATE)
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        self.record("call");
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.call_result.lock().unwrap().clone())
    }

    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes> {
        let from = request
            .from
            .ok_or_else(|| Error::Rpc("request has no sender".to_string()))?;
        if !self.has_signer(from) {
            return Err(Error::Rpc(format!("no signer registered for {}", from)));
        }
        self.record(format!("sign:{}", from));
        let payload = serde_json::to_vec(&request)?;
        *self.last_request.lock().unwrap() = Some(request);
        Ok(payload.into())
    }

    async fn send_raw_transaction(&self, payload: &Bytes) -> Result<TxHash> {
        if let Some(target) = *self.fail_send_to.lock().unwrap() {
            if payload.windows(20).any(|w| w == target.as_slice()) {
                self.record("send:failed");
                return Err(Error::Rpc("insufficient funds for gas * price + value".into()));
            }
        }
        self.record("send");
        Ok(keccak256(payload))
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        self.record("receipt");
        {
            let mut pending = self.pending_polls.lock().unwrap();
            if *pending > 0 {
                *pending -= 1;
                return Ok(None);
            }
        }
        Ok(Some(Receipt {
            transaction_hash: hash,
            block_number: Some(RECEIPT_BLOCK),
            gas_used: 21_000,
            contract_address: *self.created_contract.lock().unwrap(),
            status: !*self.reverted.lock().unwrap(),
        }))
    }

    async fn block_number(&self) -> Result<u64> {
        self.record("block_number");
        if let Some(scripted) = self.blocks.lock().unwrap().pop_front() {
            return scripted;
        }
        let mut next = self.next_block.lock().unwrap();
        *next += 1;
        Ok(RECEIPT_BLOCK + *next)
    }
}
