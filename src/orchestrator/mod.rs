//! Transaction orchestration
//!
//! Builds, estimates, signs and submits the three kinds of transaction the
//! client knows about: plain value transfers, contract deployments and
//! contract method invocations. Every state-changing flow follows the same
//! protocol (estimate, then submit) and reports its progress as an ordered
//! sequence of [`TxEvent`]s.
//!
//! Nothing here runs concurrently: transactions from one account are signed
//! and submitted strictly one after another so nonces never race.

mod events;

pub use events::{ConsoleReporter, ProgressReporter, TxEvent, TxStage};

use crate::chain::{ChainClient, Receipt};
use crate::contract;
use crate::wallet::SigningIdentity;
use crate::{Error, Result};
use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::network::TransactionBuilder;
use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Gas limit for a plain value transfer
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Knobs for watching submitted transactions
#[derive(Debug, Clone, Copy)]
pub struct TxSettings {
    /// Confirmations reported after a send's receipt
    pub confirmations: u64,
    /// Block polls allowed for those confirmations; the send's outcome is
    /// returned once they run out, confirmed or not
    pub confirmation_polls: u32,
    /// Delay between receipt and block polls
    pub poll_interval: Duration,
}

impl Default for TxSettings {
    fn default() -> Self {
        Self {
            confirmations: 0,
            confirmation_polls: 30,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// A submitted transaction and how it ended
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub signed_payload: Bytes,
    pub receipt: Receipt,
}

/// How a contract method is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    /// Read-only execution against current state
    Call,
    /// Signed, state-changing transaction
    Send,
}

impl fmt::Display for InvokeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeKind::Call => f.write_str("call"),
            InvokeKind::Send => f.write_str("send"),
        }
    }
}

/// Result of [`TransactionOrchestrator::invoke_method`]
#[derive(Debug, Clone)]
pub enum InvokeResult {
    Call(Vec<DynSolValue>),
    Send(TransactionOutcome),
}

/// Logs stage transitions of one transaction
struct StageTracker {
    label: &'static str,
    stage: TxStage,
}

impl StageTracker {
    fn new(label: &'static str) -> Self {
        debug!(tx = label, stage = %TxStage::Built, "Transaction stage");
        Self {
            label,
            stage: TxStage::Built,
        }
    }

    fn advance(&mut self, next: TxStage) {
        debug!(tx = self.label, from = %self.stage, to = %next, "Transaction stage");
        self.stage = next;
    }

    fn fail(&mut self, err: Error) -> Error {
        warn!(tx = self.label, stage = %self.stage, error = %err, "Transaction failed");
        self.stage = TxStage::Failed;
        err
    }
}

/// Drives transfers, deployments and method invocations against a node
pub struct TransactionOrchestrator {
    chain: Arc<dyn ChainClient>,
    settings: TxSettings,
    reporter: Arc<dyn ProgressReporter>,
}

impl TransactionOrchestrator {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        settings: TxSettings,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            chain,
            settings,
            reporter,
        }
    }

    /// Send `ether` from `from` to every address in `to`, one at a time.
    ///
    /// The gas price is fetched once. Each transfer is signed locally with
    /// `from`, submitted, and waited on before the next one starts;
    /// `on_complete` sees each outcome as soon as its receipt arrives. A
    /// failure stops the run; transfers already submitted stay on chain.
    pub async fn transfer_funds(
        &self,
        from: &SigningIdentity,
        to: &[Address],
        ether: &str,
        mut on_complete: impl FnMut(&TransactionOutcome),
    ) -> Result<Vec<TransactionOutcome>> {
        let value = parse_ether(ether)
            .map_err(|e| Error::InvalidArgument(format!("Invalid ether amount {}: {}", ether, e)))?;
        let gas_price = self.chain.gas_price().await?;
        let chain_id = self.chain.chain_id().await?;

        let mut outcomes = Vec::with_capacity(to.len());
        for &destination in to {
            info!(from = %from.address(), to = %destination, %value, "Transferring");
            let mut tracker = StageTracker::new("transfer");

            let nonce = self
                .chain
                .nonce(from.address())
                .await
                .map_err(|e| tracker.fail(e))?;
            let request = TransactionRequest::default()
                .with_from(from.address())
                .with_to(destination)
                .with_value(value)
                .with_gas_price(gas_price)
                .with_gas_limit(TRANSFER_GAS_LIMIT)
                .with_nonce(nonce)
                .with_chain_id(chain_id);
            tracker.advance(TxStage::GasEstimated);

            let payload = from
                .sign_transaction(request)
                .await
                .map_err(|e| tracker.fail(e))?;
            tracker.advance(TxStage::Signed);
            self.reporter.report(&TxEvent::Signed(payload.clone()));

            let receipt = self.submit(&mut tracker, &payload).await?;
            tracker.advance(TxStage::Confirmed);
            let outcome = TransactionOutcome {
                signed_payload: payload,
                receipt,
            };
            on_complete(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Deploy a contract from `from`, returning the outcome whose receipt
    /// carries the new contract's address.
    pub async fn deploy_contract(
        &self,
        from: Address,
        abi: &JsonAbi,
        bytecode: &Bytes,
        constructor_args: &[String],
    ) -> Result<TransactionOutcome> {
        let data = contract::encode_deploy(abi, bytecode, constructor_args)?;
        info!(%from, code_len = data.len(), "Deploying contract");

        let request = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(data);
        self.estimate_and_send("deploy", from, request).await
    }

    /// Invoke `method` on the contract at `contract`.
    ///
    /// The method is resolved against `abi` before any node access. A
    /// [`InvokeKind::Call`] performs a single read-only execution; a
    /// [`InvokeKind::Send`] estimates gas and submits a signed transaction.
    pub async fn invoke_method(
        &self,
        kind: InvokeKind,
        from: Address,
        abi: &JsonAbi,
        contract: Address,
        method: &str,
        args: &[String],
    ) -> Result<InvokeResult> {
        let function = contract::resolve_method(abi, method, args.len())?;
        let data = contract::encode_call(function, args)?;
        info!(%kind, %from, %contract, method = %function.signature(), "Invoking contract method");

        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(contract)
            .with_input(data);

        match kind {
            InvokeKind::Call => {
                let output = self.chain.call(&request).await?;
                let values = contract::decode_output(function, &output)?;
                Ok(InvokeResult::Call(values))
            }
            InvokeKind::Send => {
                let outcome = self.estimate_and_send("send", from, request).await?;
                self.watch_confirmations(&outcome.receipt).await;
                Ok(InvokeResult::Send(outcome))
            }
        }
    }

    /// Shared deploy/send path: gas price, estimate, sign via the chain
    /// client's signing context, submit. Resolves with the receipt.
    async fn estimate_and_send(
        &self,
        label: &'static str,
        from: Address,
        request: TransactionRequest,
    ) -> Result<TransactionOutcome> {
        let mut tracker = StageTracker::new(label);

        let gas_price = self.chain.gas_price().await.map_err(|e| tracker.fail(e))?;
        let gas = self
            .chain
            .estimate_gas(&request)
            .await
            .map_err(|e| tracker.fail(e))?;
        tracker.advance(TxStage::GasEstimated);
        self.reporter.report(&TxEvent::GasEstimated(gas));

        let nonce = self.chain.nonce(from).await.map_err(|e| tracker.fail(e))?;
        let chain_id = self.chain.chain_id().await.map_err(|e| tracker.fail(e))?;
        let request = request
            .with_gas_price(gas_price)
            .with_gas_limit(gas)
            .with_nonce(nonce)
            .with_chain_id(chain_id);

        let payload = self
            .chain
            .sign_transaction(request)
            .await
            .map_err(|e| tracker.fail(e))?;
        tracker.advance(TxStage::Signed);

        let receipt = self.submit(&mut tracker, &payload).await?;
        tracker.advance(TxStage::Confirmed);

        Ok(TransactionOutcome {
            signed_payload: payload,
            receipt,
        })
    }

    /// Submit a signed payload and wait for its receipt
    async fn submit(&self, tracker: &mut StageTracker, payload: &Bytes) -> Result<Receipt> {
        let hash = self
            .chain
            .send_raw_transaction(payload)
            .await
            .map_err(|e| tracker.fail(e))?;
        tracker.advance(TxStage::Submitted);
        self.reporter.report(&TxEvent::TransactionHash(hash));

        let receipt = self.wait_for_receipt(hash).await;
        self.reporter.report(&TxEvent::Receipt(receipt.clone()));
        info!(%receipt, "Transaction mined");

        if !receipt.status {
            return Err(tracker.fail(Error::Reverted(hash)));
        }
        Ok(receipt)
    }

    /// Poll until the node has a receipt for `hash`.
    ///
    /// Poll failures are reported and polling continues; once submitted, the
    /// transaction's outcome is what this resolves to.
    async fn wait_for_receipt(&self, hash: TxHash) -> Receipt {
        loop {
            match self.chain.receipt(hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => debug!(%hash, "Receipt not yet available"),
                Err(e) => self.reporter.report(&TxEvent::Error(e.to_string())),
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Report confirmations until the configured depth is reached or the
    /// poll allowance runs out, whichever comes first.
    ///
    /// Nodes that only mine on demand never move past the receipt's block,
    /// so the watch is bounded. A failed block poll is reported and ends the
    /// watch. Neither case fails the transaction.
    async fn watch_confirmations(&self, receipt: &Receipt) {
        let Some(mined) = receipt.block_number else {
            return;
        };

        let target = self.settings.confirmations;
        let mut seen = 0;
        let mut polls = 0;
        while seen < target {
            if polls == self.settings.confirmation_polls {
                warn!(
                    hash = %receipt.transaction_hash,
                    confirmations = seen,
                    target,
                    "Stopped waiting for confirmations"
                );
                return;
            }
            polls += 1;
            match self.chain.block_number().await {
                Ok(head) => {
                    let depth = head.saturating_sub(mined).min(target);
                    while seen < depth {
                        seen += 1;
                        self.reporter.report(&TxEvent::Confirmation {
                            number: seen,
                            receipt: receipt.clone(),
                        });
                    }
                }
                Err(e) => {
                    self.reporter.report(&TxEvent::Error(e.to_string()));
                    return;
                }
            }
            if seen < target {
                tokio::time::sleep(self.settings.poll_interval).await;
            }
        }
    }
}
