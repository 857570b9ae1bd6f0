//! Progress reporting for submitted transactions

use crate::chain::Receipt;
use alloy::primitives::{Bytes, TxHash};
use std::fmt;

/// Lifecycle of a single deploy, send or transfer
///
/// `Built → GasEstimated → Signed → Submitted → {Confirmed | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Built,
    GasEstimated,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

impl TxStage {
    pub fn name(&self) -> &'static str {
        match self {
            TxStage::Built => "built",
            TxStage::GasEstimated => "gas_estimated",
            TxStage::Signed => "signed",
            TxStage::Submitted => "submitted",
            TxStage::Confirmed => "confirmed",
            TxStage::Failed => "failed",
        }
    }
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of progress, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    GasEstimated(u64),
    Signed(Bytes),
    TransactionHash(TxHash),
    Receipt(Receipt),
    Confirmation { number: u64, receipt: Receipt },
    /// A failure while watching the transaction; the watch keeps going
    Error(String),
}

/// Consumer of [`TxEvent`]s
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &TxEvent);
}

/// Prints every event to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: &TxEvent) {
        match event {
            TxEvent::GasEstimated(gas) => println!("estimated gas: {}", gas),
            TxEvent::Signed(payload) => println!("signed transaction: {}", payload),
            TxEvent::TransactionHash(hash) => println!("transaction hash: {}", hash),
            TxEvent::Receipt(receipt) => match receipt.contract_address {
                Some(address) => println!("receipt: {} (contract {})", receipt, address),
                None => println!("receipt: {}", receipt),
            },
            TxEvent::Confirmation { number, receipt } => {
                println!("confirmation: {} {}", number, receipt.transaction_hash)
            }
            TxEvent::Error(message) => println!("error: {}", message),
        }
    }
}
