//! Ethereum command-line client
//!
//! Unlocks encrypted keystore accounts and uses them to:
//! - Report balances and nonces
//! - Transfer ether between named accounts
//! - Deploy compiled contracts
//! - Call and send contract methods
//!
//! # Security Model
//!
//! - Decrypted keys live only in the wallet module, in memory, for one run
//! - Passwords are held as secrets and never logged
//! - Nothing is ever written back to the keystore

pub mod chain;
pub mod config;
pub mod contract;
pub mod dispatcher;
pub mod genesis;
pub mod orchestrator;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use chain::{ChainClient, Receipt, RpcChainClient};
pub use config::Config;
pub use dispatcher::{dispatch, Command, CommandDispatcher, GlobalOptions};
pub use error::{Error, Result};
pub use orchestrator::{InvokeKind, TransactionOrchestrator, TxEvent};
pub use wallet::{AccountStore, SigningIdentity};
