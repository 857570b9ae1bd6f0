//! Command dispatch
//!
//! Every command except `genesis` starts with the same account-listing pass:
//! each configured account is unlocked and its balance and nonce printed.
//! That pass doubles as a connectivity check and runs even when the command
//! itself does not need every account.
//!
//! ABI and bytecode arguments are file paths, or the name of an entry under
//! `contracts` in the config.

use crate::chain::{ChainClient, RpcChainClient};
use crate::config::{self, Config, ContractPaths};
use crate::contract;
use crate::genesis;
use crate::orchestrator::{
    ConsoleReporter, InvokeKind, InvokeResult, ProgressReporter, TransactionOrchestrator,
    TxSettings,
};
use crate::wallet::{AccountStore, EthKeystore, KeystoreDecryptor};
use crate::{Error, Result};
use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// A parsed command-line request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a genesis file; touches neither config nor node
    Genesis {
        balance: String,
        addresses: Vec<String>,
        out: PathBuf,
        chain_id: u64,
    },
    /// Only the account listing
    List,
    Transfer {
        amount: String,
        from: String,
        to: Vec<String>,
    },
    Deploy {
        from: String,
        abi_path: PathBuf,
        bin_path: PathBuf,
        args: Vec<String>,
    },
    Invoke {
        kind: InvokeKind,
        from: String,
        abi_path: PathBuf,
        contract: String,
        method: String,
        args: Vec<String>,
    },
}

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config layers, lowest priority first
    pub config_layers: Vec<PathBuf>,
    /// Provider URL overriding config and environment
    pub rpc_url: Option<String>,
}

/// Run `command`, loading configuration and connecting only when needed
pub async fn dispatch(command: Command, options: &GlobalOptions) -> Result<()> {
    if let Command::Genesis {
        balance,
        addresses,
        out,
        chain_id,
    } = &command
    {
        return genesis::write_genesis(out, *chain_id, balance, addresses);
    }

    let config = if options.config_layers.is_empty() {
        Config::load(&config::DEFAULT_CONFIG_LAYERS)?
    } else {
        Config::load(options.config_layers.as_slice())?
    };
    let mut dispatcher = CommandDispatcher::connect(config, options.rpc_url.as_deref())?;
    dispatcher.run(command).await
}

/// Balance and nonce of one unlocked account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub name: String,
    pub address: Address,
    pub balance: U256,
    pub nonce: u64,
}

/// Routes commands to the account store and transaction orchestrator
pub struct CommandDispatcher {
    config: Config,
    chain: Arc<dyn ChainClient>,
    store: AccountStore,
    orchestrator: TransactionOrchestrator,
}

impl CommandDispatcher {
    pub fn new(
        config: Config,
        chain: Arc<dyn ChainClient>,
        decryptor: Box<dyn KeystoreDecryptor>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        let settings = TxSettings {
            confirmations: config.web3.confirmations,
            confirmation_polls: config.web3.confirmation_polls,
            poll_interval: config.web3.poll_interval(),
        };
        let store = AccountStore::new(chain.clone(), decryptor);
        let orchestrator = TransactionOrchestrator::new(chain.clone(), settings, reporter);
        Self {
            config,
            chain,
            store,
            orchestrator,
        }
    }

    /// Connect to the configured node with keystore decryption and console output
    pub fn connect(config: Config, rpc_override: Option<&str>) -> Result<Self> {
        let url = config::resolve_provider(rpc_override, &config.web3.provider)?;
        let chain = Arc::new(RpcChainClient::connect(url));
        Ok(Self::new(
            config,
            chain,
            Box::new(EthKeystore),
            Arc::new(ConsoleReporter),
        ))
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        if let Command::Genesis {
            balance,
            addresses,
            out,
            chain_id,
        } = &command
        {
            return genesis::write_genesis(out, *chain_id, balance, addresses);
        }

        let summaries = self.list_accounts().await?;
        print_accounts(&summaries);

        match command {
            Command::Genesis { .. } | Command::List => Ok(()),
            Command::Transfer { amount, from, to } => self.transfer(&amount, &from, &to).await,
            Command::Deploy {
                from,
                abi_path,
                bin_path,
                args,
            } => self.deploy(&from, abi_path, bin_path, &args).await,
            Command::Invoke {
                kind,
                from,
                abi_path,
                contract,
                method,
                args,
            } => {
                self.invoke(kind, &from, abi_path, &contract, &method, &args)
                    .await
            }
        }
    }

    /// Unlock every configured account, then look up balances and nonces.
    ///
    /// Lookups for different accounts run concurrently; the result keeps
    /// config order.
    pub async fn list_accounts(&mut self) -> Result<Vec<AccountSummary>> {
        for account in &self.config.accounts {
            self.store
                .load_account(&account.name, &account.key_path, &account.password)?;
        }

        let lookups = self.store.accounts().map(|record| {
            let chain = self.chain.clone();
            let name = record.name().to_string();
            let address = record.address();
            async move {
                let (balance, nonce) = tokio::try_join!(
                    chain.balance(address),
                    chain.transaction_count(address)
                )?;
                Ok::<_, Error>(AccountSummary {
                    name,
                    address,
                    balance,
                    nonce,
                })
            }
        });

        futures::future::try_join_all(lookups).await
    }

    /// Resolve an artifact argument: a configured contract name maps to the
    /// chosen path of that entry, anything else is taken as a path.
    fn artifact(&self, arg: &Path, pick: fn(&ContractPaths) -> &PathBuf) -> PathBuf {
        arg.to_str()
            .and_then(|name| self.config.contract(name))
            .map(|paths| pick(paths).clone())
            .unwrap_or_else(|| arg.to_path_buf())
    }

    async fn transfer(&self, amount: &str, from: &str, to: &[String]) -> Result<()> {
        let sender = self.store.get_account(from)?;
        let destinations = to
            .iter()
            .map(|name| self.store.get_account(name).map(|record| record.address()))
            .collect::<Result<Vec<_>>>()?;

        self.orchestrator
            .transfer_funds(sender.identity(), &destinations, amount, |outcome| {
                println!("transaction result: {}", outcome.receipt)
            })
            .await?;
        Ok(())
    }

    async fn deploy(
        &self,
        from: &str,
        abi_path: PathBuf,
        bin_path: PathBuf,
        args: &[String],
    ) -> Result<()> {
        let from = self.store.get_account(from)?.address();
        let abi = contract::load_abi(&self.artifact(&abi_path, |c| &c.abi_path))?;
        let bytecode = contract::load_bytecode(&self.artifact(&bin_path, |c| &c.bin_path))?;

        let outcome = self
            .orchestrator
            .deploy_contract(from, &abi, &bytecode, args)
            .await?;
        println!("result: {}", outcome.receipt);
        if let Some(address) = outcome.receipt.contract_address {
            println!("contract address: {}", address);
        }
        Ok(())
    }

    async fn invoke(
        &self,
        kind: InvokeKind,
        from: &str,
        abi_path: PathBuf,
        contract_address: &str,
        method: &str,
        args: &[String],
    ) -> Result<()> {
        let from = self.store.get_account(from)?.address();
        let abi = contract::load_abi(&self.artifact(&abi_path, |c| &c.abi_path))?;
        let contract_address: Address = contract_address.parse().map_err(|e| {
            Error::InvalidArgument(format!("Invalid contract address {}: {}", contract_address, e))
        })?;

        let result = self
            .orchestrator
            .invoke_method(kind, from, &abi, contract_address, method, args)
            .await?;
        match result {
            InvokeResult::Call(values) => {
                let rendered: Vec<String> = values.iter().map(contract::format_value).collect();
                println!("result: {}", rendered.join(", "));
            }
            InvokeResult::Send(outcome) => println!("result: {}", outcome.receipt),
        }
        Ok(())
    }
}

fn print_accounts(summaries: &[AccountSummary]) {
    for summary in summaries {
        println!("   name: {}", summary.name);
        println!("address: {}", summary.address);
        println!("balance: {}", format_ether(summary.balance));
        println!("  nonce: {}", summary.nonce);
        println!("{}", "-".repeat(80));
    }
    info!(accounts = summaries.len(), "Accounts loaded");
}
