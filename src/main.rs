//! Ethereum client CLI
//!
//! Command-line interface for keystore accounts, transfers and contracts.

use clap::{Args, Parser, Subcommand};
use ethctl::genesis::{DEFAULT_CHAIN_ID, GENESIS_FILE};
use ethctl::{Command, GlobalOptions, InvokeKind};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ethctl")]
#[command(about = "Keystore-backed command-line client for Ethereum nodes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config layer (YAML, or JSON when named *.json); repeat to stack
    /// overrides (default: config.yaml, config.local.yaml)
    #[arg(short, long, global = true)]
    config: Vec<PathBuf>,

    /// Node RPC URL, overriding ETH_RPC_URL and the config
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a genesis file pre-funding the given addresses
    Genesis {
        /// Balance per address, in ether
        balance: String,

        /// Addresses to fund
        addresses: Vec<String>,

        /// Output path
        #[arg(long, default_value = GENESIS_FILE)]
        out: PathBuf,

        /// Chain id written into the chain config
        #[arg(long, default_value_t = DEFAULT_CHAIN_ID)]
        chain_id: u64,
    },

    /// List configured accounts with balances and nonces
    List,

    /// Transfer ether from one account to each of several others, in order
    Transfer {
        /// Amount in ether
        amount: String,

        /// Sending account name
        from: String,

        /// Receiving account names
        to: Vec<String>,
    },

    /// Deploy a compiled contract
    Deploy {
        /// Deploying account name
        from: String,

        /// Contract ABI (JSON): a path, or a contract name from the config
        abi: PathBuf,

        /// Contract bytecode (hex): a path, or a contract name from the config
        bin: PathBuf,

        /// Constructor arguments
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Execute a contract method read-only
    Call(InvokeArgs),

    /// Send a transaction invoking a contract method
    Send(InvokeArgs),

    /// Anything else just lists accounts
    #[command(external_subcommand)]
    Other(Vec<String>),
}

#[derive(Args)]
struct InvokeArgs {
    /// Calling account name
    from: String,

    /// Contract ABI (JSON): a path, or a contract name from the config
    abi: PathBuf,

    /// Deployed contract address
    contract: String,

    /// Method name
    method: String,

    /// Method arguments
    #[arg(allow_hyphen_values = true)]
    args: Vec<String>,
}

impl InvokeArgs {
    fn into_command(self, kind: InvokeKind) -> Command {
        Command::Invoke {
            kind,
            from: self.from,
            abi_path: self.abi,
            contract: self.contract,
            method: self.method,
            args: self.args,
        }
    }
}

/// Map the parsed subcommand onto a library command; no subcommand means list
fn to_command(command: Option<Commands>) -> Command {
    match command {
        Some(Commands::Genesis {
            balance,
            addresses,
            out,
            chain_id,
        }) => Command::Genesis {
            balance,
            addresses,
            out,
            chain_id,
        },
        Some(Commands::Transfer { amount, from, to }) => Command::Transfer { amount, from, to },
        Some(Commands::Deploy {
            from,
            abi,
            bin,
            args,
        }) => Command::Deploy {
            from,
            abi_path: abi,
            bin_path: bin,
            args,
        },
        Some(Commands::Call(args)) => args.into_command(InvokeKind::Call),
        Some(Commands::Send(args)) => args.into_command(InvokeKind::Send),
        Some(Commands::List) | Some(Commands::Other(_)) | None => Command::List,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let options = GlobalOptions {
        config_layers: cli.config,
        rpc_url: cli.rpc_url,
    };

    match ethctl::dispatch(to_command(cli.command), &options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}
