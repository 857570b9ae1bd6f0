//! Genesis file generator
//!
//! Produces a genesis block description for a private development chain with
//! a set of pre-funded addresses. Works entirely offline.

use crate::{Error, Result};
use alloy::primitives::utils::parse_ether;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Chain id used when none is given
pub const DEFAULT_CHAIN_ID: u64 = 99;

/// Default output file name
pub const GENESIS_FILE: &str = "genesis.json";

const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Build a genesis document funding each of `addresses` with `balance_ether`.
///
/// Addresses are used verbatim as `alloc` keys.
pub fn build_genesis(chain_id: u64, balance_ether: &str, addresses: &[String]) -> Result<Value> {
    let wei = parse_ether(balance_ether).map_err(|e| {
        Error::InvalidArgument(format!("Invalid balance {}: {}", balance_ether, e))
    })?;

    let mut alloc = Map::new();
    for address in addresses {
        alloc.insert(address.clone(), json!({ "balance": wei.to_string() }));
    }

    Ok(json!({
        "config": {
            "chainId": chain_id,
            "homesteadBlock": 0,
            "eip150Block": 0,
            "eip155Block": 0,
            "eip158Block": 0,
            "byzantiumBlock": 0,
            "constantinopleBlock": 0,
            "petersburgBlock": 0,
            "istanbulBlock": 0
        },
        "alloc": alloc,
        "coinbase": "0x0000000000000000000000000000000000000000",
        "difficulty": "0x20000",
        "extraData": "",
        "gasLimit": "0x2fefd8",
        "nonce": "0x0000000000000042",
        "mixhash": ZERO_HASH,
        "parentHash": ZERO_HASH,
        "timestamp": "0x00"
    }))
}

/// Build the genesis document and write it, pretty-printed, to `out`
pub fn write_genesis(
    out: &Path,
    chain_id: u64,
    balance_ether: &str,
    addresses: &[String],
) -> Result<()> {
    let genesis = build_genesis(chain_id, balance_ether, addresses)?;
    std::fs::write(out, serde_json::to_string_pretty(&genesis)?)?;
    tracing::info!(
        path = %out.display(),
        accounts = addresses.len(),
        "Wrote genesis file"
    );
    Ok(())
}
