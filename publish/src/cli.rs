//! Definitions of CLI arguments and commands for the publish scripts

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::{
    chain::ChainRpc,
    commands::publish_one,
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_GAS_FEE_CAP, DEFAULT_GAS_TIP_CAP, DEFAULT_LOG_LEVEL,
        DEFAULT_TIMEOUT_SECONDS,
    },
    errors::ScriptError,
    types::{PoolQuoterKind, Report},
};

/// Deploys contracts to an EVM chain behind ERC1967 proxies
#[derive(Parser, Debug)]
#[command(name = "publish", version)]
pub struct Cli {
    /// Default log filter, overridden by `RUST_LOG`
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy a single logical contract
    PublishOne(PublishOneArgs),
}

impl Command {
    /// The RPC URL the command talks to
    pub fn rpc_url(&self) -> &Url {
        match self {
            Command::PublishOne(args) => &args.rpc_url,
        }
    }

    /// Run the command against `chain`
    pub async fn run(self, chain: &impl ChainRpc) -> Result<Report, ScriptError> {
        match self {
            Command::PublishOne(args) => publish_one(args, chain).await,
        }
    }
}

/// Deploy one contract.
///
/// Proxied contracts get an implementation and an ERC1967 proxy created and initialized by the
/// proxy factory. The factory is either given explicitly or deployed deterministically.
#[derive(Args, Debug, Clone)]
pub struct PublishOneArgs {
    /// The logical name of the contract to deploy
    #[arg(long, env = "CONTRACT")]
    pub contract: String,

    /// Network RPC URL
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Url,

    /// The chain id transactions are signed for
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: u64,

    /// Private key of the deployer, in hex
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// The deployer address, checked against the private key
    #[arg(long, env = "PUBLIC_ADDRESS")]
    pub public_address: Option<Address>,

    /// The owner of the deployed contract, defaults to the deployer
    #[arg(long, env = "OWNER")]
    pub owner: Option<Address>,

    /// The proxy admin, defaults to the owner
    #[arg(long, env = "ADMIN")]
    pub admin: Option<Address>,

    /// EIP-1559 fee cap, in wei
    #[arg(long, env = "GAS_FEE_CAP", default_value_t = DEFAULT_GAS_FEE_CAP)]
    pub gas_fee_cap: u128,

    /// EIP-1559 priority fee cap, in wei
    #[arg(long, env = "GAS_TIP_CAP", default_value_t = DEFAULT_GAS_TIP_CAP)]
    pub gas_tip_cap: u128,

    /// Deadline of the whole run, in seconds
    #[arg(long, env = "TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// An already deployed ERC1967Factory to use instead of the deterministic one
    #[arg(long, env = "FACTORY_ADDRESS")]
    pub factory_address: Option<Address>,

    /// A suffix appended to the factory name before salt derivation
    #[arg(long, env = "FACTORY_SALT_SUFFIX", default_value = "")]
    pub factory_salt_suffix: String,

    /// Directory holding the `<Artifact>.bin` creation bytecode files
    #[arg(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    // --- Oracle quoter ---
    /// Base currency of the oracle quoter
    #[arg(long, env = "BASE_CURRENCY")]
    pub base_currency: Option<Address>,

    // --- Swap pool ---
    /// The quoter proxy used by the swap pool
    #[arg(long, env = "POOL_QUOTER")]
    pub pool_quoter: Option<Address>,

    /// Which kind of quoter `--pool-quoter` is, for display only
    #[arg(long, env = "POOL_QUOTER_KIND", value_enum, default_value_t = PoolQuoterKind::Relative)]
    pub pool_quoter_kind: PoolQuoterKind,

    /// The token registry of the swap pool, zero if unset
    #[arg(long, env = "POOL_TOKEN_REGISTRY")]
    pub pool_token_registry: Option<Address>,

    /// The address receiving pool fees, defaults to the owner
    #[arg(long, env = "POOL_FEE_ADDRESS")]
    pub pool_fee_address: Option<Address>,

    /// The swap pool token name
    #[arg(long, env = "POOL_NAME", default_value = "Sarafu Pool")]
    pub pool_name: String,

    /// The swap pool token symbol
    #[arg(long, env = "POOL_SYMBOL", default_value = "SRFp")]
    pub pool_symbol: String,

    /// The swap pool token decimals
    #[arg(long, env = "POOL_DECIMALS", default_value_t = 6)]
    pub pool_decimals: u8,

    /// Whether pool fees are decoupled from the pool balance
    #[arg(long, env = "POOL_FEES_DECOUPLED")]
    pub pool_fees_decoupled: bool,

    /// The fee policy proxy used by the swap pool
    #[arg(long, env = "POOL_FEE_POLICY")]
    pub pool_fee_policy: Option<Address>,

    /// The limiter proxy used by the swap pool
    #[arg(long, env = "POOL_TOKEN_LIMITER")]
    pub pool_token_limiter: Option<Address>,

    /// The protocol fee controller proxy used by the swap pool
    #[arg(long, env = "POOL_PROTOCOL_FEE_CONTROLLER")]
    pub pool_protocol_fee_controller: Option<Address>,

    // --- Giftable token ---
    /// The token name
    #[arg(long, env = "TOKEN_NAME", default_value = "Sarafu")]
    pub token_name: String,

    /// The token symbol
    #[arg(long, env = "TOKEN_SYMBOL", default_value = "SRF")]
    pub token_symbol: String,

    /// The token decimals
    #[arg(long, env = "TOKEN_DECIMALS", default_value_t = 6)]
    pub token_decimals: u8,

    /// The token expiry timestamp, zero for none
    #[arg(long, env = "TOKEN_EXPIRES_AT", default_value_t = 0)]
    pub token_expires_at: u64,

    // --- Fees ---
    /// The default fee of the fee policy
    #[arg(long, env = "FEE_POLICY_DEFAULT", default_value_t = 5000)]
    pub fee_policy_default: u64,

    /// The initial fee of the protocol fee controller
    #[arg(long, env = "PROTOCOL_FEE", default_value_t = 1000)]
    pub protocol_fee: u64,

    /// The initial recipient of the protocol fee controller, defaults to the owner
    #[arg(long, env = "PROTOCOL_RECIPIENT")]
    pub protocol_recipient: Option<Address>,

    // --- Misc ---
    /// The amount handed out by the faucet
    #[arg(long, env = "FAUCET_AMOUNT", default_value_t = 0)]
    pub faucet_amount: u64,

    /// The period poker, defaults to the owner
    #[arg(long, env = "PERIOD_POKER")]
    pub period_poker: Option<Address>,

    /// Comma separated contract registry identifiers
    #[arg(long, env = "REGISTRY_IDENTIFIERS", default_value = "")]
    pub registry_identifiers: String,

    /// Comma separated initial token addresses of the token index
    #[arg(long, env = "TOKEN_INDEX_TOKENS", default_value = "")]
    pub token_index_tokens: String,

    /// Comma separated initial symbols of the token index
    #[arg(long, env = "TOKEN_INDEX_SYMBOLS", default_value = "")]
    pub token_index_symbols: String,

    /// Comma separated splitter accounts
    #[arg(long, env = "SPLITTER_ACCOUNTS", default_value = "")]
    pub splitter_accounts: String,

    /// Comma separated splitter percentage allocations
    #[arg(long, env = "SPLITTER_ALLOCATIONS", default_value = "")]
    pub splitter_allocations: String,
}
