//! Type definitions used throughout the publish scripts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy_primitives::{Address, TxHash, B256, U256};
use clap::ValueEnum;
use serde::Serialize;

use crate::errors::ScriptError;

/// The states a proxied deployment moves through, in order.
///
/// Failure is not a state here: it is the `Err` returned from whichever state was current.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeployState {
    /// Verifying, predicting or deploying the proxy factory
    ResolvingFactory,
    /// Submitting the implementation creation transaction
    DeployingImplementation,
    /// Waiting for the implementation receipt
    AwaitingImplementationReceipt,
    /// Encoding the initializer call
    EncodingInit,
    /// Submitting the factory's `deployAndCall`
    DeployingProxy,
    /// Waiting for the proxy receipt
    AwaitingProxyReceipt,
    /// Decoding the proxy address from the `Deployed` event
    ExtractingProxyAddress,
    /// Both addresses are known
    Done,
}

impl Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployState::ResolvingFactory => write!(f, "resolving-factory"),
            DeployState::DeployingImplementation => write!(f, "deploying-implementation"),
            DeployState::AwaitingImplementationReceipt => {
                write!(f, "awaiting-implementation-receipt")
            }
            DeployState::EncodingInit => write!(f, "encoding-init"),
            DeployState::DeployingProxy => write!(f, "deploying-proxy"),
            DeployState::AwaitingProxyReceipt => write!(f, "awaiting-proxy-receipt"),
            DeployState::ExtractingProxyAddress => write!(f, "extracting-proxy-address"),
            DeployState::Done => write!(f, "done"),
        }
    }
}

/// The result of submitting a contract creation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeployResult {
    /// The hash of the creation transaction
    pub tx_hash: TxHash,
    /// The address the contract will live at once the transaction is mined
    pub contract_address: Address,
}

/// The terminal artifact of a proxied deployment
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeployedPair {
    /// The implementation contract
    pub implementation: Address,
    /// The proxy pointing at the implementation
    pub proxy: Address,
    /// The factory that created the proxy
    pub factory: Address,
}

/// The report printed on success
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Report {
    /// The proxy factory used, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
    /// The decimal quoter, which is deployed without a proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_quoter: Option<String>,
    /// Logical name to implementation address
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub implementations: BTreeMap<String, String>,
    /// Logical name to proxy address
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub proxies: BTreeMap<String, String>,
}

impl Report {
    /// Renders the report as pretty printed JSON
    pub fn to_json_pretty(&self) -> Result<String, ScriptError> {
        serde_json::to_string_pretty(self).map_err(|e| ScriptError::Serde(e.to_string()))
    }

    /// Record a proxied deployment under the given logical name
    pub fn record_pair(&mut self, key: &str, pair: &DeployedPair) {
        self.factory = Some(pair.factory.to_checksum(None));
        self.implementations.insert(key.to_string(), pair.implementation.to_checksum(None));
        self.proxies.insert(key.to_string(), pair.proxy.to_checksum(None));
    }
}

/// How the swap pool quoter was obtained. Only ever displayed.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PoolQuoterKind {
    /// A relative quoter
    Relative,
    /// An oracle quoter
    Oracle,
}

impl Display for PoolQuoterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolQuoterKind::Relative => write!(f, "relative"),
            PoolQuoterKind::Oracle => write!(f, "oracle"),
        }
    }
}

/// Token metadata for the giftable token
#[derive(Clone, Debug, Default)]
pub struct TokenParams {
    /// The token name
    pub name: String,
    /// The token symbol
    pub symbol: String,
    /// The token decimals
    pub decimals: u8,
    /// The expiry timestamp, zero for none
    pub expires_at: U256,
}

/// Initial entries of the token unique symbol index
#[derive(Clone, Debug, Default)]
pub struct TokenIndexEntries {
    /// Token addresses
    pub tokens: Vec<Address>,
    /// Symbols, right padded to 32 bytes
    pub symbols: Vec<B256>,
}

/// The splitter's accounts and their percentage allocations
#[derive(Clone, Debug, Default)]
pub struct SplitterEntries {
    /// Receiving accounts
    pub accounts: Vec<Address>,
    /// Allocation per account, index aligned with `accounts`
    pub allocations: Vec<u32>,
}

/// Swap pool parameters.
///
/// All collaborator contracts must already be deployed and are passed as resolved addresses.
#[derive(Clone, Debug)]
pub struct PoolParams {
    /// The pool token name
    pub name: String,
    /// The pool token symbol
    pub symbol: String,
    /// The pool token decimals
    pub decimals: u8,
    /// The fee policy proxy
    pub fee_policy: Address,
    /// The fee receiving address
    pub fee_address: Address,
    /// The token registry, zero for none
    pub token_registry: Address,
    /// The token limiter proxy
    pub token_limiter: Address,
    /// The quoter proxy
    pub quoter: Address,
    /// Whether fees are decoupled from the pool balance
    pub fees_decoupled: bool,
    /// The protocol fee controller proxy
    pub protocol_fee_controller: Address,
}

/// The structured argument record handed to a contract descriptor's encoder
#[derive(Clone, Debug, Default)]
pub struct InitParams {
    /// The owner of the initialized contract
    pub owner: Address,
    /// Giftable token metadata
    pub token: TokenParams,
    /// The fee policy's default fee
    pub fee_policy_default: U256,
    /// The protocol fee controller's initial fee
    pub protocol_fee: U256,
    /// The protocol fee controller's initial recipient
    pub protocol_recipient: Address,
    /// The amount handed out by the faucet
    pub faucet_amount: U256,
    /// The period poker
    pub period_poker: Address,
    /// The oracle quoter's base currency
    pub base_currency: Option<Address>,
    /// The contract registry identifiers, right padded to 32 bytes
    pub registry_identifiers: Vec<B256>,
    /// The token index's initial entries
    pub token_index: TokenIndexEntries,
    /// The splitter's entries
    pub splitter: SplitterEntries,
    /// The swap pool parameters, only set when publishing a swap pool
    pub pool: Option<PoolParams>,
}
