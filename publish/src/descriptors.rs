//! The contract descriptor registry.
//!
//! Every proxied contract is described by the same record: the artifact its creation bytecode
//! is read from, a gas budget for the implementation deployment, and an encoder turning
//! [`InitParams`] into the initializer calldata passed through the proxy factory.

use std::path::Path;

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;

use crate::{
    constants::{DECIMAL_QUOTER_CONTRACT_KEY, FACTORY_CONTRACT_KEY},
    errors::ScriptError,
    solidity::{
        IContractRegistry, IGiftableToken, IOracleQuoter, IOwnable, IOwnableWithAmount,
        IPeriodSimple, IProtocolFeeController, ISplitter, ISwapPool, ITokenUniqueSymbolIndex,
    },
    types::InitParams,
    utils::read_bytecode,
};

/// Encodes the initializer calldata of a contract
pub type InitEncoder = fn(&InitParams) -> Result<Vec<u8>, ScriptError>;

/// Everything needed to deploy a contract behind a proxy
#[derive(Debug)]
pub struct ContractDescriptor {
    /// The logical name, used as the report key
    pub key: &'static str,
    /// The artifact name, `<artifact>.bin` holds the creation bytecode
    pub artifact: &'static str,
    /// The gas limit of the implementation deployment
    pub gas_limit: u64,
    /// The initializer encoder
    pub encode_init: InitEncoder,
}

impl ContractDescriptor {
    /// Reads the creation bytecode from `artifacts_dir`
    pub fn bytecode(&self, artifacts_dir: &Path) -> Result<Bytes, ScriptError> {
        read_bytecode(artifacts_dir, self.artifact)
    }
}

/// What a logical contract name resolves to
#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// The proxy factory itself
    Factory,
    /// The decimal quoter, deployed without a proxy
    DecimalQuoter,
    /// A contract deployed behind a proxy
    Proxied(&'static ContractDescriptor),
}

/// Alternative names accepted for some contracts
const ALIASES: &[(&str, &str)] = &[
    ("factory", FACTORY_CONTRACT_KEY),
    ("token", "giftabletoken"),
    ("pfc", "protocolfeecontroller"),
    ("tokenindex", "tokenuniquesymbolindex"),
];

/// The registry of proxied contracts
static DESCRIPTORS: &[ContractDescriptor] = &[
    ContractDescriptor {
        key: "accountsindex",
        artifact: "AccountsIndex",
        gas_limit: 2_000_000,
        encode_init: encode_owner_only,
    },
    ContractDescriptor {
        key: "cat",
        artifact: "CAT",
        gas_limit: 2_000_000,
        encode_init: encode_owner_only,
    },
    ContractDescriptor {
        key: "contractregistry",
        artifact: "ContractRegistry",
        gas_limit: 2_000_000,
        encode_init: encode_contract_registry,
    },
    ContractDescriptor {
        key: "ethfaucet",
        artifact: "EthFaucet",
        gas_limit: 2_000_000,
        encode_init: encode_eth_faucet,
    },
    ContractDescriptor {
        key: "feepolicy",
        artifact: "FeePolicy",
        gas_limit: 1_000_000,
        encode_init: encode_fee_policy,
    },
    ContractDescriptor {
        key: "giftabletoken",
        artifact: "GiftableToken",
        gas_limit: 2_000_000,
        encode_init: encode_giftable_token,
    },
    ContractDescriptor {
        key: "limiter",
        artifact: "Limiter",
        gas_limit: 2_000_000,
        encode_init: encode_owner_only,
    },
    ContractDescriptor {
        key: "oraclequoter",
        artifact: "OracleQuoter",
        gas_limit: 1_000_000,
        encode_init: encode_oracle_quoter,
    },
    ContractDescriptor {
        key: "periodsimple",
        artifact: "PeriodSimple",
        gas_limit: 2_000_000,
        encode_init: encode_period_simple,
    },
    ContractDescriptor {
        key: "protocolfeecontroller",
        artifact: "ProtocolFeeController",
        gas_limit: 1_000_000,
        encode_init: encode_protocol_fee_controller,
    },
    ContractDescriptor {
        key: "relativequoter",
        artifact: "RelativeQuoter",
        gas_limit: 1_000_000,
        encode_init: encode_owner_only,
    },
    ContractDescriptor {
        key: "splitter",
        artifact: "Splitter",
        gas_limit: 500_000,
        encode_init: encode_splitter,
    },
    ContractDescriptor {
        key: "swappool",
        artifact: "SwapPool",
        gas_limit: 5_000_000,
        encode_init: encode_swap_pool,
    },
    ContractDescriptor {
        key: "tokenuniquesymbolindex",
        artifact: "TokenUniqueSymbolIndex",
        gas_limit: 2_000_000,
        encode_init: encode_token_index,
    },
];

/// Resolves a logical contract name, case insensitively and through aliases
pub fn lookup(name: &str) -> Result<Target, ScriptError> {
    let name = name.trim().to_lowercase();
    let key = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, key)| *key)
        .unwrap_or(name.as_str());

    match key {
        FACTORY_CONTRACT_KEY => Ok(Target::Factory),
        DECIMAL_QUOTER_CONTRACT_KEY => Ok(Target::DecimalQuoter),
        _ => DESCRIPTORS
            .iter()
            .find(|d| d.key == key)
            .map(Target::Proxied)
            .ok_or_else(|| ScriptError::Input(format!("unsupported contract: {name}"))),
    }
}

// ---------------
// | Encoders    |
// ---------------

/// `initialize(address owner)`
fn encode_owner_only(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    Ok(IOwnable::initializeCall {
        owner: params.owner,
    }
    .abi_encode())
}

/// `initialize(address owner, bytes32[] identifiers)`
fn encode_contract_registry(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    if params.registry_identifiers.is_empty() {
        return Err(ScriptError::Input(
            "registry identifiers are required for contractregistry".to_string(),
        ));
    }

    Ok(IContractRegistry::initializeCall {
        owner: params.owner,
        identifiers: params.registry_identifiers.clone(),
    }
    .abi_encode())
}

/// `initialize(address owner, uint256 amount)` with the faucet amount
fn encode_eth_faucet(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    Ok(IOwnableWithAmount::initializeCall {
        owner: params.owner,
        amount: params.faucet_amount,
    }
    .abi_encode())
}

/// `initialize(address owner, uint256 amount)` with the default fee
fn encode_fee_policy(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    Ok(IOwnableWithAmount::initializeCall {
        owner: params.owner,
        amount: params.fee_policy_default,
    }
    .abi_encode())
}

/// `initialize(string name, string symbol, uint8 decimals, address owner, uint256 expiresAt)`
fn encode_giftable_token(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    let token = &params.token;
    Ok(IGiftableToken::initializeCall {
        name: token.name.clone(),
        symbol: token.symbol.clone(),
        decimals: token.decimals,
        owner: params.owner,
        expiresAt: token.expires_at,
    }
    .abi_encode())
}

/// `initialize(address owner, address baseCurrency)`
fn encode_oracle_quoter(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    let base_currency = params.base_currency.ok_or_else(|| {
        ScriptError::Input("base currency is required for oraclequoter".to_string())
    })?;

    Ok(IOracleQuoter::initializeCall {
        owner: params.owner,
        baseCurrency: base_currency,
    }
    .abi_encode())
}

/// `initialize(address owner, address poker)`
fn encode_period_simple(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    Ok(IPeriodSimple::initializeCall {
        owner: params.owner,
        poker: params.period_poker,
    }
    .abi_encode())
}

/// `initialize(address owner, uint256 initialFee, address initialRecipient)`
fn encode_protocol_fee_controller(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    Ok(IProtocolFeeController::initializeCall {
        owner: params.owner,
        initialFee: params.protocol_fee,
        initialRecipient: params.protocol_recipient,
    }
    .abi_encode())
}

/// `initialize(address owner, address[] accounts, uint32[] percentAllocations)`
fn encode_splitter(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    let splitter = &params.splitter;
    if splitter.accounts.is_empty() || splitter.accounts.len() != splitter.allocations.len() {
        return Err(ScriptError::Input(format!(
            "splitter accounts and allocations are required and must have equal length: {} != {}",
            splitter.accounts.len(),
            splitter.allocations.len()
        )));
    }

    Ok(ISplitter::initializeCall {
        owner: params.owner,
        accounts: splitter.accounts.clone(),
        percentAllocations: splitter.allocations.clone(),
    }
    .abi_encode())
}

/// The swap pool initializer, collaborators given as resolved addresses
fn encode_swap_pool(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    let pool = params.pool.as_ref().ok_or_else(|| {
        ScriptError::Input("pool parameters are required for swappool".to_string())
    })?;

    Ok(ISwapPool::initializeCall {
        name: pool.name.clone(),
        symbol: pool.symbol.clone(),
        decimals: pool.decimals,
        owner: params.owner,
        feePolicy: pool.fee_policy,
        feeAddress: pool.fee_address,
        tokenRegistry: pool.token_registry,
        tokenLimiter: pool.token_limiter,
        quoter: pool.quoter,
        feesDecoupled: pool.fees_decoupled,
        protocolFeeController: pool.protocol_fee_controller,
    }
    .abi_encode())
}

/// `initialize(address owner, address[] initialTokens, bytes32[] initialSymbols)`
fn encode_token_index(params: &InitParams) -> Result<Vec<u8>, ScriptError> {
    let index = &params.token_index;
    if !index.tokens.is_empty()
        && !index.symbols.is_empty()
        && index.tokens.len() != index.symbols.len()
    {
        return Err(ScriptError::Input(format!(
            "token index lengths mismatch: {} != {}",
            index.tokens.len(),
            index.symbols.len()
        )));
    }

    Ok(ITokenUniqueSymbolIndex::initializeCall {
        owner: params.owner,
        initialTokens: index.tokens.clone(),
        initialSymbols: index.symbols.clone(),
    }
    .abi_encode())
}
