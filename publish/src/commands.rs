//! Implementations of the publish commands

use alloy_primitives::{Address, U256};
use tokio::time::{Duration, Instant};
use tracing::info;

use crate::{
    chain::ChainRpc,
    cli::PublishOneArgs,
    constants::{
        DECIMAL_QUOTER_CONTRACT_KEY, DECIMAL_QUOTER_GAS_LIMIT, DECIMAL_QUOTER_NAME, FACTORY_NAME,
    },
    descriptors::{lookup, Target},
    errors::ScriptError,
    orchestrator::{FactorySource, Orchestrator},
    submitter::{FeePolicy, SigningIdentity},
    types::{InitParams, PoolParams, Report, SplitterEntries, TokenIndexEntries, TokenParams},
    utils::{parse_address_list, parse_bytes32_list, parse_u32_list, read_bytecode},
};

/// Deploys the contract named in `args` and reports the resulting addresses.
///
/// Every input is validated and every artifact read before the first chain interaction.
pub async fn publish_one(
    args: PublishOneArgs,
    chain: &impl ChainRpc,
) -> Result<Report, ScriptError> {
    let target = lookup(&args.contract)?;

    let identity = SigningIdentity::from_private_key(&args.private_key, args.chain_id)?;
    let deployer = identity.address();
    if let Some(public_address) = args.public_address {
        if public_address != deployer {
            return Err(ScriptError::Input(format!(
                "public address {public_address:#x} does not match private key address \
                 {deployer:#x}"
            )));
        }
    }

    let owner = args.owner.unwrap_or(deployer);
    let admin = args.admin.unwrap_or(owner);
    let fees = FeePolicy {
        max_fee_per_gas: args.gas_fee_cap,
        max_priority_fee_per_gas: args.gas_tip_cap,
    };
    let deadline = Instant::now() + Duration::from_secs(args.timeout_seconds);

    info!(
        contract = %args.contract,
        deployer = %deployer,
        chain_id = args.chain_id,
        "publishing"
    );
    let orchestrator = Orchestrator::new(chain, identity, fees, deadline);
    let mut report = Report::default();

    match target {
        Target::Factory => {
            let source = factory_source(&args)?;
            let factory = orchestrator.resolve_factory(&source).await?;
            report.factory = Some(factory.to_checksum(None));
        }
        Target::DecimalQuoter => {
            let bytecode = read_bytecode(&args.artifacts_dir, DECIMAL_QUOTER_NAME)?;
            let address = orchestrator
                .deploy_plain(DECIMAL_QUOTER_CONTRACT_KEY, bytecode, DECIMAL_QUOTER_GAS_LIMIT)
                .await?;
            report.decimal_quoter = Some(address.to_checksum(None));
        }
        Target::Proxied(descriptor) => {
            let params = build_init_params(&args, descriptor.key, owner)?;
            // Surface encoding errors now rather than after the implementation is deployed
            (descriptor.encode_init)(&params)?;

            let bytecode = descriptor.bytecode(&args.artifacts_dir)?;
            let source = factory_source(&args)?;

            let factory = orchestrator.resolve_factory(&source).await?;
            let pair = orchestrator
                .deploy_proxied(descriptor, bytecode, &params, factory, admin)
                .await?;
            report.record_pair(descriptor.key, &pair);
        }
    }

    Ok(report)
}

/// The factory to deploy through, reading the factory bytecode if it may need deploying
fn factory_source(args: &PublishOneArgs) -> Result<FactorySource, ScriptError> {
    match args.factory_address {
        Some(address) => Ok(FactorySource::Explicit(address)),
        None => Ok(FactorySource::Deterministic {
            init_code: read_bytecode(&args.artifacts_dir, FACTORY_NAME)?,
            salt_suffix: args.factory_salt_suffix.clone(),
        }),
    }
}

/// Builds the initializer arguments of the contract `key`, checking the contract specific
/// parameters it requires
fn build_init_params(
    args: &PublishOneArgs,
    key: &str,
    owner: Address,
) -> Result<InitParams, ScriptError> {
    let mut params = InitParams {
        owner,
        token: TokenParams {
            name: args.token_name.clone(),
            symbol: args.token_symbol.clone(),
            decimals: args.token_decimals,
            expires_at: U256::from(args.token_expires_at),
        },
        fee_policy_default: U256::from(args.fee_policy_default),
        protocol_fee: U256::from(args.protocol_fee),
        protocol_recipient: args.protocol_recipient.unwrap_or(owner),
        faucet_amount: U256::from(args.faucet_amount),
        period_poker: args.period_poker.unwrap_or(owner),
        base_currency: args.base_currency.filter(|a| !a.is_zero()),
        ..Default::default()
    };

    match key {
        "contractregistry" => {
            params.registry_identifiers = parse_bytes32_list(&args.registry_identifiers)?;
            if params.registry_identifiers.is_empty() {
                return Err(ScriptError::Input(
                    "registry-identifiers is required for contractregistry".to_string(),
                ));
            }
        }
        "oraclequoter" => {
            if params.base_currency.is_none() {
                return Err(ScriptError::Input(
                    "base-currency is required for oraclequoter".to_string(),
                ));
            }
        }
        "splitter" => {
            let accounts = parse_address_list(&args.splitter_accounts)?;
            let allocations = parse_u32_list(&args.splitter_allocations)?;
            if accounts.is_empty() || accounts.len() != allocations.len() {
                return Err(ScriptError::Input(format!(
                    "splitter-accounts and splitter-allocations are required and must have equal \
                     length, got {} accounts and {} allocations",
                    accounts.len(),
                    allocations.len()
                )));
            }
            params.splitter = SplitterEntries {
                accounts,
                allocations,
            };
        }
        "swappool" => params.pool = Some(build_pool_params(args, owner)?),
        "tokenuniquesymbolindex" => {
            let tokens = parse_address_list(&args.token_index_tokens)?;
            let symbols = parse_bytes32_list(&args.token_index_symbols)?;
            if !tokens.is_empty() && !symbols.is_empty() && tokens.len() != symbols.len() {
                return Err(ScriptError::Input(format!(
                    "token-index lengths mismatch: {} != {}",
                    tokens.len(),
                    symbols.len()
                )));
            }
            params.token_index = TokenIndexEntries { tokens, symbols };
        }
        _ => {}
    }

    Ok(params)
}

/// Builds the swap pool parameters. The collaborator proxies must all be given.
fn build_pool_params(args: &PublishOneArgs, owner: Address) -> Result<PoolParams, ScriptError> {
    let required = |value: Option<Address>, flag: &str| {
        value.ok_or_else(|| ScriptError::Input(format!("{flag} is required for swappool")))
    };

    let quoter = required(args.pool_quoter, "pool-quoter")?;
    info!(quoter = %quoter, kind = %args.pool_quoter_kind, "using swap pool quoter");

    Ok(PoolParams {
        name: args.pool_name.clone(),
        symbol: args.pool_symbol.clone(),
        decimals: args.pool_decimals,
        fee_policy: required(args.pool_fee_policy, "pool-fee-policy")?,
        fee_address: args.pool_fee_address.unwrap_or(owner),
        token_registry: args.pool_token_registry.unwrap_or_default(),
        token_limiter: required(args.pool_token_limiter, "pool-token-limiter")?,
        quoter,
        fees_decoupled: args.pool_fees_decoupled,
        protocol_fee_controller: required(
            args.pool_protocol_fee_controller,
            "pool-protocol-fee-controller",
        )?,
    })
}
