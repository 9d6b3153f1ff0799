//! The transaction submitter: builds, signs and broadcasts EIP-1559 transactions.
//!
//! The nonce is re-queried from the chain before every send instead of being cached, so that
//! the next transaction always uses the nonce the chain assigns next. Two writers sharing the
//! key during a run can still collide; a single writer is assumed.

use std::{future::Future, str::FromStr};

use alloy::{
    eips::eip2718::Encodable2718,
    network::{EthereumWallet, TransactionBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use alloy_primitives::{Address, Bytes, TxHash, B256};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use crate::{
    chain::ChainRpc,
    constants::{DEFAULT_GAS_FEE_CAP, DEFAULT_GAS_TIP_CAP, DETERMINISTIC_DEPLOYER_ADDRESS},
    create2::{predict_create2_address, predict_create_address},
    errors::ScriptError,
    types::DeployResult,
};

/// The key every transaction of a run is signed with, and the chain it signs for
#[derive(Clone, Debug)]
pub struct SigningIdentity {
    /// The local signer
    signer: PrivateKeySigner,
    /// The EIP-155 chain id
    chain_id: u64,
}

impl SigningIdentity {
    /// Parse a hex private key, with or without a `0x` prefix
    pub fn from_private_key(priv_key: &str, chain_id: u64) -> Result<Self, ScriptError> {
        let priv_key = priv_key.trim();
        let priv_key = priv_key.strip_prefix("0x").unwrap_or(priv_key);
        let signer = PrivateKeySigner::from_str(priv_key)
            .map_err(|e| ScriptError::Input(format!("parse private key: {e}")))?;

        if chain_id == 0 {
            return Err(ScriptError::Input("chain id must be non-zero".to_string()));
        }

        Ok(Self { signer, chain_id })
    }

    /// The account address derived from the key
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The chain id transactions are signed for
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Fixed EIP-1559 fee parameters, applied to every transaction of a run
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeePolicy {
    /// The fee cap, in wei per gas
    pub max_fee_per_gas: u128,
    /// The priority fee cap, in wei per gas
    pub max_priority_fee_per_gas: u128,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            max_fee_per_gas: DEFAULT_GAS_FEE_CAP,
            max_priority_fee_per_gas: DEFAULT_GAS_TIP_CAP,
        }
    }
}

/// Signs and broadcasts transactions for a single [`SigningIdentity`].
///
/// Each call issues exactly one transaction and never retries.
pub struct TransactionSubmitter<'a, C> {
    /// The chain transactions are sent to
    chain: &'a C,
    /// The signing key and chain id
    identity: SigningIdentity,
    /// The wallet wrapping the identity's signer
    wallet: EthereumWallet,
    /// The fee parameters
    fees: FeePolicy,
    /// The session deadline every network call is bounded by
    deadline: Instant,
}

impl<'a, C: ChainRpc> TransactionSubmitter<'a, C> {
    /// Create a submitter whose network calls must complete before `deadline`
    pub fn new(
        chain: &'a C,
        identity: SigningIdentity,
        fees: FeePolicy,
        deadline: Instant,
    ) -> Self {
        let wallet = EthereumWallet::from(identity.signer.clone());
        Self {
            chain,
            identity,
            wallet,
            fees,
            deadline,
        }
    }

    /// The sending account
    pub fn address(&self) -> Address {
        self.identity.address()
    }

    /// Submit `bytecode` as a plain contract creation.
    ///
    /// The returned address is derived from the sender and the nonce used.
    pub async fn deploy_contract(
        &self,
        bytecode: Bytes,
        gas_limit: u64,
    ) -> Result<DeployResult, ScriptError> {
        let nonce = self.next_nonce().await?;
        let contract_address = predict_create_address(self.address(), nonce);

        let tx = self.base_request(nonce, gas_limit).with_deploy_code(bytecode);
        let tx_hash = self.sign_and_send(tx).await?;

        info!(
            tx_hash = %tx_hash,
            nonce,
            contract_address = %contract_address,
            "submitted contract creation"
        );
        Ok(DeployResult {
            tx_hash,
            contract_address,
        })
    }

    /// Submit a call of `destination` with `payload`
    pub async fn invoke(
        &self,
        destination: Address,
        payload: Bytes,
        gas_limit: u64,
    ) -> Result<TxHash, ScriptError> {
        let nonce = self.next_nonce().await?;

        let tx = self
            .base_request(nonce, gas_limit)
            .with_to(destination)
            .with_input(payload);
        let tx_hash = self.sign_and_send(tx).await?;

        info!(tx_hash = %tx_hash, nonce, to = %destination, "submitted call");
        Ok(tx_hash)
    }

    /// Deploy `init_code` through the deterministic deployment proxy under `salt`
    pub async fn deploy_deterministic(
        &self,
        salt: B256,
        init_code: &[u8],
        gas_limit: u64,
    ) -> Result<DeployResult, ScriptError> {
        let contract_address =
            predict_create2_address(DETERMINISTIC_DEPLOYER_ADDRESS, salt, init_code);

        let mut payload = Vec::with_capacity(salt.len() + init_code.len());
        payload.extend_from_slice(salt.as_slice());
        payload.extend_from_slice(init_code);

        let tx_hash = self
            .invoke(DETERMINISTIC_DEPLOYER_ADDRESS, payload.into(), gas_limit)
            .await?;

        Ok(DeployResult {
            tx_hash,
            contract_address,
        })
    }

    /// Fetch the account's pending nonce
    async fn next_nonce(&self) -> Result<u64, ScriptError> {
        let nonce = within_deadline(
            self.deadline,
            "fetch nonce",
            self.chain.pending_nonce(self.address()),
        )
        .await?;
        debug!(address = %self.address(), nonce, "fetched nonce");
        Ok(nonce)
    }

    /// The fields shared by every transaction of the run
    fn base_request(&self, nonce: u64, gas_limit: u64) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.address())
            .with_chain_id(self.identity.chain_id())
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_max_fee_per_gas(self.fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(self.fees.max_priority_fee_per_gas)
    }

    /// Sign `tx` as an EIP-1559 envelope and broadcast it
    async fn sign_and_send(&self, tx: TransactionRequest) -> Result<TxHash, ScriptError> {
        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| ScriptError::Submission(format!("sign tx: {e}")))?;
        let tx_hash = *envelope.tx_hash();

        within_deadline(
            self.deadline,
            "broadcast tx",
            self.chain.send_raw_transaction(envelope.encoded_2718().into()),
        )
        .await?;

        Ok(tx_hash)
    }
}

/// Awaits `fut`, failing with a timeout once `deadline` passes
pub async fn within_deadline<T>(
    deadline: Instant,
    action: &str,
    fut: impl Future<Output = Result<T, ScriptError>>,
) -> Result<T, ScriptError> {
    // `timeout_at` polls the inner future once before checking the timer
    if Instant::now() >= deadline {
        return Err(ScriptError::Timeout(format!("{action}: session deadline elapsed")));
    }

    timeout_at(deadline, fut)
        .await
        .map_err(|_| ScriptError::Timeout(format!("{action}: session deadline elapsed")))?
}
