//! An in-memory chain for exercising the deployment engine without a node.
//!
//! The mock decodes the signed envelopes it receives, enforces the sender's nonce sequence and
//! simulates the three kinds of transaction a run sends: plain contract creation, a call to the
//! deterministic deployment proxy, and a `deployAndCall` on a proxy factory.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use alloy::{
    consensus::TxEnvelope,
    eips::eip2718::Decodable2718,
    primitives::TxKind,
};
use alloy_primitives::{Address, Bytes, Log, TxHash, B256};
use alloy_sol_types::{SolCall, SolEvent};

use crate::{
    chain::{ChainRpc, Receipt},
    constants::{DETERMINISTIC_DEPLOYER_ADDRESS, NUM_BYTES_SALT},
    errors::ScriptError,
    solidity::IERC1967Factory,
};

/// The first anvil development key
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The chain id of a local development node
pub const TEST_CHAIN_ID: u64 = 31337;

/// The code placed at addresses the mock deploys to when a call creates no code of its own
const PLACEHOLDER_CODE: &[u8] = &[0x60, 0x80, 0x60, 0x40];

/// A transaction accepted by the mock
#[derive(Clone, Debug)]
pub struct SentTx {
    /// The transaction hash
    pub hash: TxHash,
    /// The sender's nonce
    pub nonce: u64,
    /// The chain id the transaction was signed for
    pub chain_id: u64,
    /// The destination, `None` for contract creation
    pub to: Option<Address>,
    /// The calldata or creation bytecode
    pub input: Bytes,
    /// The gas limit
    pub gas_limit: u64,
    /// The fee cap
    pub max_fee_per_gas: u128,
    /// The priority fee cap
    pub max_priority_fee_per_gas: u128,
}

/// The mutable state of a [`MockChain`]
#[derive(Default)]
struct MockState {
    /// The sender's next nonce
    nonce: u64,
    /// Deployed code by address
    code: HashMap<Address, Bytes>,
    /// Receipts by transaction hash
    receipts: HashMap<TxHash, Receipt>,
    /// Accepted transactions, in order
    sent: Vec<SentTx>,
    /// The number of receipt queries served
    receipt_polls: u64,
    /// Receipt queries still to answer with `None`
    receipt_delay: u64,
    /// Whether receipts of new transactions are never made available
    withhold_receipts: bool,
    /// An error returned by every receipt query
    poll_error: Option<String>,
    /// An error returned by every broadcast
    broadcast_error: Option<String>,
    /// Whether contract creations revert
    revert_creations: bool,
    /// Whether `deployAndCall` reverts
    revert_proxy_deployments: bool,
    /// Whether `deployAndCall` succeeds without emitting `Deployed`
    drop_deployed_events: bool,
    /// The number of proxies created so far
    proxies_created: u64,
}

/// An in-memory [`ChainRpc`] serving a single sender
pub struct MockChain {
    /// The only account allowed to send transactions
    sender: Address,
    /// The chain state
    state: Mutex<MockState>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(Address::ZERO)
    }
}

impl MockChain {
    /// A chain where `sender` has sent nothing and the deterministic deployment proxy exists
    pub fn new(sender: Address) -> Self {
        let mut state = MockState::default();
        state
            .code
            .insert(DETERMINISTIC_DEPLOYER_ADDRESS, Bytes::from_static(PLACEHOLDER_CODE));

        Self {
            sender,
            state: Mutex::new(state),
        }
    }

    /// The transactions accepted so far
    pub fn sent_transactions(&self) -> Vec<SentTx> {
        self.state().sent.clone()
    }

    /// The number of receipt queries served so far
    pub fn receipt_polls(&self) -> u64 {
        self.state().receipt_polls
    }

    /// The code at `address`, empty if none
    pub fn code(&self, address: Address) -> Bytes {
        self.state().code.get(&address).cloned().unwrap_or_default()
    }

    /// Remove the code at `address`
    pub fn remove_code(&self, address: Address) {
        self.state().code.remove(&address);
    }

    /// Make a receipt available
    pub fn insert_receipt(&self, receipt: Receipt) {
        self.state().receipts.insert(receipt.tx_hash, receipt);
    }

    /// Advance the sender's nonce by `count`, as if it sent transactions elsewhere
    pub fn advance_nonce(&self, count: u64) {
        self.state().nonce += count;
    }

    /// Answer the next `polls` receipt queries with `None`
    pub fn delay_receipts(&self, polls: u64) {
        self.state().receipt_delay = polls;
    }

    /// Never make receipts of further transactions available
    pub fn withhold_receipts(&self) {
        self.state().withhold_receipts = true;
    }

    /// Fail every receipt query with `msg`
    pub fn fail_receipt_polls(&self, msg: &str) {
        self.state().poll_error = Some(msg.to_string());
    }

    /// Reject every broadcast with `msg`
    pub fn reject_broadcasts(&self, msg: &str) {
        self.state().broadcast_error = Some(msg.to_string());
    }

    /// Revert further contract creations
    pub fn revert_creations(&self) {
        self.state().revert_creations = true;
    }

    /// Revert further `deployAndCall` calls
    pub fn revert_proxy_deployments(&self) {
        self.state().revert_proxy_deployments = true;
    }

    /// Omit the `Deployed` event from further `deployAndCall` calls
    pub fn drop_deployed_events(&self) {
        self.state().drop_deployed_events = true;
    }

    /// Lock the chain state
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Execute a decoded transaction, returning its receipt
    fn execute(&self, state: &mut MockState, tx: &SentTx) -> Receipt {
        let mut receipt = mock_receipt(tx.hash, true);

        match tx.to {
            None => {
                if state.revert_creations {
                    receipt.success = false;
                    return receipt;
                }

                let created = self.sender.create(tx.nonce);
                state.code.insert(created, tx.input.clone());
                receipt.contract_address = Some(created);
            }
            Some(to) if to == DETERMINISTIC_DEPLOYER_ADDRESS => {
                if tx.input.len() < NUM_BYTES_SALT {
                    receipt.success = false;
                    return receipt;
                }

                let (salt, init_code) = tx.input.split_at(NUM_BYTES_SALT);
                let salt = B256::from_slice(salt);
                let created = DETERMINISTIC_DEPLOYER_ADDRESS.create2_from_code(salt, init_code);
                state.code.insert(created, Bytes::copy_from_slice(init_code));
            }
            Some(to) => {
                let Ok(call) = IERC1967Factory::deployAndCallCall::abi_decode(&tx.input, true)
                else {
                    return receipt;
                };

                if !state.code.contains_key(&to)
                    || !state.code.contains_key(&call.implementation)
                    || state.revert_proxy_deployments
                {
                    receipt.success = false;
                    return receipt;
                }

                let proxy = to.create(state.proxies_created);
                state.proxies_created += 1;
                state.code.insert(proxy, Bytes::from_static(PLACEHOLDER_CODE));

                if !state.drop_deployed_events {
                    let event = IERC1967Factory::Deployed {
                        proxy,
                        implementation: call.implementation,
                        admin: call.admin,
                    };
                    receipt.logs.push(Log {
                        address: to,
                        data: event.encode_log_data(),
                    });
                }
            }
        }

        receipt
    }
}

impl ChainRpc for MockChain {
    async fn pending_nonce(&self, address: Address) -> Result<u64, ScriptError> {
        let state = self.state();
        Ok(if address == self.sender { state.nonce } else { 0 })
    }

    async fn send_raw_transaction(&self, encoded_tx: Bytes) -> Result<TxHash, ScriptError> {
        let mut state = self.state();
        if let Some(msg) = &state.broadcast_error {
            return Err(ScriptError::Submission(msg.clone()));
        }

        let envelope = TxEnvelope::decode_2718(&mut encoded_tx.as_ref())
            .map_err(|e| ScriptError::Submission(format!("decode tx: {e}")))?;
        let TxEnvelope::Eip1559(signed) = envelope else {
            return Err(ScriptError::Submission("expected an EIP-1559 transaction".to_string()));
        };

        let inner = signed.tx();
        if inner.nonce != state.nonce {
            return Err(ScriptError::Submission(format!(
                "nonce mismatch: expected {}, got {}",
                state.nonce, inner.nonce
            )));
        }

        let tx = SentTx {
            hash: *signed.hash(),
            nonce: inner.nonce,
            chain_id: inner.chain_id,
            to: match inner.to {
                TxKind::Create => None,
                TxKind::Call(to) => Some(to),
            },
            input: inner.input.clone(),
            gas_limit: inner.gas_limit,
            max_fee_per_gas: inner.max_fee_per_gas,
            max_priority_fee_per_gas: inner.max_priority_fee_per_gas,
        };

        state.nonce += 1;
        let receipt = self.execute(&mut state, &tx);
        if !state.withhold_receipts {
            state.receipts.insert(tx.hash, receipt);
        }
        state.sent.push(tx.clone());

        Ok(tx.hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, ScriptError> {
        let mut state = self.state();
        state.receipt_polls += 1;

        if let Some(msg) = &state.poll_error {
            return Err(ScriptError::Rpc(msg.clone()));
        }
        if state.receipt_delay > 0 {
            state.receipt_delay -= 1;
            return Ok(None);
        }

        Ok(state.receipts.get(&tx_hash).cloned())
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        Ok(self.code(address))
    }
}

/// A receipt with no logs and no created contract
pub fn mock_receipt(tx_hash: TxHash, success: bool) -> Receipt {
    Receipt {
        tx_hash,
        success,
        logs: Vec::new(),
        contract_address: None,
    }
}
