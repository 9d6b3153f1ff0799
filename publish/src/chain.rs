//! The chain RPC boundary.
//!
//! The deployment engine consumes only what [`ChainRpc`] exposes, so that a run can be driven
//! against a live node through [`HttpChain`] or against an in-memory chain in tests.

use alloy::{
    providers::{Provider, RootProvider},
    rpc::types::TransactionReceipt,
};
use alloy_primitives::{Address, Bytes, Log, TxHash};
use url::Url;

use crate::errors::ScriptError;

/// A transaction receipt, reduced to what the deployment engine inspects
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// The hash of the included transaction
    pub tx_hash: TxHash,
    /// Whether execution succeeded
    pub success: bool,
    /// The logs emitted during execution
    pub logs: Vec<Log>,
    /// The created contract, for contract creation transactions
    pub contract_address: Option<Address>,
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Receipt {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
            contract_address: receipt.contract_address,
        }
    }
}

/// The RPC operations the deployment engine needs from a chain
#[allow(async_fn_in_trait)]
pub trait ChainRpc {
    /// The account's next usable nonce, counting pending transactions
    async fn pending_nonce(&self, address: Address) -> Result<u64, ScriptError>;

    /// Broadcast an EIP-2718 encoded, signed transaction
    async fn send_raw_transaction(&self, encoded_tx: Bytes) -> Result<TxHash, ScriptError>;

    /// The receipt of a transaction, or `None` if it is not yet included
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, ScriptError>;

    /// The code deployed at an address, empty if there is none
    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError>;
}

/// A [`ChainRpc`] backed by a JSON-RPC node over HTTP
#[derive(Clone, Debug)]
pub struct HttpChain {
    /// The node URL, kept for error context
    url: Url,
    /// The underlying provider
    provider: RootProvider,
}

impl HttpChain {
    /// Connect to the node at `url`. No request is made until the first call.
    pub fn new(url: Url) -> Result<Self, ScriptError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScriptError::ClientInitialization(format!(
                "unsupported RPC URL scheme {:?}, expected http or https",
                url.scheme()
            )));
        }

        let provider = RootProvider::new_http(url.clone());
        Ok(Self { url, provider })
    }

    /// The node URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl ChainRpc for HttpChain {
    async fn pending_nonce(&self, address: Address) -> Result<u64, ScriptError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| {
                ScriptError::NonceFetching(format!("{address:#x} via {}: {e}", self.url))
            })
    }

    async fn send_raw_transaction(&self, encoded_tx: Bytes) -> Result<TxHash, ScriptError> {
        let pending = self
            .provider
            .send_raw_transaction(&encoded_tx)
            .await
            .map_err(|e| ScriptError::Submission(format!("send tx via {}: {e}", self.url)))?;

        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, ScriptError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ScriptError::Rpc(format!("get receipt {tx_hash:#x}: {e}")))?;

        Ok(receipt.map(Receipt::from))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::Rpc(format!("get code at {address:#x}: {e}")))
    }
}
