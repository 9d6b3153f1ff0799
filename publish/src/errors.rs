//! Definitions of errors that can occur while publishing a contract

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy_primitives::{Address, TxHash};

use crate::types::DeployState;

/// Errors that can occur while publishing a contract.
///
/// None of these are recovered from internally; the first one aborts the run.
#[derive(Debug)]
pub enum ScriptError {
    /// Malformed or missing caller input, detected before any chain interaction
    Input(String),
    /// Error reading or decoding a creation bytecode artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error fetching the nonce of the deployer
    NonceFetching(String),
    /// Error signing or broadcasting a transaction
    Submission(String),
    /// Any other transport or serialization error at the RPC boundary
    Rpc(String),
    /// The session deadline elapsed before the awaited result was observed.
    ///
    /// This does not imply that a broadcast transaction failed.
    Timeout(String),
    /// An address expected to hold contract code holds none
    CodeCheck(String),
    /// A receipt was observed, but its status indicates an on-chain failure
    DeploymentReverted {
        /// The logical contract being deployed
        contract: String,
        /// The step at which the revert was observed
        step: DeployState,
        /// The hash of the reverted transaction
        tx_hash: TxHash,
    },
    /// A successful proxy receipt did not carry the factory's `Deployed` event
    MissingEvent {
        /// The logical contract being deployed
        contract: String,
        /// The hash of the proxy deployment transaction
        tx_hash: TxHash,
    },
    /// A failure after the implementation was confirmed.
    ///
    /// The implementation address stays valid and may be reused.
    ProxyStep {
        /// The logical contract being deployed
        contract: String,
        /// The confirmed implementation address
        implementation: Address,
        /// The underlying failure
        cause: Box<ScriptError>,
    },
    /// Error de/serializing a value
    Serde(String),
}

impl ScriptError {
    /// The innermost error, looking through proxy step wrappers
    pub fn root_cause(&self) -> &ScriptError {
        match self {
            ScriptError::ProxyStep { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Input(s) => write!(f, "invalid input: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::NonceFetching(s) => write!(f, "error fetching nonce: {}", s),
            ScriptError::Submission(s) => write!(f, "error submitting transaction: {}", s),
            ScriptError::Rpc(s) => write!(f, "rpc error: {}", s),
            ScriptError::Timeout(s) => write!(f, "timed out: {}", s),
            ScriptError::CodeCheck(s) => write!(f, "code check failed: {}", s),
            ScriptError::DeploymentReverted {
                contract,
                step,
                tx_hash,
            } => write!(
                f,
                "{} deployment reverted while {}: {:#x}",
                contract, step, tx_hash
            ),
            ScriptError::MissingEvent { contract, tx_hash } => write!(
                f,
                "Deployed event not found in {} proxy receipt logs: {:#x}",
                contract, tx_hash
            ),
            ScriptError::ProxyStep {
                contract,
                implementation,
                cause,
            } => write!(
                f,
                "deploy {} proxy (implementation {:#x} is deployed): {}",
                contract, implementation, cause
            ),
            ScriptError::Serde(s) => write!(f, "error de/serializing: {}", s),
        }
    }
}

impl Error for ScriptError {}
