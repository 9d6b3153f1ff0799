//! Polling for transaction receipts under a deadline

use alloy_primitives::TxHash;
use tokio::time::{sleep_until, timeout_at, Duration, Instant};
use tracing::{debug, warn};

use crate::{
    chain::{ChainRpc, Receipt},
    constants::RECEIPT_POLL_INTERVAL,
    errors::ScriptError,
};

/// Polls a chain for receipts at a fixed interval
pub struct ReceiptConfirmer<'a, C> {
    /// The chain to poll
    chain: &'a C,
    /// The interval between polls
    interval: Duration,
}

impl<'a, C: ChainRpc> ReceiptConfirmer<'a, C> {
    /// Create a confirmer polling at [`RECEIPT_POLL_INTERVAL`]
    pub fn new(chain: &'a C) -> Self {
        Self::with_interval(chain, RECEIPT_POLL_INTERVAL)
    }

    /// Create a confirmer polling at the given interval
    pub fn with_interval(chain: &'a C, interval: Duration) -> Self {
        Self { chain, interval }
    }

    /// Wait until the receipt of `tx_hash` is available, or until `deadline`.
    ///
    /// A receipt is returned whatever its status; judging success is up to the caller.
    /// Errors from individual polls are not fatal, the last one is reported on timeout.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        deadline: Instant,
    ) -> Result<Receipt, ScriptError> {
        let mut last_error: Option<ScriptError> = None;
        let mut polls = 0u64;

        loop {
            if Instant::now() >= deadline {
                return Err(receipt_timeout(tx_hash, polls, last_error));
            }

            polls += 1;
            let Ok(result) = timeout_at(deadline, self.chain.transaction_receipt(tx_hash)).await
            else {
                return Err(receipt_timeout(tx_hash, polls, last_error));
            };

            match result {
                Ok(Some(receipt)) => {
                    debug!(tx_hash = %tx_hash, success = receipt.success, polls, "got receipt");
                    return Ok(receipt);
                }
                Ok(None) => debug!(tx_hash = %tx_hash, polls, "receipt not yet available"),
                Err(e) => {
                    warn!(tx_hash = %tx_hash, error = %e, "receipt poll failed");
                    last_error = Some(e);
                }
            }

            sleep_until(deadline.min(Instant::now() + self.interval)).await;
        }
    }
}

/// The error of a wait that ran out of time
fn receipt_timeout(tx_hash: TxHash, polls: u64, last_error: Option<ScriptError>) -> ScriptError {
    let mut msg = format!("receipt of {tx_hash:#x} after {polls} polls");
    if let Some(e) = last_error {
        msg.push_str(&format!(", last error: {e}"));
    }
    ScriptError::Timeout(msg)
}
