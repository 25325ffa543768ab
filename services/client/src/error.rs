//! Error taxonomy for the orchestration layer
//!
//! Every failure surfaces to the caller; nothing is retried and nothing
//! is swallowed. The one tolerated degradation is per-event malformed
//! data inside the history aggregator, which becomes an
//! incomplete-data entry instead of an error.

use simpleswap_amm::MathError;
use simpleswap_contracts::ContractError;
use thiserror::Error;
use web3::types::U256;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Provider/transport failure or a read call that could not complete.
    /// Surfaced immediately; the action is aborted with no partial state.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Pre-flight balance check failed; zero on-chain calls were made
    #[error("insufficient {token} balance: need {required}, have {available}")]
    InsufficientBalance {
        token: &'static str,
        required: U256,
        available: U256,
    },

    /// Quote arithmetic rejected the inputs
    #[error("quote failed: {0}")]
    Quote(#[from] MathError),

    /// The signer rejected the transaction or the contract reverted it.
    /// Carries the node's revert reason when one was surfaced.
    #[error("transaction rejected: {reason}")]
    Rejected { reason: String },

    /// A mutating action was started while another was still in flight
    #[error("another action is already in flight")]
    ActionInFlight,

    /// An event-log query exceeded the client-side timeout
    #[error("event log query timed out after {0} ms")]
    HistoryTimeout(u64),

    /// Configuration could not be applied (bad address, missing token)
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a failed mutating call: reverts and signer rejections
    /// become [`ClientError::Rejected`] with the best reason available,
    /// everything else passes through as a contract error.
    pub(crate) fn rejection(err: ContractError) -> Self {
        if let Some(reason) = err.revert_reason() {
            return ClientError::Rejected {
                reason: reason.to_string(),
            };
        }
        match err {
            ContractError::Reverted { .. } => ClientError::Rejected {
                reason: err.to_string(),
            },
            other => ClientError::Contract(other),
        }
    }
}
