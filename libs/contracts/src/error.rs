//! Error types for contract interaction

use thiserror::Error;
use web3::types::TransactionReceipt;

#[derive(Debug, Error)]
pub enum ContractError {
    /// Transport/RPC failure, including errors raised while a mutating
    /// call was being submitted or confirmed
    #[error("transport error: {0}")]
    Transport(#[from] web3::Error),

    /// Read call failure (encoding, RPC, or output decoding)
    #[error("contract call failed: {0}")]
    Call(#[from] web3::contract::Error),

    /// ABI definition failed to load
    #[error("invalid ABI definition: {0}")]
    Abi(#[from] ethabi::Error),

    /// Transaction was mined but the receipt reports failure
    #[error("transaction {tx_hash:?} reverted on chain")]
    Reverted { tx_hash: web3::types::H256 },
}

impl ContractError {
    /// The revert reason the node attached to an RPC error, when present.
    /// Wallet rejections and reverts both surface through this path.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            ContractError::Transport(web3::Error::Rpc(e)) => Some(e.message.as_str()),
            ContractError::Call(web3::contract::Error::Api(web3::Error::Rpc(e))) => {
                Some(e.message.as_str())
            }
            _ => None,
        }
    }
}

/// Reject receipts whose status field reports failure. Mutating calls are
/// only considered complete once this check passes.
pub(crate) fn ensure_succeeded(
    receipt: TransactionReceipt,
) -> Result<TransactionReceipt, ContractError> {
    match receipt.status {
        Some(status) if status.is_zero() => Err(ContractError::Reverted {
            tx_hash: receipt.transaction_hash,
        }),
        _ => Ok(receipt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web3::types::{H256, U64};

    #[test]
    fn test_ensure_succeeded_passes_status_one() {
        let receipt = TransactionReceipt {
            status: Some(U64::one()),
            ..Default::default()
        };
        assert!(ensure_succeeded(receipt).is_ok());
    }

    #[test]
    fn test_ensure_succeeded_rejects_status_zero() {
        let receipt = TransactionReceipt {
            transaction_hash: H256::from_low_u64_be(7),
            status: Some(U64::zero()),
            ..Default::default()
        };
        match ensure_succeeded(receipt) {
            Err(ContractError::Reverted { tx_hash }) => {
                assert_eq!(tx_hash, H256::from_low_u64_be(7));
            }
            other => panic!("expected Reverted, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_status_is_accepted() {
        // Pre-Byzantium receipts carry no status field; treat as success.
        let receipt = TransactionReceipt::default();
        assert!(ensure_succeeded(receipt).is_ok());
    }
}
