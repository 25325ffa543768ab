//! Allowance gate
//!
//! Before any transfer-consuming call, the spender's allowance on the
//! moving token must cover the pending amount. The gate reads the
//! current allowance and raises it only when short — approving exactly
//! the required amount, never unlimited — and blocks until the approval
//! is mined. Approval errors propagate unmodified; there is no retry.
//!
//! There is NO atomicity across the approve + consume pair. If the
//! consuming call fails after a successful approval, the allowance stays
//! raised and no funds have moved; that residual state is accepted.

use async_trait::async_trait;
use tracing::{debug, info};
use web3::types::{Address, TransactionReceipt, U256};
use web3::Transport;

use simpleswap_contracts::{ContractError, Erc20Token};

use crate::error::ClientError;

/// The token capability the gate needs. A trait seam so the gate's
/// zero-transaction idempotence is testable without a node.
#[async_trait]
pub trait TokenApprovals {
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ContractError>;

    async fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TransactionReceipt, ContractError>;
}

#[async_trait]
impl<T> TokenApprovals for Erc20Token<T>
where
    T: Transport + Send + Sync,
    T::Out: Send,
{
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ContractError> {
        Erc20Token::allowance(self, owner, spender).await
    }

    async fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TransactionReceipt, ContractError> {
        Erc20Token::approve(self, owner, spender, amount).await
    }
}

/// Ensure `spender` may move `required` of the token out of `owner`.
///
/// Returns `None` when the existing allowance already covers the amount
/// (no transaction issued), otherwise the mined approval receipt.
pub async fn ensure_allowance<A>(
    token: &A,
    owner: Address,
    spender: Address,
    required: U256,
) -> Result<Option<TransactionReceipt>, ClientError>
where
    A: TokenApprovals + ?Sized,
{
    let current = token.allowance(owner, spender).await?;
    if current >= required {
        debug!(%current, %required, "allowance already sufficient");
        return Ok(None);
    }

    info!(%current, %required, "raising allowance");
    let receipt = token.approve(owner, spender, required).await?;
    Ok(Some(receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use web3::types::H160;

    /// In-memory token that counts approvals.
    struct MockToken {
        allowance: std::sync::Mutex<U256>,
        approvals: AtomicUsize,
    }

    impl MockToken {
        fn with_allowance(amount: u64) -> Self {
            Self {
                allowance: std::sync::Mutex::new(U256::from(amount)),
                approvals: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenApprovals for MockToken {
        async fn allowance(&self, _: Address, _: Address) -> Result<U256, ContractError> {
            Ok(*self.allowance.lock().unwrap())
        }

        async fn approve(
            &self,
            _: Address,
            _: Address,
            amount: U256,
        ) -> Result<TransactionReceipt, ContractError> {
            self.approvals.fetch_add(1, Ordering::SeqCst);
            *self.allowance.lock().unwrap() = amount;
            Ok(TransactionReceipt::default())
        }
    }

    fn addr(n: u64) -> Address {
        H160::from_low_u64_be(n)
    }

    #[tokio::test]
    async fn test_sufficient_allowance_issues_no_transaction() {
        let token = MockToken::with_allowance(100);

        let receipt = ensure_allowance(&token, addr(1), addr(2), U256::from(100u64))
            .await
            .unwrap();

        assert!(receipt.is_none());
        assert_eq!(token.approvals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_allowance_issues_exactly_one_approval() {
        let token = MockToken::with_allowance(50);

        let receipt = ensure_allowance(&token, addr(1), addr(2), U256::from(100u64))
            .await
            .unwrap();

        assert!(receipt.is_some());
        assert_eq!(token.approvals.load(Ordering::SeqCst), 1);
        // Approved exactly the required amount, not unlimited.
        assert_eq!(*token.allowance.lock().unwrap(), U256::from(100u64));
    }

    #[tokio::test]
    async fn test_repeated_calls_are_idempotent_after_success() {
        let token = MockToken::with_allowance(50);

        ensure_allowance(&token, addr(1), addr(2), U256::from(100u64))
            .await
            .unwrap();
        let second = ensure_allowance(&token, addr(1), addr(2), U256::from(100u64))
            .await
            .unwrap();
        let smaller = ensure_allowance(&token, addr(1), addr(2), U256::from(80u64))
            .await
            .unwrap();

        assert!(second.is_none());
        assert!(smaller.is_none());
        assert_eq!(token.approvals.load(Ordering::SeqCst), 1);
    }
}
