//! Swap and liquidity pipelines
//!
//! Each user action runs as one sequential chain of remote round-trips:
//! pre-flight checks, a fresh quote, the allowance gate, the mutating
//! call awaited to a mined receipt, then a concurrent refresh of
//! everything the UI renders. A single in-flight flag serializes
//! mutating actions — the signer session is shared and two outstanding
//! transactions would race on the nonce.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;
use tracing::{debug, info};
use web3::types::{Address, H256, U256, U64};
use web3::{Transport, Web3};

use simpleswap_amm::{pool_share_bps, quote_add_liquidity, slippage_floor, LiquidityQuote};
use simpleswap_config::ClientConfig;
use simpleswap_contracts::{Erc20Token, PoolContract};

use crate::allowance::ensure_allowance;
use crate::error::ClientError;
use crate::history::HistoryAggregator;
use crate::price::{PricePoller, PriceSubscription};

/// Which token the user is spending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    AToB,
    BToA,
}

/// Where the last mutating action stands, for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Idle,
    Pending { action: &'static str },
    Confirmed { tx_hash: H256, gas_used: Option<U256> },
    Failed { reason: String },
}

/// Swap preview: the contract's output quote plus the slippage floor
/// that will be submitted as the minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_in: U256,
    pub amount_out: U256,
    pub amount_out_min: U256,
}

/// Everything the dashboard renders, fetched in one concurrent sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub balance_a: U256,
    pub balance_b: U256,
    pub lp_balance: U256,
    pub total_supply: U256,
    pub share_bps: u64,
}

/// Outcome of a confirmed mutating action.
#[derive(Debug, Clone)]
pub struct ActionReceipt {
    pub tx_hash: H256,
    pub block_number: Option<U64>,
    pub gas_used: Option<U256>,
    pub snapshot: PoolSnapshot,
}

/// Orchestrator for one user + one pool. All handles are explicit; there
/// is no ambient global state.
pub struct SwapClient<T: Transport> {
    pool: PoolContract<T>,
    token_a: Erc20Token<T>,
    token_b: Erc20Token<T>,
    user: Address,
    config: ClientConfig,
    status: Arc<RwLock<TxStatus>>,
    in_flight: Arc<AtomicBool>,
}

impl<T> SwapClient<T>
where
    T: Transport + Send + Sync,
    T::Out: Send,
{
    /// Resolve the pair tokens from the pool and build token handles.
    /// The first failing read here means the provider is unreachable and
    /// the client is not constructed.
    pub async fn connect(
        web3: Web3<T>,
        config: ClientConfig,
        user: Address,
    ) -> Result<Self, ClientError> {
        let pool_address: Address = config
            .pool_address
            .parse()
            .map_err(|_| ClientError::Config(format!("bad pool address {}", config.pool_address)))?;

        let pool = PoolContract::new(web3.clone(), pool_address)?;
        let token_a = Erc20Token::new(&web3, pool.token_a().await?)?;
        let token_b = Erc20Token::new(&web3, pool.token_b().await?)?;

        info!(
            pool = ?pool_address,
            token_a = ?token_a.address(),
            token_b = ?token_b.address(),
            "connected to pool"
        );

        Ok(Self {
            pool,
            token_a,
            token_b,
            user,
            config,
            status: Arc::new(RwLock::new(TxStatus::Idle)),
            in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn user(&self) -> Address {
        self.user
    }

    pub fn token_a_address(&self) -> Address {
        self.token_a.address()
    }

    pub fn token_b_address(&self) -> Address {
        self.token_b.address()
    }

    /// Status of the most recent mutating action.
    pub async fn tx_status(&self) -> TxStatus {
        self.status.read().await.clone()
    }

    /// History feed over this pool for the connected user.
    pub fn history(&self) -> HistoryAggregator<T> {
        HistoryAggregator::new(self.pool.clone(), self.config.history.clone())
    }

    /// Spot price passthrough for the given direction.
    pub async fn spot_price(&self, direction: SwapDirection) -> Result<U256, ClientError> {
        let (token_in, token_out) = self.direction_addresses(direction);
        Ok(self.pool.get_price(token_in, token_out).await?)
    }

    /// Swap output preview. The output amount comes straight from the
    /// contract's constant-product read; only the floor is computed here.
    pub async fn quote_swap(
        &self,
        direction: SwapDirection,
        amount_in: U256,
    ) -> Result<SwapQuote, ClientError> {
        if amount_in.is_zero() {
            return Err(ClientError::Quote(simpleswap_amm::MathError::ZeroAmount));
        }
        let (token_in, token_out) = self.direction_addresses(direction);
        let amount_out = self.pool.get_amount_out(token_in, token_out, amount_in).await?;
        let amount_out_min = slippage_floor(amount_out, self.config.trade.slippage_pct)?;
        Ok(SwapQuote {
            amount_in,
            amount_out,
            amount_out_min,
        })
    }

    /// Deposit preview against reserves read fresh for this call.
    pub async fn quote_deposit(
        &self,
        desired_a: U256,
        desired_b: U256,
    ) -> Result<LiquidityQuote, ClientError> {
        let (reserve_a, reserve_b) = self.pool.get_reserves().await?;
        Ok(quote_add_liquidity(
            reserve_a,
            reserve_b,
            desired_a,
            desired_b,
            self.config.trade.slippage_pct,
        )?)
    }

    /// Swap an exact input amount for the other token.
    pub async fn swap(
        &self,
        direction: SwapDirection,
        amount_in: U256,
    ) -> Result<ActionReceipt, ClientError> {
        let _guard = self.begin_action()?;

        let (token_in, token_label) = match direction {
            SwapDirection::AToB => (&self.token_a, "token A"),
            SwapDirection::BToA => (&self.token_b, "token B"),
        };
        let (in_addr, out_addr) = self.direction_addresses(direction);

        // Pre-flight: reject before anything touches the chain.
        let available = token_in.balance_of(self.user).await?;
        if available < amount_in {
            return Err(ClientError::InsufficientBalance {
                token: token_label,
                required: amount_in,
                available,
            });
        }

        let quote = self.quote_swap(direction, amount_in).await?;
        self.set_status(TxStatus::Pending { action: "swap" }).await;

        if let Err(e) = ensure_allowance(token_in, self.user, self.pool.address(), amount_in).await
        {
            return Err(self.fail(e).await);
        }

        let deadline = self.deadline(self.config.trade.swap_deadline_secs);
        let receipt = match self
            .pool
            .swap_exact_tokens_for_tokens(
                self.user,
                amount_in,
                quote.amount_out_min,
                vec![in_addr, out_addr],
                self.user,
                deadline,
                U256::from(self.config.trade.gas_limit),
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(ClientError::rejection(e)).await),
        };

        self.confirm("swap", receipt).await
    }

    /// Deposit liquidity at the pool's current ratio.
    pub async fn add_liquidity(
        &self,
        desired_a: U256,
        desired_b: U256,
    ) -> Result<ActionReceipt, ClientError> {
        let _guard = self.begin_action()?;

        // Pre-flight both balances; independent reads, no ordering needed.
        let (balance_a, balance_b) = tokio::try_join!(
            self.token_a.balance_of(self.user),
            self.token_b.balance_of(self.user),
        )?;
        if balance_a < desired_a {
            return Err(ClientError::InsufficientBalance {
                token: "token A",
                required: desired_a,
                available: balance_a,
            });
        }
        if balance_b < desired_b {
            return Err(ClientError::InsufficientBalance {
                token: "token B",
                required: desired_b,
                available: balance_b,
            });
        }

        // Reserves are read inside the quote, fresh for this action.
        let quote = self.quote_deposit(desired_a, desired_b).await?;
        self.set_status(TxStatus::Pending { action: "add liquidity" })
            .await;

        // Gate both tokens, in sequence, before the consuming call.
        let spender = self.pool.address();
        if let Err(e) =
            ensure_allowance(&self.token_a, self.user, spender, quote.amount_a).await
        {
            return Err(self.fail(e).await);
        }
        if let Err(e) =
            ensure_allowance(&self.token_b, self.user, spender, quote.amount_b).await
        {
            return Err(self.fail(e).await);
        }

        let deadline = self.deadline(self.config.trade.liquidity_deadline_secs);
        let receipt = match self
            .pool
            .add_liquidity(
                self.user,
                self.token_a.address(),
                self.token_b.address(),
                quote.amount_a,
                quote.amount_b,
                quote.amount_a_min,
                quote.amount_b_min,
                self.user,
                deadline,
                U256::from(self.config.trade.gas_limit),
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(ClientError::rejection(e)).await),
        };

        self.confirm("add liquidity", receipt).await
    }

    /// Burn LP tokens and withdraw both sides. Minimums are submitted as
    /// zero; the burn itself needs no allowance because the pool owns
    /// its LP token.
    pub async fn remove_liquidity(&self, liquidity: U256) -> Result<ActionReceipt, ClientError> {
        let _guard = self.begin_action()?;

        let lp_balance = self.pool.lp_balance_of(self.user).await?;
        if lp_balance < liquidity {
            return Err(ClientError::InsufficientBalance {
                token: "LP",
                required: liquidity,
                available: lp_balance,
            });
        }

        self.set_status(TxStatus::Pending { action: "remove liquidity" })
            .await;

        let deadline = self.deadline(self.config.trade.liquidity_deadline_secs);
        let receipt = match self
            .pool
            .remove_liquidity(
                self.user,
                self.token_a.address(),
                self.token_b.address(),
                liquidity,
                U256::zero(),
                U256::zero(),
                self.user,
                deadline,
                U256::from(self.config.trade.gas_limit),
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(ClientError::rejection(e)).await),
        };

        self.confirm("remove liquidity", receipt).await
    }

    /// Re-read everything the UI renders. The five reads are independent
    /// and run concurrently; all must settle before the snapshot exists.
    pub async fn refresh(&self) -> Result<PoolSnapshot, ClientError> {
        let (reserves, balance_a, balance_b, lp_balance, total_supply) = tokio::try_join!(
            self.pool.get_reserves(),
            self.token_a.balance_of(self.user),
            self.token_b.balance_of(self.user),
            self.pool.lp_balance_of(self.user),
            self.pool.total_supply(),
        )?;

        Ok(PoolSnapshot {
            reserve_a: reserves.0,
            reserve_b: reserves.1,
            balance_a,
            balance_b,
            lp_balance,
            total_supply,
            share_bps: pool_share_bps(lp_balance, total_supply),
        })
    }

    /// Spot-price polling task for the given direction. Dropping the
    /// returned subscription stops the task.
    pub fn price_feed(&self, direction: SwapDirection) -> PriceSubscription
    where
        T: Clone + 'static,
    {
        let (token_in, token_out) = self.direction_addresses(direction);
        PricePoller::spawn(
            self.pool.clone(),
            token_in,
            token_out,
            self.config.price_poll_interval(),
        )
    }

    fn direction_addresses(&self, direction: SwapDirection) -> (Address, Address) {
        match direction {
            SwapDirection::AToB => (self.token_a.address(), self.token_b.address()),
            SwapDirection::BToA => (self.token_b.address(), self.token_a.address()),
        }
    }

    /// Absolute unix deadline the contract will enforce.
    fn deadline(&self, offset_secs: u64) -> U256 {
        let now = SystemTime::UNIX_EPOCH
            .elapsed()
            .unwrap_or_default()
            .as_secs();
        U256::from(now + offset_secs)
    }

    /// Claim the single in-flight slot or refuse the action.
    fn begin_action(&self) -> Result<InFlightGuard, ClientError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::ActionInFlight);
        }
        Ok(InFlightGuard(Arc::clone(&self.in_flight)))
    }

    async fn set_status(&self, status: TxStatus) {
        *self.status.write().await = status;
    }

    async fn fail(&self, err: ClientError) -> ClientError {
        self.set_status(TxStatus::Failed {
            reason: err.to_string(),
        })
        .await;
        err
    }

    async fn confirm(
        &self,
        action: &'static str,
        receipt: web3::types::TransactionReceipt,
    ) -> Result<ActionReceipt, ClientError> {
        self.set_status(TxStatus::Confirmed {
            tx_hash: receipt.transaction_hash,
            gas_used: receipt.gas_used,
        })
        .await;
        info!(
            action,
            tx_hash = ?receipt.transaction_hash,
            gas_used = ?receipt.gas_used,
            "action confirmed"
        );

        // The transaction is on chain regardless of how the refresh
        // goes; a failed refresh surfaces as an error without touching
        // the confirmed status.
        debug!("refreshing pool state after {action}");
        let snapshot = self.refresh().await?;

        Ok(ActionReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            snapshot,
        })
    }
}

/// Releases the in-flight slot when an action pipeline ends, normally or
/// by early return.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_guard_excludes_and_releases() {
        let flag = Arc::new(AtomicBool::new(false));

        assert!(flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok());
        let guard = InFlightGuard(Arc::clone(&flag));

        // Second claim while the first is alive must fail.
        assert!(flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok());
    }
}
