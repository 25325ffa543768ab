//! History aggregation
//!
//! Builds the unified activity feed from the pool's event logs: swaps,
//! deposits, and withdrawals attributable to one user over a block
//! range. The three log queries are independent and run concurrently,
//! each behind a client-side timeout. An event that fails to decode is
//! kept and tagged incomplete — observed events are never dropped.

use std::time::Duration;

use tracing::{debug, warn};
use web3::types::{Address, Log, H256, U64};
use web3::Transport;

use simpleswap_amm::{format_units, TOKEN_DECIMALS};
use simpleswap_config::HistoryConfig;
use simpleswap_contracts::{abi, LiquidityDetail, LiquidityEventDecoder, SwapDetail, SwapEventDecoder};
use simpleswap_contracts::PoolContract;

use crate::error::ClientError;

/// One feed entry. `block_number`/`log_index` define the feed order; a
/// `None` detail means the on-chain payload did not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tx_hash: H256,
    pub block_number: u64,
    pub log_index: u64,
    pub action: HistoryAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    Swap(Option<SwapDetail>),
    AddLiquidity(Option<LiquidityDetail>),
    RemoveLiquidity(Option<LiquidityDetail>),
}

impl HistoryEntry {
    /// Human-readable line for the feed, matching what the UI renders.
    pub fn detail(&self) -> String {
        match &self.action {
            HistoryAction::Swap(Some(d)) => format!(
                "Swap {} {} → {} {}",
                format_units(d.amount_in, TOKEN_DECIMALS),
                short_address(d.input_token),
                format_units(d.amount_out, TOKEN_DECIMALS),
                short_address(d.output_token),
            ),
            HistoryAction::Swap(None) => "Swap (incomplete data)".to_string(),
            HistoryAction::AddLiquidity(Some(d)) => format!(
                "Add {} A + {} B → LP {}",
                format_units(d.amount_a, TOKEN_DECIMALS),
                format_units(d.amount_b, TOKEN_DECIMALS),
                format_units(d.liquidity, TOKEN_DECIMALS),
            ),
            HistoryAction::AddLiquidity(None) => "Add Liquidity (incomplete data)".to_string(),
            HistoryAction::RemoveLiquidity(Some(d)) => format!(
                "Remove {} A + {} B ← LP {}",
                format_units(d.amount_a, TOKEN_DECIMALS),
                format_units(d.amount_b, TOKEN_DECIMALS),
                format_units(d.liquidity, TOKEN_DECIMALS),
            ),
            HistoryAction::RemoveLiquidity(None) => {
                "Remove Liquidity (incomplete data)".to_string()
            }
        }
    }
}

fn short_address(address: Address) -> String {
    let hex = hex::encode(address.as_bytes());
    format!("0x{}", &hex[..4])
}

/// Aggregates the three event feeds for one pool.
pub struct HistoryAggregator<T: Transport> {
    pool: PoolContract<T>,
    config: HistoryConfig,
}

impl<T> HistoryAggregator<T>
where
    T: Transport + Send + Sync,
    T::Out: Send,
{
    pub fn new(pool: PoolContract<T>, config: HistoryConfig) -> Self {
        Self { pool, config }
    }

    /// Lightweight feed over the default lookback window.
    pub async fn recent(&self, user: Address) -> Result<Vec<HistoryEntry>, ClientError> {
        self.lookback(user, self.config.default_lookback_blocks)
            .await
    }

    /// Full feed over the wide lookback window.
    pub async fn full(&self, user: Address) -> Result<Vec<HistoryEntry>, ClientError> {
        self.lookback(user, self.config.full_lookback_blocks).await
    }

    async fn lookback(
        &self,
        user: Address,
        blocks: u64,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        let latest = self.pool.latest_block().await?;
        let from = latest.saturating_sub(U64::from(blocks));
        self.aggregate(user, from, latest).await
    }

    /// Aggregate all three event kinds over an explicit inclusive range.
    /// An empty range yields an empty feed without touching the node.
    pub async fn aggregate(
        &self,
        user: Address,
        from_block: U64,
        to_block: U64,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        if from_block > to_block {
            debug!(%from_block, %to_block, "empty history range");
            return Ok(Vec::new());
        }

        let (swaps, adds, removes) = tokio::try_join!(
            self.query(*abi::TOKEN_SWAPPED_SIGNATURE, user, from_block, to_block),
            self.query(*abi::LIQUIDITY_ADDED_SIGNATURE, user, from_block, to_block),
            self.query(*abi::LIQUIDITY_REMOVED_SIGNATURE, user, from_block, to_block),
        )?;

        let mut entries: Vec<HistoryEntry> = swaps
            .iter()
            .map(normalize_swap)
            .chain(adds.iter().map(normalize_added))
            .chain(removes.iter().map(normalize_removed))
            .collect();

        sort_history(&mut entries);
        Ok(entries)
    }

    async fn query(
        &self,
        signature: H256,
        user: Address,
        from_block: U64,
        to_block: U64,
    ) -> Result<Vec<Log>, ClientError> {
        let timeout = Duration::from_millis(self.config.query_timeout_ms);
        match tokio::time::timeout(
            timeout,
            self.pool.query_logs(signature, user, from_block, to_block),
        )
        .await
        {
            Ok(logs) => Ok(logs?),
            Err(_) => Err(ClientError::HistoryTimeout(self.config.query_timeout_ms)),
        }
    }
}

/// Most recent first; same-block entries in reverse emission order.
pub fn sort_history(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| {
        b.block_number
            .cmp(&a.block_number)
            .then_with(|| b.log_index.cmp(&a.log_index))
    });
}

fn normalize_swap(log: &Log) -> HistoryEntry {
    let detail = match SwapEventDecoder::decode(log) {
        Ok(detail) => Some(detail),
        Err(e) => {
            warn!(tx_hash = ?log.transaction_hash, "swap event kept with incomplete data: {e}");
            None
        }
    };
    entry_from_log(log, HistoryAction::Swap(detail))
}

fn normalize_added(log: &Log) -> HistoryEntry {
    let detail = match LiquidityEventDecoder::decode_added(log) {
        Ok(detail) => Some(detail),
        Err(e) => {
            warn!(tx_hash = ?log.transaction_hash, "deposit event kept with incomplete data: {e}");
            None
        }
    };
    entry_from_log(log, HistoryAction::AddLiquidity(detail))
}

fn normalize_removed(log: &Log) -> HistoryEntry {
    let detail = match LiquidityEventDecoder::decode_removed(log) {
        Ok(detail) => Some(detail),
        Err(e) => {
            warn!(tx_hash = ?log.transaction_hash, "withdrawal event kept with incomplete data: {e}");
            None
        }
    };
    entry_from_log(log, HistoryAction::RemoveLiquidity(detail))
}

fn entry_from_log(log: &Log, action: HistoryAction) -> HistoryEntry {
    HistoryEntry {
        tx_hash: log.transaction_hash.unwrap_or_default(),
        block_number: log.block_number.map(|b| b.as_u64()).unwrap_or_default(),
        log_index: log.log_index.map(|i| i.low_u64()).unwrap_or_default(),
        action,
    }
}
