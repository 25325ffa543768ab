//! SimpleSwap orchestration
//!
//! The glue between a UI layer and the on-chain pool: quoting, allowance
//! gating, transaction submission, post-action refresh, history
//! aggregation, and spot-price polling. One user action is one
//! sequential pipeline of remote round-trips; the only concurrency is
//! independent read fan-out. The contract remains the sole source of
//! truth — nothing here is persisted.
//!
//! Pipeline per mutating action:
//!
//! ```text
//! quote (read) -> allowance gate (conditional write) -> submit (write)
//!       -> refresh reserves/balances/share (concurrent reads)
//! ```

pub mod actions;
pub mod allowance;
pub mod error;
pub mod history;
pub mod price;

pub use actions::{
    ActionReceipt, PoolSnapshot, SwapClient, SwapDirection, SwapQuote, TxStatus,
};
pub use allowance::{ensure_allowance, TokenApprovals};
pub use error::ClientError;
pub use history::{HistoryAction, HistoryAggregator, HistoryEntry};
pub use price::{PricePoller, PriceSubscription};
