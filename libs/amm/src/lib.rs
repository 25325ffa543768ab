//! Quoting mathematics for the SimpleSwap client
//!
//! Pure, deterministic arithmetic used before any transaction is built:
//! optimal deposit ratios, slippage floors, and pool-share calculation.
//! Everything here mirrors the contract's own integer math — truncating
//! division on 256-bit quantities, widened through 512 bits so ratio
//! products cannot overflow. No network access, no side effects.
//!
//! The constant-product swap pricing itself is NOT reimplemented here;
//! the pool contract exposes `getAmountOut`/`getPrice` reads and the
//! client passes those through untouched.

pub mod liquidity;
pub mod units;

pub use liquidity::{pool_share_bps, quote_add_liquidity, slippage_floor, LiquidityQuote, MathError};
pub use units::{format_units, parse_units, UnitsError, TOKEN_DECIMALS};

pub use ethereum_types::U256;
