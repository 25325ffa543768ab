//! Typed bindings for the SimpleSwap pool contract
//!
//! The pool is a fixed two-token constant-product AMM that doubles as its
//! own LP token. This crate owns the ABI definitions, thin typed wrappers
//! over `web3::contract::Contract` for every capability the client
//! consumes, and decoders for the three event kinds the history feed is
//! built from. No orchestration logic lives here — callers sequence the
//! calls.

pub mod abi;
pub mod erc20;
pub mod error;
pub mod events;
pub mod pool;

pub use erc20::Erc20Token;
pub use error::ContractError;
pub use events::{
    DecodingError, LiquidityDetail, LiquidityEventDecoder, SwapDetail, SwapEventDecoder,
};
pub use pool::PoolContract;
