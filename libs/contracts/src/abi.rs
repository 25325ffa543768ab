//! ABI definitions for the SimpleSwap pool and its tokens
//!
//! The pool exposes a Uniswap-V2-style router surface on a single fixed
//! pair and mints its own LP token, so the LP `balanceOf`/`totalSupply`
//! live on the pool ABI itself.

use ethabi::{Event, EventParam, ParamType};
use once_cell::sync::Lazy;
use web3::types::{H160, H256};

/// SimpleSwap pool ABI: reads, mutating calls, and the LP token surface.
pub const POOL_ABI: &str = r#"[
    {"constant":true,"inputs":[],"name":"tokenA","outputs":[{"name":"","type":"address"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"tokenB","outputs":[{"name":"","type":"address"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"getReserves","outputs":[{"name":"reserveA","type":"uint256"},{"name":"reserveB","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"tokenIn","type":"address"},{"name":"tokenOut","type":"address"}],"name":"getPrice","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"tokenIn","type":"address"},{"name":"tokenOut","type":"address"},{"name":"amountIn","type":"uint256"}],"name":"getAmountOut","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"account","type":"address"}],"name":"balanceOf","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"totalSupply","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":false,"inputs":[{"name":"amountIn","type":"uint256"},{"name":"amountOutMin","type":"uint256"},{"name":"path","type":"address[]"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"name":"swapExactTokensForTokens","outputs":[],"type":"function"},
    {"constant":false,"inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"},{"name":"amountADesired","type":"uint256"},{"name":"amountBDesired","type":"uint256"},{"name":"amountAMin","type":"uint256"},{"name":"amountBMin","type":"uint256"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"name":"addLiquidity","outputs":[],"type":"function"},
    {"constant":false,"inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"},{"name":"liquidity","type":"uint256"},{"name":"amountAMin","type":"uint256"},{"name":"amountBMin","type":"uint256"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"name":"removeLiquidity","outputs":[],"type":"function"}
]"#;

/// ERC-20 capability set the client consumes from the pair tokens.
pub const ERC20_ABI: &str = r#"[
    {"constant":false,"inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],"name":"approve","outputs":[{"name":"","type":"bool"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"owner","type":"address"},{"name":"spender","type":"address"}],"name":"allowance","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"account","type":"address"}],"name":"balanceOf","outputs":[{"name":"","type":"uint256"}],"type":"function"},
    {"constant":true,"inputs":[],"name":"totalSupply","outputs":[{"name":"","type":"uint256"}],"type":"function"}
]"#;

/// SimpleSwap TokenSwapped event ABI definition
/// event TokenSwapped(address indexed user, address inputToken, address outputToken, uint256 amountIn, uint256 amountOut)
pub fn token_swapped_event() -> Event {
    Event {
        name: "TokenSwapped".to_string(),
        inputs: vec![
            EventParam {
                name: "user".to_string(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "inputToken".to_string(),
                kind: ParamType::Address,
                indexed: false,
            },
            EventParam {
                name: "outputToken".to_string(),
                kind: ParamType::Address,
                indexed: false,
            },
            EventParam {
                name: "amountIn".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
            EventParam {
                name: "amountOut".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
        ],
        anonymous: false,
    }
}

/// SimpleSwap LiquidityAdded event ABI definition
/// event LiquidityAdded(address indexed provider, uint256 amountA, uint256 amountB, uint256 liquidity)
pub fn liquidity_added_event() -> Event {
    liquidity_event("LiquidityAdded")
}

/// SimpleSwap LiquidityRemoved event ABI definition
/// event LiquidityRemoved(address indexed provider, uint256 amountA, uint256 amountB, uint256 liquidity)
pub fn liquidity_removed_event() -> Event {
    liquidity_event("LiquidityRemoved")
}

fn liquidity_event(name: &str) -> Event {
    Event {
        name: name.to_string(),
        inputs: vec![
            EventParam {
                name: "provider".to_string(),
                kind: ParamType::Address,
                indexed: true,
            },
            EventParam {
                name: "amountA".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
            EventParam {
                name: "amountB".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
            EventParam {
                name: "liquidity".to_string(),
                kind: ParamType::Uint(256),
                indexed: false,
            },
        ],
        anonymous: false,
    }
}

/// Cached topic0 for TokenSwapped.
pub static TOKEN_SWAPPED_SIGNATURE: Lazy<H256> = Lazy::new(|| token_swapped_event().signature());

/// Cached topic0 for LiquidityAdded.
pub static LIQUIDITY_ADDED_SIGNATURE: Lazy<H256> =
    Lazy::new(|| liquidity_added_event().signature());

/// Cached topic0 for LiquidityRemoved.
pub static LIQUIDITY_REMOVED_SIGNATURE: Lazy<H256> =
    Lazy::new(|| liquidity_removed_event().signature());

/// Left-pad an address into the 32-byte topic form used for indexed
/// address filters.
pub fn address_topic(address: H160) -> H256 {
    let mut topic = H256::zero();
    topic.0[12..].copy_from_slice(address.as_bytes());
    topic
}
