//! Liquidity deposit quoting with slippage bounds
//!
//! Reproduces the deposit-ratio rule the pool enforces on chain: never
//! propose spending more than the caller declared as desired on either
//! token, and scale the cheaper side to the live reserve ratio.

use ethereum_types::{U256, U512};
use thiserror::Error;
use tracing::debug;

/// Errors from quote arithmetic. All variants mean the caller's inputs
/// were rejected before any value was computed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    #[error("deposit amounts must be positive")]
    ZeroAmount,

    #[error("slippage tolerance {0}% is not below 100%")]
    InvalidTolerance(u32),

    #[error("pool has one empty reserve; ratio is undefined")]
    InvalidReserves,

    #[error("value overflow: result exceeds 256 bits")]
    Overflow,
}

/// A deposit quote: the amounts to submit and the slippage-floored
/// minimums the contract may not go below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityQuote {
    pub amount_a: U256,
    pub amount_b: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
}

/// Quote a two-sided liquidity deposit against current reserves.
///
/// * Empty pool (both reserves zero): the desired amounts are used as-is,
///   since no ratio constraint exists yet.
/// * Otherwise the side that would exceed the caller's desired amount is
///   scaled down to match the reserve ratio, truncating.
///
/// Guarantees `amount_x_min <= amount_x <= desired_x` on both sides.
pub fn quote_add_liquidity(
    reserve_a: U256,
    reserve_b: U256,
    desired_a: U256,
    desired_b: U256,
    tolerance_pct: u32,
) -> Result<LiquidityQuote, MathError> {
    if desired_a.is_zero() || desired_b.is_zero() {
        return Err(MathError::ZeroAmount);
    }
    if tolerance_pct >= 100 {
        return Err(MathError::InvalidTolerance(tolerance_pct));
    }

    let (amount_a, amount_b) = if reserve_a.is_zero() && reserve_b.is_zero() {
        // First liquidity provider bootstraps the ratio.
        (desired_a, desired_b)
    } else if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(MathError::InvalidReserves);
    } else {
        let optimal_b = mul_div(desired_a, reserve_b, reserve_a)?;
        if optimal_b <= desired_b {
            debug!(%desired_a, %optimal_b, "quoting deposit pinned to token A");
            (desired_a, optimal_b)
        } else {
            let optimal_a = mul_div(desired_b, reserve_a, reserve_b)?;
            debug!(%optimal_a, %desired_b, "quoting deposit pinned to token B");
            (optimal_a, desired_b)
        }
    };

    Ok(LiquidityQuote {
        amount_a,
        amount_b,
        amount_a_min: slippage_floor(amount_a, tolerance_pct)?,
        amount_b_min: slippage_floor(amount_b, tolerance_pct)?,
    })
}

/// Floor an amount by a percentage tolerance: `amount * (100 - pct) / 100`,
/// truncating. Also applied to quoted swap outputs before submission.
pub fn slippage_floor(amount: U256, tolerance_pct: u32) -> Result<U256, MathError> {
    if tolerance_pct >= 100 {
        return Err(MathError::InvalidTolerance(tolerance_pct));
    }
    mul_div(amount, U256::from(100 - tolerance_pct), U256::from(100))
}

/// Pool share in basis points: `balance * 10_000 / supply`, 0 for an
/// empty pool. Saturates at `u64::MAX`, which a sane LP supply never
/// approaches.
pub fn pool_share_bps(balance: U256, total_supply: U256) -> u64 {
    if total_supply.is_zero() {
        return 0;
    }
    let share = balance.full_mul(U256::from(10_000u64)) / U512::from(total_supply);
    if share > U512::from(u64::MAX) {
        u64::MAX
    } else {
        share.low_u64()
    }
}

/// `a * b / denom` with a 512-bit intermediate product, truncating.
fn mul_div(a: U256, b: U256, denom: U256) -> Result<U256, MathError> {
    let quotient = a.full_mul(b) / U512::from(denom);
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_empty_pool_uses_desired_amounts_exactly() {
        let quote = quote_add_liquidity(u(0), u(0), u(100), u(300), 1).unwrap();
        assert_eq!(quote.amount_a, u(100));
        assert_eq!(quote.amount_b, u(300));
        assert_eq!(quote.amount_a_min, u(99));
        assert_eq!(quote.amount_b_min, u(297));
    }

    #[test]
    fn test_scales_b_down_when_optimal_b_fits() {
        // reserves 1000:2000, desired (100, 300) -> optimal B = 200 <= 300
        let quote = quote_add_liquidity(u(1000), u(2000), u(100), u(300), 1).unwrap();
        assert_eq!(quote.amount_a, u(100));
        assert_eq!(quote.amount_b, u(200));
        assert_eq!(quote.amount_a_min, u(99));
        assert_eq!(quote.amount_b_min, u(198));
    }

    #[test]
    fn test_scales_a_down_when_optimal_b_exceeds_desired() {
        // reserves 1000:2000, desired (100, 150) -> optimal B = 200 > 150,
        // so A is scaled to 150 * 1000 / 2000 = 75
        let quote = quote_add_liquidity(u(1000), u(2000), u(100), u(150), 1).unwrap();
        assert_eq!(quote.amount_a, u(75));
        assert_eq!(quote.amount_b, u(150));
    }

    #[test]
    fn test_never_exceeds_desired_on_either_side() {
        for (ra, rb, da, db) in [
            (1000u64, 2000u64, 100u64, 300u64),
            (2000, 1000, 300, 100),
            (333, 777, 10, 10),
            (1, 1_000_000, 5, 5),
        ] {
            let quote = quote_add_liquidity(u(ra), u(rb), u(da), u(db), 1).unwrap();
            assert!(quote.amount_a <= u(da));
            assert!(quote.amount_b <= u(db));
            assert!(quote.amount_a_min <= quote.amount_a);
            assert!(quote.amount_b_min <= quote.amount_b);
        }
    }

    #[test]
    fn test_accepted_amounts_match_reserve_ratio_within_one_unit() {
        let (ra, rb) = (u(1000), u(2000));
        let quote = quote_add_liquidity(ra, rb, u(100), u(300), 1).unwrap();
        // amount_a * reserve_b == amount_b * reserve_a, modulo truncation
        let lhs = quote.amount_a.full_mul(rb);
        let rhs = quote.amount_b.full_mul(ra);
        let diff = if lhs > rhs { lhs - rhs } else { rhs - lhs };
        assert!(diff <= U512::from(ra.max(rb)));
    }

    #[test]
    fn test_zero_desired_amount_rejected() {
        assert_eq!(
            quote_add_liquidity(u(1000), u(2000), u(0), u(300), 1),
            Err(MathError::ZeroAmount)
        );
        assert_eq!(
            quote_add_liquidity(u(1000), u(2000), u(100), u(0), 1),
            Err(MathError::ZeroAmount)
        );
    }

    #[test]
    fn test_tolerance_must_be_below_one_hundred() {
        assert_eq!(
            quote_add_liquidity(u(1000), u(2000), u(100), u(300), 100),
            Err(MathError::InvalidTolerance(100))
        );
        assert_eq!(slippage_floor(u(100), 250), Err(MathError::InvalidTolerance(250)));
    }

    #[test]
    fn test_one_sided_reserves_rejected() {
        assert_eq!(
            quote_add_liquidity(u(0), u(2000), u(100), u(300), 1),
            Err(MathError::InvalidReserves)
        );
    }

    #[test]
    fn test_slippage_floor_truncates() {
        assert_eq!(slippage_floor(u(100), 1).unwrap(), u(99));
        assert_eq!(slippage_floor(u(199), 1).unwrap(), u(197)); // floor(199 * 99 / 100)
        assert_eq!(slippage_floor(u(100), 0).unwrap(), u(100));
        assert_eq!(slippage_floor(U256::zero(), 1).unwrap(), U256::zero());
    }

    #[test]
    fn test_ratio_products_do_not_overflow_u256() {
        // Amounts near the top of the 256-bit range still quote cleanly
        // because the intermediate product is 512 bits wide.
        let huge = U256::MAX / U256::from(2u64);
        let quote = quote_add_liquidity(huge, huge, huge, huge, 1).unwrap();
        assert_eq!(quote.amount_a, huge);
        assert_eq!(quote.amount_b, huge);
    }

    #[test]
    fn test_pool_share_bps() {
        assert_eq!(pool_share_bps(u(0), u(0)), 0);
        assert_eq!(pool_share_bps(u(50), u(0)), 0);
        assert_eq!(pool_share_bps(u(1), u(4)), 2_500);
        assert_eq!(pool_share_bps(u(523), u(10_000)), 523);
        assert_eq!(pool_share_bps(u(10_000), u(10_000)), 10_000);
    }
}
