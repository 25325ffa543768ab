//! Fixed-point token amount parsing and formatting
//!
//! Both pool tokens and the LP token carry 18 decimal places. User input
//! arrives as decimal strings ("1.5") and every displayed amount goes
//! back out the same way; on the wire everything is a raw U256.

use ethereum_types::U256;
use thiserror::Error;

/// Decimal places used by both pool tokens and the LP token.
pub const TOKEN_DECIMALS: u32 = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid numeric value: {value}")]
    InvalidNumeric { value: String },

    #[error("{value} has more than {decimals} decimal places")]
    TooPrecise { value: String, decimals: u32 },

    #[error("value overflow: {value} exceeds 256 bits")]
    Overflow { value: String },
}

/// Parse a decimal string into a fixed-point amount with `decimals`
/// fractional digits. `"1.5"` at 18 decimals becomes `1_500...000`
/// (a 1 followed by 18 digits, half of them shifted).
pub fn parse_units(value: &str, decimals: u32) -> Result<U256, UnitsError> {
    let invalid = || UnitsError::InvalidNumeric {
        value: value.to_string(),
    };

    let mut parts = value.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() as u32 > decimals {
        return Err(UnitsError::TooPrecise {
            value: value.to_string(),
            decimals,
        });
    }

    let whole_part = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| invalid())?
    };
    let frac_part = if frac.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(frac).map_err(|_| invalid())?
    };

    let scale = U256::exp10(decimals as usize);
    let shift = U256::exp10(decimals as usize - frac.len());

    whole_part
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_part * shift))
        .ok_or_else(|| UnitsError::Overflow {
            value: value.to_string(),
        })
}

/// Render a fixed-point amount as a decimal string, trimming trailing
/// fractional zeros. The inverse of [`parse_units`] up to trimming.
pub fn format_units(value: U256, decimals: u32) -> String {
    let scale = U256::exp10(decimals as usize);
    let whole = value / scale;
    let frac = value % scale;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}
