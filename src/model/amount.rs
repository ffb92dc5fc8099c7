use alloy::primitives::U256;
use alloy::primitives::utils::{ParseUnits, format_units, parse_units};
use anyhow::{Context, Result, bail};

/// Decimals of every amount the market deals in (option size, premium, collateral).
pub const DECIMALS: u8 = 18;

/// One whole unit at 18 decimals.
pub const UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

const BPS: u64 = 10_000;

/// `a * b / UNIT`, or `None` on overflow.
pub fn mul_unit(a: U256, b: U256) -> Option<U256> {
    a.checked_mul(b).map(|p| p / UNIT)
}

/// `value * bps / 10_000`, rounded down.
pub fn bps_of(value: U256, bps: u64) -> U256 {
    value.saturating_mul(U256::from(bps)) / U256::from(BPS)
}

/// `value` grown by `bps` basis points, saturating at `U256::MAX`.
pub fn add_bps(value: U256, bps: u64) -> U256 {
    value.saturating_add(bps_of(value, bps))
}

/// Parse a decimal string ("100", "0.5") into an 18-decimal amount.
/// Negative input is rejected.
pub fn parse_amount(s: &str) -> Result<U256> {
    let parsed = parse_units(s.trim(), DECIMALS)
        .with_context(|| format!("invalid amount '{s}'"))?;
    match parsed {
        ParseUnits::U256(v) => Ok(v),
        ParseUnits::I256(_) => bail!("amount must not be negative: '{s}'"),
    }
}

/// Render an 18-decimal amount with trailing zeros trimmed.
pub fn format_amount(value: U256) -> String {
    match format_units(value, DECIMALS) {
        Ok(s) if s.contains('.') => {
            let trimmed = s.trim_end_matches('0').trim_end_matches('.');
            trimmed.to_string()
        }
        Ok(s) => s,
        Err(_) => format!("{value} wei"),
    }
}
