//! Fixed-precision rounding of money-like quantities.

/// Decimal places for trigger prices and commissions.
pub const PRICE_DECIMALS: u32 = 2;

/// Decimal places for stop-loss and take-profit levels.
pub const LEVEL_DECIMALS: u32 = 3;

/// Decimal places for realized equity.
pub const EQUITY_DECIMALS: u32 = 2;

/// Round `value` to `decimals` places.
///
/// Ties are resolved to even on the exact binary value, so `0.125` becomes
/// `0.12` while `2.675` (stored just below the tie) becomes `2.67`. Decimal
/// formatting is correctly rounded, which avoids the error that scaling by
/// a power of ten introduces.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}
