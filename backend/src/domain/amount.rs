//! Amount validation for payments and borrows.
//!
//! Amounts are whole monetary units. Input typed by a user may carry
//! surrounding whitespace and thousands separators; both are stripped before
//! parsing. Anything else that is not a positive whole number is rejected.

use super::errors::LedgerError;

/// Largest whole number an f64 represents exactly (2^53 - 1)
pub const MAX_AMOUNT: u64 = 9_007_199_254_740_991;

/// Check a numeric amount and return it as whole units
pub fn validate_amount(amount: f64) -> Result<u64, LedgerError> {
    if !amount.is_finite() {
        return Err(LedgerError::InvalidAmount(format!("{} is not a finite number", amount)));
    }
    if amount <= 0.0 {
        return Err(LedgerError::InvalidAmount(format!("{} is not greater than zero", amount)));
    }
    if amount.fract() != 0.0 {
        return Err(LedgerError::InvalidAmount(format!("{} is not a whole number", amount)));
    }
    if amount > MAX_AMOUNT as f64 {
        return Err(LedgerError::InvalidAmount(format!("{} is too large", amount)));
    }
    Ok(amount as u64)
}

/// Parse an amount typed by the user, e.g. `"5000"` or `" 1,250 "`
pub fn parse_amount(input: &str) -> Result<u64, LedgerError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    if cleaned.is_empty() {
        return Err(LedgerError::InvalidAmount("empty amount".to_string()));
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::InvalidAmount(format!("'{}' is not a whole number", input.trim())));
    }

    let amount: u64 = cleaned
        .parse()
        .map_err(|_| LedgerError::InvalidAmount(format!("'{}' is too large", input.trim())))?;
    validate_amount(amount as f64)
}
