//! Daily interest accrual.
//!
//! Interest is charged per started day: any part of a day since the last
//! accrual counts as a whole day. The computation is a pure function of the
//! balance and two instants.

/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Annual interest rate used when no configuration says otherwise (15%)
pub const DEFAULT_ANNUAL_RATE: f64 = 0.15;

const DAYS_PER_YEAR: f64 = 365.0;

/// Result of one accrual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrual {
    pub new_balance: f64,
    pub interest_applied: f64,
    pub elapsed_days: u64,
}

impl Accrual {
    /// True when at least one day was charged
    pub fn is_charged(&self) -> bool {
        self.elapsed_days > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccrualEngine {
    annual_rate: f64,
}

impl AccrualEngine {
    pub fn new(annual_rate: f64) -> Self {
        Self { annual_rate }
    }

    pub fn daily_rate(&self) -> f64 {
        self.annual_rate / DAYS_PER_YEAR
    }

    /// Whole days between two instants, rounded up. Zero when `now` is not
    /// after `last_timestamp`.
    pub fn elapsed_days(last_timestamp: i64, now: i64) -> u64 {
        let elapsed_ms = now.saturating_sub(last_timestamp);
        if elapsed_ms <= 0 {
            return 0;
        }
        ((elapsed_ms - 1) / MS_PER_DAY + 1) as u64
    }

    /// Charge interest on `balance` for the days since `last_timestamp`
    pub fn accrue(&self, balance: f64, last_timestamp: i64, now: i64) -> Accrual {
        let elapsed_days = Self::elapsed_days(last_timestamp, now);
        if elapsed_days == 0 {
            return Accrual {
                new_balance: balance,
                interest_applied: 0.0,
                elapsed_days: 0,
            };
        }

        let interest_applied = balance * self.daily_rate() * elapsed_days as f64;
        Accrual {
            new_balance: balance + interest_applied,
            interest_applied,
            elapsed_days,
        }
    }
}

impl Default for AccrualEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ANNUAL_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn test_elapsed_days_rounds_up_partial_days() {
        assert_eq!(AccrualEngine::elapsed_days(T, T), 0);
        assert_eq!(AccrualEngine::elapsed_days(T, T + 1), 1);
        assert_eq!(AccrualEngine::elapsed_days(T, T + MS_PER_DAY), 1);
        assert_eq!(AccrualEngine::elapsed_days(T, T + MS_PER_DAY + 1), 2);
        assert_eq!(AccrualEngine::elapsed_days(T, T + 2 * MS_PER_DAY), 2);
    }

    #[test]
    fn test_elapsed_days_clamps_negative_to_zero() {
        assert_eq!(AccrualEngine::elapsed_days(T, T - 1), 0);
        assert_eq!(AccrualEngine::elapsed_days(T, T - 5 * MS_PER_DAY), 0);
        assert_eq!(AccrualEngine::elapsed_days(i64::MAX, i64::MIN), 0);
    }

    #[test]
    fn test_no_elapsed_days_leaves_balance_unchanged() {
        let engine = AccrualEngine::default();
        for balance in [0.0, 1.0, 100000.0, 95082.19178082192] {
            let accrual = engine.accrue(balance, T, T);
            assert_eq!(accrual.new_balance.to_bits(), balance.to_bits());
            assert_eq!(accrual.interest_applied, 0.0);
            assert!(!accrual.is_charged());
        }
    }

    #[test]
    fn test_interest_matches_daily_rate_formula() {
        let engine = AccrualEngine::default();
        for (balance, days) in [(100000.0, 1u64), (100000.0, 30), (2500.5, 7), (0.0, 3)] {
            let accrual = engine.accrue(balance, T, T + days as i64 * MS_PER_DAY);
            let expected = balance * (0.15 / 365.0) * days as f64;

            assert_eq!(accrual.elapsed_days, days);
            assert!((accrual.interest_applied - expected).abs() < 1e-9);
            assert_eq!(accrual.new_balance, balance + accrual.interest_applied);
        }
    }

    #[test]
    fn test_two_day_scenario() {
        let engine = AccrualEngine::default();
        let accrual = engine.accrue(100000.0, T, T + 2 * MS_PER_DAY);

        assert_eq!(accrual.elapsed_days, 2);
        assert!((accrual.interest_applied - 82.19178082191781).abs() < 1e-9);
        assert!((accrual.new_balance - 100082.19178082192).abs() < 1e-9);
    }

    #[test]
    fn test_custom_rate() {
        let engine = AccrualEngine::new(0.365);
        assert!((engine.daily_rate() - 0.001).abs() < 1e-15);

        let accrual = engine.accrue(1000.0, T, T + MS_PER_DAY);
        assert!((accrual.interest_applied - 1.0).abs() < 1e-9);
    }
}
