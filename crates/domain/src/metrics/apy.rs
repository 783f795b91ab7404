use rust_decimal::Decimal;
use rust_decimal::prelude::*;

const DAYS_PER_YEAR: i64 = 365;

/// USD earned per day by `principal` at `apy_pct` percent, simple accrual.
pub fn daily_yield(principal: Decimal, apy_pct: Decimal) -> Decimal {
    principal * apy_pct / Decimal::ONE_HUNDRED / Decimal::from(DAYS_PER_YEAR)
}

/// Yield earned by `principal` at `apy_pct` percent over `days`, simple accrual.
pub fn yield_over(principal: Decimal, apy_pct: Decimal, days: u32) -> Decimal {
    daily_yield(principal, apy_pct) * Decimal::from(days)
}

/// Compounds a period return to a 365-day basis, in percent.
///
/// A total loss (or worse) annualizes to -100 %.
pub fn annualize_return(start_value: f64, end_value: f64, days: f64) -> f64 {
    if start_value <= 0.0 || days <= 0.0 {
        return 0.0;
    }
    if end_value <= 0.0 {
        return -100.0;
    }
    ((end_value / start_value).powf(DAYS_PER_YEAR as f64 / days) - 1.0) * 100.0
}

/// Converts an `f64` statistic to `Decimal`, mapping non-finite values to zero.
pub fn to_decimal(value: f64) -> Decimal {
    if value.is_finite() {
        Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_daily_yield() {
        assert_eq!(daily_yield(dec!(36500), dec!(12)), dec!(12));
        assert_eq!(yield_over(dec!(36500), dec!(12), 30), dec!(360));
    }

    #[test]
    fn test_annualize_return() {
        let yearly = annualize_return(100.0, 110.0, 365.0);
        assert!((yearly - 10.0).abs() < 1e-9);

        // Half a year at 5% compounds to 10.25% a year.
        let half = annualize_return(100.0, 105.0, 182.5);
        assert!((half - 10.25).abs() < 1e-9);

        assert_eq!(annualize_return(100.0, 0.0, 30.0), -100.0);
    }
}
