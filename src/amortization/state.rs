//! Running state of a loan during simulation

use super::engine::monthly_payment;
use crate::loan::LoanSpec;
use crate::rates::RateCurve;

/// State of a loan at the start of a simulated month
#[derive(Debug, Clone)]
pub struct LoanState {
    /// Current month (1-indexed, 0 before the first advance)
    pub month: u32,

    /// Scheduled term in months
    pub term_months: u32,

    /// Outstanding balance at the start of the month
    pub balance: f64,

    /// APR in effect this month
    pub apr_percent: f64,

    /// APR the scheduled payment was amortized at
    pub payment_apr: f64,

    /// Standard amortized payment, before any extra payment
    pub scheduled_payment: f64,

    /// Number of times the payment was re-amortized after a rate change
    pub resets: u32,
}

impl LoanState {
    /// Initialize state at loan start, pricing the month-1 payment
    pub fn from_loan(loan: &LoanSpec, curve: &RateCurve) -> Self {
        let apr = curve.apr_at(1);
        Self {
            month: 0,
            term_months: loan.term_months,
            balance: loan.principal,
            apr_percent: apr,
            payment_apr: apr,
            scheduled_payment: monthly_payment(loan.principal, apr, loan.term_months),
            resets: 0,
        }
    }

    /// Advance to the next month, re-amortizing the balance if the rate moved
    pub fn advance_month(&mut self, curve: &RateCurve) {
        self.month += 1;
        self.apr_percent = curve.apr_at(self.month);

        if self.apr_percent != self.payment_apr {
            self.scheduled_payment =
                monthly_payment(self.balance, self.apr_percent, self.remaining_months());
            self.payment_apr = self.apr_percent;
            self.resets += 1;
        }
    }

    /// Months left in the term counting the current one; at least one
    pub fn remaining_months(&self) -> u32 {
        let elapsed = self.month.saturating_sub(1);
        self.term_months.saturating_sub(elapsed).max(1)
    }

    /// Interest accrued on the current balance this month
    pub fn monthly_interest(&self) -> f64 {
        if self.apr_percent == 0.0 {
            0.0
        } else {
            self.balance * (self.apr_percent / 100.0 / 12.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RatePoint;

    #[test]
    fn test_payment_resets_on_rate_change() {
        let loan = LoanSpec::new(100_000.0, 360);
        let curve = RateCurve::from_points(5.0, vec![RatePoint { month: 3, apr_percent: 7.0 }]);

        let mut state = LoanState::from_loan(&loan, &curve);
        let initial = state.scheduled_payment;

        state.advance_month(&curve);
        state.advance_month(&curve);
        assert_eq!(state.scheduled_payment, initial);
        assert_eq!(state.resets, 0);

        state.advance_month(&curve);
        assert_eq!(state.month, 3);
        assert_eq!(state.remaining_months(), 358);
        assert!(state.scheduled_payment > initial);
        assert_eq!(state.resets, 1);
    }

    #[test]
    fn test_remaining_months_never_zero() {
        let loan = LoanSpec::new(1_000.0, 2);
        let curve = RateCurve::flat(5.0);
        let mut state = LoanState::from_loan(&loan, &curve);
        for _ in 0..5 {
            state.advance_month(&curve);
        }
        assert_eq!(state.remaining_months(), 1);
    }
}
