//! Month-by-month amortization engine for fixed- and variable-rate loans

use super::schedule::{Schedule, ScheduleRow};
use super::state::LoanState;
use crate::loan::LoanSpec;
use crate::rates::RateCurve;

/// Safety ceiling on simulated loan months
pub const MAX_SCHEDULE_MONTHS: u32 = 1200;

/// Balance at or below this is treated as paid off
pub const PAYOFF_EPSILON: f64 = 0.01;

/// Standard amortized payment for `principal` over `months` at `apr_percent`.
///
/// A zero rate divides the principal evenly; zero months asks for the whole
/// balance at once.
pub fn monthly_payment(principal: f64, apr_percent: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    let n = months as f64;
    if apr_percent == 0.0 {
        return principal / n;
    }
    let r = apr_percent / 100.0 / 12.0;
    principal * r / (1.0 - (1.0 + r).powf(-n))
}

/// Configuration for an amortization run
#[derive(Debug, Clone)]
pub struct AmortizationConfig {
    /// Hard ceiling on simulated months
    pub max_months: u32,

    /// Balance treated as fully repaid
    pub payoff_epsilon: f64,
}

impl Default for AmortizationConfig {
    fn default() -> Self {
        Self {
            max_months: MAX_SCHEDULE_MONTHS,
            payoff_epsilon: PAYOFF_EPSILON,
        }
    }
}

/// Amortization engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: AmortizationConfig,
}

impl AmortizationEngine {
    pub fn new(config: AmortizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AmortizationConfig {
        &self.config
    }

    /// Simulate `loan` under `curve` until paid off or the month ceiling
    pub fn run(&self, loan: &LoanSpec, curve: &RateCurve) -> Schedule {
        self.run_capped(loan, curve, None)
    }

    /// Simulate at most `cap` months (never more than the configured ceiling)
    pub fn run_capped(&self, loan: &LoanSpec, curve: &RateCurve, cap: Option<u32>) -> Schedule {
        let limit = cap
            .map(|c| c.min(self.config.max_months))
            .unwrap_or(self.config.max_months);

        let mut state = LoanState::from_loan(loan, curve);
        let mut schedule = Schedule::new(loan.principal, state.scheduled_payment);

        log::debug!(
            "amortizing {:.2} over {} months, month-1 APR {:.3}%, extra {:.2}",
            loan.principal,
            loan.term_months,
            state.apr_percent,
            loan.extra_monthly
        );

        while state.balance > self.config.payoff_epsilon && state.month < limit {
            state.advance_month(curve);
            let row = self.calculate_month(loan, &mut state);
            schedule.add_row(row);
        }

        let paid_off = state.balance <= self.config.payoff_epsilon;
        schedule.finish(paid_off);

        if !paid_off && cap.is_none() {
            log::warn!(
                "loan not amortized after {} months, {:.2} still owed",
                state.month,
                state.balance
            );
        }
        log::debug!(
            "schedule complete: {} months, interest {:.2}, {} payment resets",
            schedule.month_count(),
            schedule.total_interest(),
            state.resets
        );

        schedule
    }

    /// Apply one month of interest and payment to the state
    fn calculate_month(&self, loan: &LoanSpec, state: &mut LoanState) -> ScheduleRow {
        let starting_balance = state.balance;
        let interest = state.monthly_interest();

        // Never pay more than what is owed
        let payment = (state.scheduled_payment + loan.extra_monthly).min(starting_balance + interest);
        let principal = payment - interest;

        let mut ending_balance = (starting_balance - principal).max(0.0);
        if ending_balance <= self.config.payoff_epsilon {
            ending_balance = 0.0;
        }
        state.balance = ending_balance;

        ScheduleRow {
            month: state.month,
            apr_percent: state.apr_percent,
            starting_balance,
            payment,
            interest,
            principal,
            ending_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{RatePoint, RatePolicy, StepShock};
    use approx::assert_abs_diff_eq;

    fn engine() -> AmortizationEngine {
        AmortizationEngine::default()
    }

    #[test]
    fn test_zero_rate_payment_is_even_split() {
        assert_eq!(monthly_payment(12_000.0, 0.0, 48), 12_000.0 / 48.0);
        assert_eq!(monthly_payment(1_000.0, 0.0, 3), 1_000.0 / 3.0);
    }

    #[test]
    fn test_known_mortgage_payment() {
        // $200,000 at 6% for 30 years
        assert_abs_diff_eq!(monthly_payment(200_000.0, 6.0, 360), 1199.10, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_schedule_length_equals_term() {
        for &(principal, term) in &[(10_000.0, 12u32), (35_000.0, 60), (1_234.56, 7)] {
            let loan = LoanSpec::new(principal, term);
            let schedule = engine().run(&loan, &RateCurve::flat(0.0));

            assert_eq!(schedule.month_count(), term);
            assert!(schedule.paid_off());
            assert_eq!(schedule.total_interest(), 0.0);
            assert_abs_diff_eq!(
                schedule.total_paid(),
                schedule.base_payment() * term as f64,
                epsilon = 0.01
            );
        }
    }

    #[test]
    fn test_flat_rate_schedule_fits_term() {
        let loan = LoanSpec::with_term_years(300_000.0, 30);
        let schedule = engine().run(&loan, &RateCurve::flat(6.5));

        assert!(schedule.month_count() <= 360);
        assert!(schedule.paid_off());
        assert_abs_diff_eq!(
            schedule.total_paid(),
            schedule.base_payment() * schedule.month_count() as f64,
            epsilon = 0.05
        );
        assert_abs_diff_eq!(
            schedule.total_paid() - schedule.total_interest(),
            300_000.0,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_row_invariants() {
        let loan = LoanSpec::new(25_000.0, 60).with_extra(75.0);
        let schedule = engine().run(&loan, &RateCurve::flat(7.25));

        for (idx, row) in schedule.rows().iter().enumerate() {
            assert_eq!(row.month, idx as u32 + 1);
            assert_abs_diff_eq!(row.payment, row.interest + row.principal, epsilon = 1e-9);
            assert!(row.ending_balance >= 0.0);
            assert_abs_diff_eq!(
                row.ending_balance,
                (row.starting_balance - row.principal).max(0.0),
                epsilon = PAYOFF_EPSILON
            );
        }
    }

    #[test]
    fn test_runs_are_identical() {
        let loan = LoanSpec::new(180_000.0, 240).with_extra(120.0);
        let curve = RatePolicy::StepShock(StepShock {
            step_size: 0.5,
            every_months: 12,
            duration_months: 60,
            cap_apr: Some(9.0),
        })
        .curve(6.0, 240);

        let first = engine().run(&loan, &curve);
        let second = engine().run(&loan, &curve);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extra_payment_monotonicity() {
        let loan = LoanSpec::new(200_000.0, 360);
        let curve = RateCurve::flat(6.0);

        let mut previous = engine().run(&loan, &curve);
        for extra in [50.0, 100.0, 250.0, 500.0, 1_000.0] {
            let current = engine().run(&loan.with_extra(extra), &curve);
            assert!(current.total_interest() < previous.total_interest(), "extra {}", extra);
            assert!(current.month_count() < previous.month_count(), "extra {}", extra);
            previous = current;
        }
    }

    #[test]
    fn test_extra_larger_than_balance_pays_off_in_one_month() {
        let loan = LoanSpec::new(1_000.0, 12).with_extra(5_000.0);
        let schedule = engine().run(&loan, &RateCurve::flat(12.0));

        assert_eq!(schedule.month_count(), 1);
        assert_abs_diff_eq!(schedule.base_payment(), 1_010.0, epsilon = 1e-9);
        assert_eq!(schedule.ending_balance(), 0.0);
    }

    #[test]
    fn test_variable_rate_reamortizes_remaining_balance() {
        let loan = LoanSpec::new(100_000.0, 120);
        let curve = RateCurve::from_points(4.0, vec![RatePoint { month: 61, apr_percent: 8.0 }]);
        let schedule = engine().run(&loan, &curve);

        let before = schedule.row(60).expect("month 60");
        let after = schedule.row(61).expect("month 61");
        let expected = monthly_payment(before.ending_balance, 8.0, 60);

        assert_eq!(after.apr_percent, 8.0);
        assert_abs_diff_eq!(after.payment, expected, epsilon = 1e-9);
        assert!(after.payment > before.payment);
        // Payment reset keeps the original term
        assert_eq!(schedule.month_count(), 120);
        assert!(schedule.paid_off());
    }

    #[test]
    fn test_capped_run_stops_early() {
        let loan = LoanSpec::with_term_years(300_000.0, 30);
        let schedule = engine().run_capped(&loan, &RateCurve::flat(6.0), Some(84));

        assert_eq!(schedule.month_count(), 84);
        assert!(!schedule.paid_off());
        assert!(schedule.ending_balance() > 0.0);
    }

    #[test]
    fn test_ceiling_bounds_degenerate_loan() {
        // A 50-year loan cannot finish inside a 24-month ceiling
        let config = AmortizationConfig {
            max_months: 24,
            ..Default::default()
        };
        let loan = LoanSpec::new(10_000.0, 600);
        let schedule = AmortizationEngine::new(config).run(&loan, &RateCurve::flat(5.0));

        assert_eq!(schedule.month_count(), 24);
        assert!(!schedule.paid_off());
    }
}
