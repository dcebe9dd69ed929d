//! Rate-path stress testing
//!
//! Runs a loan over a non-flat rate curve and reports how far the payment
//! climbs above where it started.

use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationEngine, Schedule};
use crate::loan::LoanSpec;
use crate::rates::{RateCurve, RatePolicy};

/// Slack on band edges so a ratio like `start * 1.10 / start - 1` still lands in its band
const BAND_TOLERANCE: f64 = 1e-9;

/// Qualitative payment-shock bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskLabel {
    /// Bucket a relative payment increase (0.10 = +10%). Each band includes its upper edge.
    pub fn from_increase(increase: f64) -> Self {
        if increase <= 0.10 + BAND_TOLERANCE {
            RiskLabel::Low
        } else if increase <= 0.25 + BAND_TOLERANCE {
            RiskLabel::Moderate
        } else if increase <= 0.45 + BAND_TOLERANCE {
            RiskLabel::High
        } else {
            RiskLabel::Severe
        }
    }

    /// Bucket the move from `start_payment` to `worst_payment`
    pub fn classify(start_payment: f64, worst_payment: f64) -> Self {
        Self::from_increase(relative_increase(start_payment, worst_payment))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Moderate => "Moderate",
            RiskLabel::High => "High",
            RiskLabel::Severe => "Severe",
        }
    }
}

fn relative_increase(start_payment: f64, worst_payment: f64) -> f64 {
    if start_payment > 0.0 {
        (worst_payment - start_payment) / start_payment
    } else {
        0.0
    }
}

/// Stress run result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressOutcome {
    pub schedule: Schedule,
    pub worst_month: u32,
    pub worst_payment: f64,
    pub peak_rate: f64,
    pub peak_month: u32,
    /// Relative increase of the worst payment over the month-1 payment
    pub payment_increase: f64,
    pub risk_label: RiskLabel,
}

/// Stress simulator over the amortization engine
#[derive(Debug, Clone, Default)]
pub struct StressSimulator {
    engine: AmortizationEngine,
}

impl StressSimulator {
    pub fn new(engine: AmortizationEngine) -> Self {
        Self { engine }
    }

    /// Run `loan` over `curve`, optionally stopping after `simulation_cap` months
    pub fn run(&self, loan: &LoanSpec, curve: &RateCurve, simulation_cap: Option<u32>) -> StressOutcome {
        let schedule = self.engine.run_capped(loan, curve, simulation_cap);
        analyze(schedule)
    }

    /// Generate the curve for `policy` starting at `start_apr` and run it
    pub fn run_policy(
        &self,
        loan: &LoanSpec,
        start_apr: f64,
        policy: &RatePolicy,
        simulation_cap: Option<u32>,
    ) -> StressOutcome {
        let horizon = simulation_cap
            .unwrap_or(loan.term_months)
            .min(self.engine.config().max_months);
        let curve = policy.curve(start_apr, horizon);
        log::debug!(
            "rate curve: {} changes, peak {:.3}% within {} months",
            curve.changes().len(),
            curve.peak_within(horizon),
            horizon
        );
        self.run(loan, &curve, simulation_cap)
    }
}

/// Find the worst payment and peak rate of a completed schedule
pub fn analyze(schedule: Schedule) -> StressOutcome {
    let mut worst_month = 0;
    let mut worst_payment = 0.0;
    let mut peak_month = 0;
    let mut peak_rate = 0.0;

    // Strict comparisons keep the earliest month on ties
    for row in schedule.rows() {
        if worst_month == 0 || row.payment > worst_payment {
            worst_month = row.month;
            worst_payment = row.payment;
        }
        if peak_month == 0 || row.apr_percent > peak_rate {
            peak_month = row.month;
            peak_rate = row.apr_percent;
        }
    }

    let payment_increase = relative_increase(schedule.base_payment(), worst_payment);
    let risk_label = RiskLabel::from_increase(payment_increase);

    log::debug!(
        "stress: worst payment {:.2} in month {}, peak rate {:.3}% in month {}, {}",
        worst_payment,
        worst_month,
        peak_rate,
        peak_month,
        risk_label.as_str()
    );

    StressOutcome {
        schedule,
        worst_month,
        worst_payment,
        peak_rate,
        peak_month,
        payment_increase,
        risk_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{ArmReset, IndexSource, RatePoint, StepShock};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_risk_boundaries() {
        assert_eq!(RiskLabel::from_increase(0.0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_increase(0.10), RiskLabel::Low);
        assert_eq!(RiskLabel::from_increase(0.1001), RiskLabel::Moderate);
        assert_eq!(RiskLabel::from_increase(0.25), RiskLabel::Moderate);
        assert_eq!(RiskLabel::from_increase(0.2501), RiskLabel::High);
        assert_eq!(RiskLabel::from_increase(0.45), RiskLabel::High);
        assert_eq!(RiskLabel::from_increase(0.4501), RiskLabel::Severe);
    }

    #[test]
    fn test_exact_band_edges_with_uneven_payments() {
        for i in 0..2_000 {
            let start = 500.0 + i as f64 * 0.37;
            assert_eq!(RiskLabel::classify(start, start * 1.10), RiskLabel::Low, "start {}", start);
            assert_eq!(RiskLabel::classify(start, start * 1.25), RiskLabel::Moderate, "start {}", start);
            assert_eq!(RiskLabel::classify(start, start * 1.45), RiskLabel::High, "start {}", start);
            assert_eq!(RiskLabel::classify(start, start * 1.46), RiskLabel::Severe, "start {}", start);
        }
    }

    #[test]
    fn test_classify_payment_jump() {
        assert_eq!(RiskLabel::classify(1_000.0, 1_100.0), RiskLabel::Low);
        assert_eq!(RiskLabel::classify(1_000.0, 1_100.1), RiskLabel::Moderate);
        assert_eq!(RiskLabel::classify(1_000.0, 2_000.0), RiskLabel::Severe);
        assert_eq!(RiskLabel::classify(0.0, 500.0), RiskLabel::Low);
    }

    #[test]
    fn test_flat_curve_is_low_risk() {
        let loan = LoanSpec::with_term_years(250_000.0, 30);
        let outcome = StressSimulator::default().run(&loan, &RateCurve::flat(6.0), None);

        assert_eq!(outcome.worst_month, 1);
        assert_eq!(outcome.peak_month, 1);
        assert_eq!(outcome.peak_rate, 6.0);
        assert_eq!(outcome.risk_label, RiskLabel::Low);
        assert!(outcome.payment_increase.abs() < 1e-9);
    }

    #[test]
    fn test_step_shock_finds_worst_and_peak() {
        let loan = LoanSpec::with_term_years(300_000.0, 30);
        let policy = RatePolicy::StepShock(StepShock {
            step_size: 1.0,
            every_months: 12,
            duration_months: 36,
            cap_apr: None,
        });
        let outcome = StressSimulator::default().run_policy(&loan, 5.0, &policy, None);

        // Bumps at 13, 25, 37 would apply but 37 is past the duration
        assert_eq!(outcome.peak_rate, 7.0);
        assert_eq!(outcome.peak_month, 25);
        assert_eq!(outcome.worst_month, 25);
        assert!(outcome.worst_payment > outcome.schedule.base_payment());
        assert_eq!(outcome.schedule.rows()[0].apr_percent, 5.0);
        assert_eq!(
            outcome.risk_label,
            RiskLabel::classify(outcome.schedule.base_payment(), outcome.worst_payment)
        );
    }

    #[test]
    fn test_arm_capped_window() {
        let loan = LoanSpec::with_term_years(400_000.0, 30);
        let policy = RatePolicy::ArmReset(ArmReset {
            fixed_years: 5,
            adjust_every_months: 12,
            index: IndexSource::Constant { value: 5.0 },
            margin: 2.75,
            periodic_cap: Some(2.0),
            lifetime_cap_above_start: Some(5.0),
            floor_apr: None,
        });
        let outcome = StressSimulator::default().run_policy(&loan, 4.5, &policy, Some(120));

        assert_eq!(outcome.schedule.month_count(), 120);
        assert!(!outcome.schedule.paid_off());
        // 4.5 -> 6.5 -> 7.75 (index + margin)
        assert_eq!(outcome.schedule.row(60).map(|r| r.apr_percent), Some(4.5));
        assert_eq!(outcome.schedule.row(61).map(|r| r.apr_percent), Some(6.5));
        assert_abs_diff_eq!(outcome.peak_rate, 7.75, epsilon = 1e-12);
        assert_eq!(outcome.peak_month, 73);
        assert!(outcome.risk_label >= RiskLabel::Moderate);
    }

    #[test]
    fn test_severe_shock() {
        let loan = LoanSpec::new(200_000.0, 360);
        let curve = RateCurve::from_points(3.0, vec![RatePoint { month: 2, apr_percent: 12.0 }]);
        let outcome = StressSimulator::default().run(&loan, &curve, None);

        assert_eq!(outcome.worst_month, 2);
        assert_eq!(outcome.risk_label, RiskLabel::Severe);
    }
}
