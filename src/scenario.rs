//! Scenario runner for rate tables, loan comparisons and batches
//!
//! Every scenario is an independent amortization run, so rows are computed in
//! parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationEngine, ScheduleSummary};
use crate::loan::{LoanRecord, LoanSpec};
use crate::rates::RateCurve;

/// One row of the rate-delta scenario table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRow {
    /// Percentage points added to the base APR
    pub delta: f64,
    pub apr_percent: f64,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub month_count: u32,
    /// Payment change relative to the delta = 0 row
    pub payment_change: f64,
    /// Interest change relative to the delta = 0 row
    pub interest_change: f64,
}

/// Which loan of a comparison costs less overall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheaperLoan {
    A,
    B,
    Same,
}

/// Side-by-side result for two loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanComparison {
    pub loan_a: ScheduleSummary,
    pub loan_b: ScheduleSummary,
    /// Month-1 payment of B minus A
    pub payment_difference: f64,
    /// Total interest of B minus A
    pub interest_difference: f64,
    /// Payoff month of B minus A
    pub month_difference: i64,
    pub cheaper: CheaperLoan,
}

/// Summary of one batch loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub loan_id: String,
    pub apr_percent: f64,
    pub summary: ScheduleSummary,
}

/// Runs many independent amortizations with one engine configuration
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: AmortizationEngine,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a single flat-rate loan
    pub fn run(&self, loan: &LoanSpec, apr_percent: f64) -> ScheduleSummary {
        self.engine.run(loan, &RateCurve::flat(apr_percent)).summary()
    }

    /// Re-run `loan` at `base_apr + delta` for each delta.
    ///
    /// Changes are reported against a fresh run at delta 0, whether or not 0 is
    /// in `deltas`. Rates that would go negative are floored at zero.
    pub fn rate_table(&self, loan: &LoanSpec, base_apr: f64, deltas: &[f64]) -> Vec<ScenarioRow> {
        let baseline = self.run(loan, base_apr);

        deltas
            .par_iter()
            .map(|&delta| {
                let apr_percent = (base_apr + delta).max(0.0);
                let summary = self.run(loan, apr_percent);
                ScenarioRow {
                    delta,
                    apr_percent,
                    monthly_payment: summary.base_payment,
                    total_interest: summary.total_interest,
                    month_count: summary.month_count,
                    payment_change: summary.base_payment - baseline.base_payment,
                    interest_change: summary.total_interest - baseline.total_interest,
                }
            })
            .collect()
    }

    /// Compare two loans by month-1 payment, interest and overall cost
    pub fn compare(&self, loan_a: (&LoanSpec, f64), loan_b: (&LoanSpec, f64)) -> LoanComparison {
        let (a, b) = rayon::join(
            || self.run(loan_a.0, loan_a.1),
            || self.run(loan_b.0, loan_b.1),
        );

        let cost_gap = b.total_paid - a.total_paid;
        let cheaper = if cost_gap.abs() < 0.01 {
            CheaperLoan::Same
        } else if cost_gap > 0.0 {
            CheaperLoan::A
        } else {
            CheaperLoan::B
        };

        LoanComparison {
            payment_difference: b.base_payment - a.base_payment,
            interest_difference: b.total_interest - a.total_interest,
            month_difference: b.month_count as i64 - a.month_count as i64,
            cheaper,
            loan_a: a,
            loan_b: b,
        }
    }

    /// Amortize every loan of a batch
    pub fn run_batch(&self, loans: &[LoanRecord]) -> Vec<BatchResult> {
        loans
            .par_iter()
            .map(|record| BatchResult {
                loan_id: record.loan_id.clone(),
                apr_percent: record.apr_percent,
                summary: self.run(&record.spec, record.apr_percent),
            })
            .collect()
    }
}
