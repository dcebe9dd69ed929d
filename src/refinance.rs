//! Refinance break-even analysis
//!
//! Compares the current loan against a candidate refinance of the same
//! principal and term over a holding horizon.

use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationEngine, Schedule, ScheduleSummary};
use crate::loan::LoanSpec;
use crate::rates::RateCurve;

/// Inputs for one refinance comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinanceSpec {
    pub loan: LoanSpec,
    pub base_apr: f64,
    pub new_apr: f64,
    /// One-time cost of the refinance
    pub closing_costs: f64,
    /// How long the borrower expects to keep the loan
    pub keep_months: u32,
}

/// Break-even month and net savings over the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceResult {
    /// First month where cumulative payment savings cover closing costs
    pub breakeven_month: Option<u32>,
    /// Positive when refinancing saves money over the horizon
    pub net_savings: f64,
    pub horizon_months: u32,
    /// Month-1 payment difference (current minus refinance)
    pub monthly_savings: f64,
    /// Interest avoided within the horizon
    pub interest_saved: f64,
    pub baseline: ScheduleSummary,
    pub refinanced: ScheduleSummary,
}

/// Runs the two schedules behind a refinance decision
#[derive(Debug, Clone, Default)]
pub struct RefinanceAnalyzer {
    engine: AmortizationEngine,
}

impl RefinanceAnalyzer {
    pub fn new(engine: AmortizationEngine) -> Self {
        Self { engine }
    }

    pub fn breakeven(&self, spec: &RefinanceSpec) -> RefinanceResult {
        let baseline = self.engine.run(&spec.loan, &RateCurve::flat(spec.base_apr));
        let refinanced = self.engine.run(&spec.loan, &RateCurve::flat(spec.new_apr));
        compare_schedules(&baseline, &refinanced, spec.closing_costs, spec.keep_months)
    }
}

/// Break-even and net savings of `refinanced` against `baseline`
pub fn compare_schedules(
    baseline: &Schedule,
    refinanced: &Schedule,
    closing_costs: f64,
    keep_months: u32,
) -> RefinanceResult {
    let horizon = keep_months.min(baseline.month_count().max(refinanced.month_count()));

    let mut cumulative_savings = 0.0;
    let mut breakeven_month = None;
    for month in 1..=horizon {
        cumulative_savings += baseline.payment_in(month) - refinanced.payment_in(month);
        if breakeven_month.is_none() && cumulative_savings >= closing_costs {
            breakeven_month = Some(month);
        }
    }

    // Charge whatever is still owed at the horizon so partial payoffs compare fairly
    let baseline_cost = baseline.paid_through(horizon) + baseline.balance_after(horizon);
    let refinance_cost =
        refinanced.paid_through(horizon) + refinanced.balance_after(horizon) + closing_costs;

    if breakeven_month.is_none() {
        log::debug!(
            "no break-even within {} months (cumulative savings {:.2} vs costs {:.2})",
            horizon,
            cumulative_savings,
            closing_costs
        );
    }

    RefinanceResult {
        breakeven_month,
        net_savings: baseline_cost - refinance_cost,
        horizon_months: horizon,
        monthly_savings: baseline.base_payment() - refinanced.base_payment(),
        interest_saved: baseline.interest_through(horizon) - refinanced.interest_through(horizon),
        baseline: baseline.summary(),
        refinanced: refinanced.summary(),
    }
}
