//! Request types, validation and dispatch
//!
//! Requests carry raw caller values (optional fields, mode flags). `validate`
//! turns them into core inputs or an `InputError`; the engines only ever see
//! validated numbers.

use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizationEngine, Schedule};
use crate::config::CalculatorDefaults;
use crate::credit_card::{CreditCardEngine, CreditCardOutcome, PaymentPolicy};
use crate::error::{Error, InputError};
use crate::loan::{load_loans_from_reader, LoanKind, LoanSpec};
use crate::rates::{ArmReset, IndexSource, RateCurve, RatePolicy, StepShock};
use crate::refinance::{RefinanceAnalyzer, RefinanceResult, RefinanceSpec};
use crate::scenario::{BatchResult, LoanComparison, ScenarioRow, ScenarioRunner};
use crate::stress::{StressOutcome, StressSimulator};

/// Check the terms of an amortized loan and its rate
pub fn validate_loan(loan: &LoanSpec, apr_percent: f64) -> Result<(), InputError> {
    positive("principal", loan.principal)?;
    if loan.term_months == 0 {
        return Err(InputError::NotPositive {
            field: "term",
            value: 0.0,
        });
    }
    rate("apr_percent", apr_percent)?;
    non_negative("extra_monthly", loan.extra_monthly)
}

fn positive(field: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        Err(InputError::NotFinite { field })
    } else if value <= 0.0 {
        Err(InputError::NotPositive { field, value })
    } else {
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        Err(InputError::NotFinite { field })
    } else if value < 0.0 {
        Err(InputError::Negative { field, value })
    } else {
        Ok(())
    }
}

fn rate(field: &'static str, value: f64) -> Result<(), InputError> {
    non_negative(field, value)
}

/// Callers may pass non-finite numbers to mean "no bound"
fn bound(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Stress window from the request or the configured default; a zero window is rejected
fn simulation_cap(
    requested: Option<u32>,
    defaults: &CalculatorDefaults,
) -> Result<Option<u32>, InputError> {
    match requested {
        Some(0) => Err(InputError::NotPositive {
            field: "simulation_cap_months",
            value: 0.0,
        }),
        Some(months) => Ok(Some(months)),
        None => Ok(defaults.stress_cap_months.filter(|&m| m > 0)),
    }
}

/// Resolve a term from months, years, the loan kind or the configured default
fn resolve_term(
    term_months: Option<u32>,
    term_years: Option<u32>,
    kind: Option<LoanKind>,
    defaults: &CalculatorDefaults,
) -> u32 {
    term_months
        .or_else(|| term_years.map(|y| y.saturating_mul(12)))
        .or_else(|| kind.map(|k| k.default_term_years().saturating_mul(12)))
        .unwrap_or_else(|| defaults.term_years.saturating_mul(12))
}

/// An amortized loan as submitted by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: f64,
    pub apr_percent: f64,
    #[serde(default)]
    pub term_months: Option<u32>,
    #[serde(default)]
    pub term_years: Option<u32>,
    #[serde(default)]
    pub extra_monthly: f64,
    #[serde(default)]
    pub kind: Option<LoanKind>,
}

impl LoanRequest {
    pub fn validate(&self, defaults: &CalculatorDefaults) -> Result<(LoanSpec, f64), InputError> {
        let term = resolve_term(self.term_months, self.term_years, self.kind, defaults);
        let spec = LoanSpec::new(self.principal, term).with_extra(self.extra_monthly);
        validate_loan(&spec, self.apr_percent)?;
        Ok((spec, self.apr_percent))
    }
}

/// Card payment mode as picked by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPaymentMode {
    #[default]
    Minimum,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardRequest {
    pub balance: f64,
    pub apr_percent: f64,
    #[serde(default)]
    pub mode: CardPaymentMode,
    /// Required when `mode` is fixed
    #[serde(default)]
    pub fixed_payment: Option<f64>,
}

impl CreditCardRequest {
    pub fn validate(&self) -> Result<(f64, f64, PaymentPolicy), InputError> {
        positive("balance", self.balance)?;
        rate("apr_percent", self.apr_percent)?;

        let policy = match self.mode {
            CardPaymentMode::Minimum => PaymentPolicy::Minimum,
            CardPaymentMode::Fixed => {
                let amount = self.fixed_payment.ok_or(InputError::Missing {
                    field: "fixed_payment",
                    context: "the payment mode is fixed",
                })?;
                positive("fixed_payment", amount)?;
                PaymentPolicy::Fixed { amount }
            }
        };

        Ok((self.balance, self.apr_percent, policy))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceRequest {
    pub principal: f64,
    pub base_apr: f64,
    pub new_apr: f64,
    #[serde(default)]
    pub term_months: Option<u32>,
    #[serde(default)]
    pub term_years: Option<u32>,
    #[serde(default)]
    pub extra_monthly: f64,
    #[serde(default)]
    pub closing_costs: Option<f64>,
    #[serde(default)]
    pub keep_months: Option<u32>,
    #[serde(default)]
    pub keep_years: Option<u32>,
}

impl RefinanceRequest {
    pub fn validate(&self, defaults: &CalculatorDefaults) -> Result<RefinanceSpec, InputError> {
        let term = resolve_term(self.term_months, self.term_years, None, defaults);
        let loan = LoanSpec::new(self.principal, term).with_extra(self.extra_monthly);
        validate_loan(&loan, self.base_apr)?;
        rate("new_apr", self.new_apr)?;

        let closing_costs = self.closing_costs.unwrap_or(defaults.closing_costs);
        non_negative("closing_costs", closing_costs)?;

        let keep_months = self
            .keep_months
            .or_else(|| self.keep_years.map(|y| y.saturating_mul(12)))
            .unwrap_or_else(|| defaults.keep_months());

        Ok(RefinanceSpec {
            loan,
            base_apr: self.base_apr,
            new_apr: self.new_apr,
            closing_costs,
            keep_months,
        })
    }
}

/// A validated stress run: loan, starting rate, rate policy and window
#[derive(Debug, Clone, PartialEq)]
pub struct StressPlan {
    pub loan: LoanSpec,
    pub start_apr: f64,
    pub policy: RatePolicy,
    pub simulation_cap: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepShockRequest {
    #[serde(flatten)]
    pub loan: LoanRequest,
    pub step_size: f64,
    pub every_months: u32,
    pub duration_months: u32,
    #[serde(default)]
    pub cap_apr: Option<f64>,
    #[serde(default)]
    pub simulation_cap_months: Option<u32>,
}

impl StepShockRequest {
    pub fn validate(&self, defaults: &CalculatorDefaults) -> Result<StressPlan, InputError> {
        let (loan, start_apr) = self.loan.validate(defaults)?;
        let policy = RatePolicy::StepShock(StepShock {
            step_size: self.step_size,
            every_months: self.every_months,
            duration_months: self.duration_months,
            cap_apr: bound(self.cap_apr),
        });
        policy.validate()?;

        Ok(StressPlan {
            loan,
            start_apr,
            policy,
            simulation_cap: simulation_cap(self.simulation_cap_months, defaults)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmRequest {
    #[serde(flatten)]
    pub loan: LoanRequest,
    pub fixed_years: u32,
    pub adjust_every_months: u32,
    pub index: IndexSource,
    pub margin: f64,
    #[serde(default)]
    pub periodic_cap: Option<f64>,
    #[serde(default)]
    pub lifetime_cap_above_start: Option<f64>,
    #[serde(default)]
    pub floor_apr: Option<f64>,
    #[serde(default)]
    pub simulation_cap_months: Option<u32>,
}

impl ArmRequest {
    pub fn validate(&self, defaults: &CalculatorDefaults) -> Result<StressPlan, InputError> {
        let (loan, start_apr) = self.loan.validate(defaults)?;
        let policy = RatePolicy::ArmReset(ArmReset {
            fixed_years: self.fixed_years,
            adjust_every_months: self.adjust_every_months,
            index: self.index.clone(),
            margin: self.margin,
            periodic_cap: bound(self.periodic_cap),
            lifetime_cap_above_start: bound(self.lifetime_cap_above_start),
            floor_apr: bound(self.floor_apr),
        });
        policy.validate()?;

        Ok(StressPlan {
            loan,
            start_apr,
            policy,
            simulation_cap: simulation_cap(self.simulation_cap_months, defaults)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    #[serde(flatten)]
    pub loan: LoanRequest,
    #[serde(default)]
    pub deltas: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub loan_a: LoanRequest,
    pub loan_b: LoanRequest,
}

/// Batch of loans as CSV text (`LoanId,Principal,AprPercent,TermMonths,ExtraMonthly`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub csv: String,
}

/// Any calculation the crate can run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calculation", rename_all = "snake_case")]
pub enum CalculationRequest {
    Amortization(LoanRequest),
    CreditCard(CreditCardRequest),
    Refinance(RefinanceRequest),
    StepShock(StepShockRequest),
    Arm(ArmRequest),
    Scenarios(ScenarioRequest),
    Compare(CompareRequest),
    Batch(BatchRequest),
}

/// Result of a calculation, tagged like the request that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "calculation", rename_all = "snake_case")]
pub enum CalculationOutput {
    Amortization(Schedule),
    CreditCard(CreditCardOutcome),
    Refinance(RefinanceResult),
    StepShock(StressOutcome),
    Arm(StressOutcome),
    Scenarios { rows: Vec<ScenarioRow> },
    Compare(LoanComparison),
    Batch { loans: Vec<BatchResult> },
}

impl CalculationOutput {
    /// The month-by-month schedule, for outputs that have one
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            CalculationOutput::Amortization(schedule) => Some(schedule),
            CalculationOutput::CreditCard(outcome) => Some(&outcome.schedule),
            CalculationOutput::StepShock(outcome) | CalculationOutput::Arm(outcome) => {
                Some(&outcome.schedule)
            }
            _ => None,
        }
    }
}

impl CalculationRequest {
    /// Validate the request and run it
    pub fn evaluate(&self, defaults: &CalculatorDefaults) -> Result<CalculationOutput, Error> {
        let output = match self {
            CalculationRequest::Amortization(request) => {
                let (loan, apr) = request.validate(defaults)?;
                CalculationOutput::Amortization(
                    AmortizationEngine::default().run(&loan, &RateCurve::flat(apr)),
                )
            }
            CalculationRequest::CreditCard(request) => {
                let (balance, apr, policy) = request.validate()?;
                CalculationOutput::CreditCard(CreditCardEngine::default().run(balance, apr, policy))
            }
            CalculationRequest::Refinance(request) => {
                let spec = request.validate(defaults)?;
                CalculationOutput::Refinance(RefinanceAnalyzer::default().breakeven(&spec))
            }
            CalculationRequest::StepShock(request) => {
                CalculationOutput::StepShock(run_stress(&request.validate(defaults)?))
            }
            CalculationRequest::Arm(request) => {
                CalculationOutput::Arm(run_stress(&request.validate(defaults)?))
            }
            CalculationRequest::Scenarios(request) => {
                let (loan, apr) = request.loan.validate(defaults)?;
                let deltas = request
                    .deltas
                    .as_deref()
                    .unwrap_or(defaults.scenario_deltas.as_slice());
                if let Some(bad) = deltas.iter().find(|d| !d.is_finite()) {
                    return Err(InputError::Invalid {
                        field: "deltas",
                        reason: format!("{} is not a finite number", bad),
                    }
                    .into());
                }
                CalculationOutput::Scenarios {
                    rows: ScenarioRunner::new().rate_table(&loan, apr, deltas),
                }
            }
            CalculationRequest::Compare(request) => {
                let (loan_a, apr_a) = request.loan_a.validate(defaults)?;
                let (loan_b, apr_b) = request.loan_b.validate(defaults)?;
                CalculationOutput::Compare(
                    ScenarioRunner::new().compare((&loan_a, apr_a), (&loan_b, apr_b)),
                )
            }
            CalculationRequest::Batch(request) => {
                let loans = load_loans_from_reader(request.csv.as_bytes())?;
                CalculationOutput::Batch {
                    loans: ScenarioRunner::new().run_batch(&loans),
                }
            }
        };
        Ok(output)
    }
}

fn run_stress(plan: &StressPlan) -> StressOutcome {
    StressSimulator::default().run_policy(&plan.loan, plan.start_apr, &plan.policy, plan.simulation_cap)
}
