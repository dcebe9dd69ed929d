//! RateSense - loan and debt simulation core
//!
//! This library provides:
//! - Month-by-month amortization over flat or changing rate curves
//! - Credit card payoff under minimum or fixed payments
//! - Refinance break-even analysis
//! - Rate stress testing (step shocks, ARM resets) with risk labels
//! - Rate-delta scenario tables, loan comparisons and CSV batches
//! - CSV schedule export

pub mod amortization;
pub mod config;
pub mod credit_card;
pub mod error;
pub mod export;
pub mod inputs;
pub mod loan;
pub mod rates;
pub mod refinance;
pub mod scenario;
pub mod stress;

// Re-export commonly used types
pub use amortization::{AmortizationEngine, Schedule, ScheduleRow, ScheduleSummary};
pub use config::CalculatorDefaults;
pub use credit_card::{CreditCardEngine, CreditCardOutcome, PaymentPolicy};
pub use error::{Error, InputError, Result};
pub use inputs::{CalculationOutput, CalculationRequest};
pub use loan::{LoanKind, LoanRecord, LoanSpec};
pub use rates::{RateCurve, RatePolicy};
pub use refinance::{RefinanceAnalyzer, RefinanceResult};
pub use scenario::ScenarioRunner;
pub use stress::{RiskLabel, StressOutcome, StressSimulator};
