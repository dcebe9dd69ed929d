//! Amortization engine for fixed- and variable-rate loans

mod state;
mod engine;
mod schedule;

pub use state::LoanState;
pub use engine::{
    monthly_payment, AmortizationConfig, AmortizationEngine, MAX_SCHEDULE_MONTHS, PAYOFF_EPSILON,
};
pub use schedule::{Schedule, ScheduleRow, ScheduleSummary};
