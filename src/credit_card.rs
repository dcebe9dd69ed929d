//! Revolving-balance payoff simulation
//!
//! Interest accrues on the starting balance each month, then the payment is
//! applied: `balance += interest - payment`.

use serde::{Deserialize, Serialize};

use crate::amortization::{Schedule, ScheduleRow, PAYOFF_EPSILON};

/// Safety ceiling on simulated card months
pub const MAX_CARD_MONTHS: u32 = 600;

/// How the cardholder pays each month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PaymentPolicy {
    /// Issuer minimum: a share of the balance with a dollar floor
    Minimum,
    /// Same amount every month
    Fixed { amount: f64 },
}

/// Why a payoff simulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    PaidOff,
    /// The payment no longer covers interest by a meaningful margin
    NoProgress,
    MonthCeiling,
}

/// Card engine settings
#[derive(Debug, Clone)]
pub struct CreditCardConfig {
    /// Minimum payment as a share of the starting balance
    pub min_payment_pct: f64,
    /// Dollar floor on the minimum payment
    pub min_payment_floor: f64,
    /// Principal the minimum payment must retire at least
    pub min_principal: f64,
    pub max_months: u32,
    pub payoff_epsilon: f64,
    /// Months simulated before the no-progress check applies
    pub no_progress_grace_months: u32,
}

impl Default for CreditCardConfig {
    fn default() -> Self {
        Self {
            min_payment_pct: 0.02,
            min_payment_floor: 25.0,
            min_principal: 1.0,
            max_months: MAX_CARD_MONTHS,
            payoff_epsilon: PAYOFF_EPSILON,
            no_progress_grace_months: 3,
        }
    }
}

/// Result of a payoff simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardOutcome {
    pub months_to_payoff: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub paid_off: bool,
    pub stop_reason: StopReason,
    pub ending_balance: f64,
    /// Month-by-month record in the loan schedule layout
    pub schedule: Schedule,
}

/// Credit-card payoff engine
#[derive(Debug, Clone, Default)]
pub struct CreditCardEngine {
    config: CreditCardConfig,
}

impl CreditCardEngine {
    pub fn new(config: CreditCardConfig) -> Self {
        Self { config }
    }

    /// Simulate paying down `balance` at `apr_percent` under `policy`
    pub fn run(&self, balance: f64, apr_percent: f64, policy: PaymentPolicy) -> CreditCardOutcome {
        let monthly_rate = apr_percent / 100.0 / 12.0;
        let first_payment = self.payment_for(balance, balance * monthly_rate, policy);
        let mut schedule = Schedule::new(balance, first_payment);
        let mut remaining = balance;
        let mut month = 0;
        let mut stop_reason = StopReason::PaidOff;

        log::debug!(
            "card payoff: balance {:.2} at {:.2}% under {:?}",
            balance,
            apr_percent,
            policy
        );

        while remaining > self.config.payoff_epsilon {
            if month >= self.config.max_months {
                stop_reason = StopReason::MonthCeiling;
                break;
            }

            let interest = remaining * monthly_rate;
            let payment = self
                .payment_for(remaining, interest, policy)
                .min(remaining + interest);

            if month >= self.config.no_progress_grace_months
                && payment <= interest + self.config.payoff_epsilon
            {
                stop_reason = StopReason::NoProgress;
                break;
            }

            month += 1;
            let starting_balance = remaining;
            remaining = (remaining + interest - payment).max(0.0);
            if remaining <= self.config.payoff_epsilon {
                remaining = 0.0;
            }

            schedule.add_row(ScheduleRow {
                month,
                apr_percent,
                starting_balance,
                payment,
                interest,
                principal: payment - interest,
                ending_balance: remaining,
            });
        }

        let paid_off = stop_reason == StopReason::PaidOff;
        schedule.finish(paid_off);

        if !paid_off {
            log::warn!(
                "card balance not paid off ({:?}) after {} months, {:.2} still owed",
                stop_reason,
                month,
                remaining
            );
        }

        CreditCardOutcome {
            months_to_payoff: schedule.month_count(),
            total_interest: schedule.total_interest(),
            total_paid: schedule.total_paid(),
            paid_off,
            stop_reason,
            ending_balance: remaining,
            schedule,
        }
    }

    /// Payment due before the never-exceed-balance clamp
    fn payment_for(&self, balance: f64, interest: f64, policy: PaymentPolicy) -> f64 {
        match policy {
            PaymentPolicy::Minimum => (balance * self.config.min_payment_pct)
                .max(self.config.min_payment_floor)
                .max(interest + self.config.min_principal),
            PaymentPolicy::Fixed { amount } => amount,
        }
    }
}
