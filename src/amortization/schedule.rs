//! Schedule output structures for amortization runs

use serde::{Deserialize, Serialize};

/// A single simulated month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-indexed month of the loan
    pub month: u32,

    /// APR in effect this month (percent)
    pub apr_percent: f64,

    pub starting_balance: f64,

    /// Total paid this month, extra payment included
    pub payment: f64,

    pub interest: f64,
    pub principal: f64,
    pub ending_balance: f64,
}

/// Complete month-by-month schedule plus running totals.
///
/// Built by the engines one row at a time and read-only afterwards. Serialized
/// as its summary fields followed by `rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ScheduleRecord", from = "ScheduleRecord")]
pub struct Schedule {
    principal: f64,
    scheduled_payment: f64,
    rows: Vec<ScheduleRow>,
    total_interest: f64,
    total_paid: f64,
    paid_off: bool,
}

impl Schedule {
    /// Empty schedule for a loan of `principal` whose first standard payment is `scheduled_payment`
    pub(crate) fn new(principal: f64, scheduled_payment: f64) -> Self {
        Self {
            principal,
            scheduled_payment,
            rows: Vec::new(),
            total_interest: 0.0,
            total_paid: 0.0,
            paid_off: false,
        }
    }

    pub(crate) fn add_row(&mut self, row: ScheduleRow) {
        self.total_interest += row.interest;
        self.total_paid += row.payment;
        self.rows.push(row);
    }

    pub(crate) fn finish(&mut self, paid_off: bool) {
        self.paid_off = paid_off;
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    /// Standard amortized payment for month 1, without any extra payment
    pub fn scheduled_payment(&self) -> f64 {
        self.scheduled_payment
    }

    /// Payment actually made in month 1
    pub fn base_payment(&self) -> f64 {
        self.rows.first().map(|r| r.payment).unwrap_or(0.0)
    }

    pub fn month_count(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn total_interest(&self) -> f64 {
        self.total_interest
    }

    pub fn total_paid(&self) -> f64 {
        self.total_paid
    }

    /// False when the run stopped at a month ceiling with balance still owed
    pub fn paid_off(&self) -> bool {
        self.paid_off
    }

    pub fn ending_balance(&self) -> f64 {
        self.rows
            .last()
            .map(|r| r.ending_balance)
            .unwrap_or(self.principal)
    }

    /// Payment made in `month`, zero once the schedule has ended
    pub fn payment_in(&self, month: u32) -> f64 {
        self.row(month).map(|r| r.payment).unwrap_or(0.0)
    }

    /// Row for `month` (1-indexed)
    pub fn row(&self, month: u32) -> Option<&ScheduleRow> {
        month
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx as usize))
    }

    /// Sum of payments in months `1..=month`
    pub fn paid_through(&self, month: u32) -> f64 {
        self.rows
            .iter()
            .take(month as usize)
            .map(|r| r.payment)
            .sum()
    }

    /// Sum of interest in months `1..=month`
    pub fn interest_through(&self, month: u32) -> f64 {
        self.rows
            .iter()
            .take(month as usize)
            .map(|r| r.interest)
            .sum()
    }

    /// Balance still owed at the end of `month`
    pub fn balance_after(&self, month: u32) -> f64 {
        if month == 0 {
            return self.principal;
        }
        match self.row(month) {
            Some(row) => row.ending_balance,
            None => self.ending_balance(),
        }
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            principal: self.principal,
            month_count: self.month_count(),
            scheduled_payment: self.scheduled_payment,
            base_payment: self.base_payment(),
            total_interest: self.total_interest,
            total_paid: self.total_paid,
            paid_off: self.paid_off,
            ending_balance: self.ending_balance(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ScheduleRecord {
    #[serde(flatten)]
    summary: ScheduleSummary,
    rows: Vec<ScheduleRow>,
}

impl From<Schedule> for ScheduleRecord {
    fn from(schedule: Schedule) -> Self {
        Self {
            summary: schedule.summary(),
            rows: schedule.rows,
        }
    }
}

impl From<ScheduleRecord> for Schedule {
    fn from(record: ScheduleRecord) -> Self {
        Self {
            principal: record.summary.principal,
            scheduled_payment: record.summary.scheduled_payment,
            rows: record.rows,
            total_interest: record.summary.total_interest,
            total_paid: record.summary.total_paid,
            paid_off: record.summary.paid_off,
        }
    }
}

/// Headline numbers of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub principal: f64,
    pub month_count: u32,
    pub scheduled_payment: f64,
    pub base_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    pub paid_off: bool,
    pub ending_balance: f64,
}
