//! Loan data structures

use serde::{Deserialize, Serialize};

/// Loan product, used to pick a default term when the caller gives none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanKind {
    #[default]
    Mortgage,
    Auto,
    Student,
    Personal,
}

impl LoanKind {
    pub const ALL: [LoanKind; 4] = [
        LoanKind::Mortgage,
        LoanKind::Auto,
        LoanKind::Student,
        LoanKind::Personal,
    ];

    /// Match a product name case-insensitively
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
    }

    /// Customary term in years for this product
    pub fn default_term_years(&self) -> u32 {
        match self {
            LoanKind::Mortgage => 30,
            LoanKind::Auto => 5,
            LoanKind::Student => 10,
            LoanKind::Personal => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanKind::Mortgage => "mortgage",
            LoanKind::Auto => "auto",
            LoanKind::Student => "student",
            LoanKind::Personal => "personal",
        }
    }
}

/// Immutable description of an amortized loan at simulation start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanSpec {
    /// Amount borrowed
    pub principal: f64,

    /// Scheduled term in months
    pub term_months: u32,

    /// Paid every month on top of the scheduled payment
    #[serde(default)]
    pub extra_monthly: f64,
}

impl LoanSpec {
    pub fn new(principal: f64, term_months: u32) -> Self {
        Self {
            principal,
            term_months,
            extra_monthly: 0.0,
        }
    }

    /// Loan with the term given in whole years
    pub fn with_term_years(principal: f64, term_years: u32) -> Self {
        Self::new(principal, term_years.saturating_mul(12))
    }

    pub fn with_extra(mut self, extra_monthly: f64) -> Self {
        self.extra_monthly = extra_monthly;
        self
    }

    pub fn term_years(&self) -> f64 {
        self.term_months as f64 / 12.0
    }
}

/// One loan of a batch file: identifier, terms and rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: String,
    pub spec: LoanSpec,
    pub apr_percent: f64,
}
