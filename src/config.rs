//! Calculator defaults applied by the input layer
//!
//! Values can be overridden from the environment:
//!   RATESENSE_TERM_YEARS, RATESENSE_KEEP_YEARS, RATESENSE_CLOSING_COSTS,
//!   RATESENSE_SCENARIO_DELTAS (comma separated), RATESENSE_STRESS_CAP_MONTHS

use std::env;

/// Default scenario table rate deltas (percentage points)
pub const DEFAULT_SCENARIO_DELTAS: [f64; 4] = [0.0, 0.25, 0.50, 1.00];

/// Defaults used when a request leaves a field out
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorDefaults {
    /// Loan term when neither months nor years were given (mortgage default)
    pub term_years: u32,

    /// Refinance holding horizon
    pub keep_years: u32,

    /// Refinance closing costs
    pub closing_costs: f64,

    /// Rate deltas for the scenario table
    pub scenario_deltas: Vec<f64>,

    /// Months simulated in stress runs when no cap is given (None = full schedule)
    pub stress_cap_months: Option<u32>,
}

impl Default for CalculatorDefaults {
    fn default() -> Self {
        Self {
            term_years: 30,
            keep_years: 7,
            closing_costs: 0.0,
            scenario_deltas: DEFAULT_SCENARIO_DELTAS.to_vec(),
            stress_cap_months: None,
        }
    }
}

impl CalculatorDefaults {
    /// Defaults with any environment overrides applied
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults with overrides read through `lookup`; unparseable values are ignored
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();

        let term_years = lookup("RATESENSE_TERM_YEARS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&years: &u32| years > 0)
            .unwrap_or(base.term_years);

        let keep_years = lookup("RATESENSE_KEEP_YEARS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(base.keep_years);

        let closing_costs = lookup("RATESENSE_CLOSING_COSTS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&c: &f64| c.is_finite() && c >= 0.0)
            .unwrap_or(base.closing_costs);

        let scenario_deltas = lookup("RATESENSE_SCENARIO_DELTAS")
            .and_then(|s| parse_deltas(&s))
            .unwrap_or(base.scenario_deltas);

        let stress_cap_months = lookup("RATESENSE_STRESS_CAP_MONTHS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&m: &u32| m > 0)
            .or(base.stress_cap_months);

        let defaults = Self {
            term_years,
            keep_years,
            closing_costs,
            scenario_deltas,
            stress_cap_months,
        };
        log::debug!("calculator defaults: {:?}", defaults);
        defaults
    }

    pub fn keep_months(&self) -> u32 {
        self.keep_years.saturating_mul(12)
    }
}

/// Parse a comma-separated list of finite numbers; `None` if any entry is bad
pub fn parse_deltas(raw: &str) -> Option<Vec<f64>> {
    let deltas: Option<Vec<f64>> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|d| d.is_finite()))
        .collect();
    deltas.filter(|d| !d.is_empty())
}
