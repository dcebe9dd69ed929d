//! Rate path policies and the curve generators behind them

use serde::{Deserialize, Serialize};

use super::curve::RateCurve;
use crate::error::InputError;

/// How the APR of a loan evolves over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatePolicy {
    /// Constant rate for the life of the loan
    Flat,
    /// Periodic fixed-size rate bumps for a limited window
    StepShock(StepShock),
    /// Adjustable-rate loan: fixed period, then index + margin resets
    ArmReset(ArmReset),
}

/// Step-shock parameters.
///
/// Bumps land on months `every_months + 1`, `2 * every_months + 1`, ... up to and
/// including `duration_months`; month 1 is never bumped. `every_months == 0`
/// disables bumping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepShock {
    /// Percentage points added at each bump (may be negative)
    pub step_size: f64,
    pub every_months: u32,
    pub duration_months: u32,
    /// Ceiling on the cumulative rate
    #[serde(default)]
    pub cap_apr: Option<f64>,
}

/// ARM reset parameters.
///
/// The rate is fixed for `fixed_years * 12` months. Resets happen at month
/// `fixed_months + 1` and then every `adjust_every_months`; an interval of zero
/// means no resets at all, so the rate stays at the start rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmReset {
    pub fixed_years: u32,
    pub adjust_every_months: u32,
    pub index: IndexSource,
    /// Percentage points added to the index at each reset
    pub margin: f64,
    /// Largest move allowed at a single reset
    #[serde(default)]
    pub periodic_cap: Option<f64>,
    /// Largest rise over the starting rate for the life of the loan
    #[serde(default)]
    pub lifetime_cap_above_start: Option<f64>,
    #[serde(default)]
    pub floor_apr: Option<f64>,
}

/// Where the ARM index value comes from at each reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum IndexSource {
    /// Same index value at every reset
    Constant { value: f64 },
    /// One value per reset event; the last value holds once the list runs out
    Manual { values: Vec<f64>, fallback: f64 },
    /// Latest value from an external feed; `fallback` is used when none was observed
    Feed { observed: Option<f64>, fallback: f64 },
}

impl IndexSource {
    /// Index value for the `reset`-th reset event (0-indexed)
    pub fn value_at_reset(&self, reset: usize) -> f64 {
        match self {
            IndexSource::Constant { value } => *value,
            IndexSource::Manual { values, fallback } => values
                .get(reset)
                .or_else(|| values.last())
                .copied()
                .unwrap_or(*fallback),
            IndexSource::Feed { observed, fallback } => observed.unwrap_or(*fallback),
        }
    }

    /// True when a feed was requested but no value was observed
    pub fn is_degraded(&self) -> bool {
        matches!(self, IndexSource::Feed { observed: None, .. })
    }

    fn validate(&self) -> Result<(), InputError> {
        match self {
            IndexSource::Constant { value } => finite("index", *value),
            IndexSource::Manual { values, fallback } => {
                values.iter().try_for_each(|v| finite("index values", *v))?;
                finite("index fallback", *fallback)
            }
            IndexSource::Feed { observed, fallback } => {
                if let Some(v) = observed {
                    finite("index", *v)?;
                }
                finite("index fallback", *fallback)
            }
        }
    }
}

impl RatePolicy {
    /// Check the policy parameters before any curve is generated
    pub fn validate(&self) -> Result<(), InputError> {
        match self {
            RatePolicy::Flat => Ok(()),
            RatePolicy::StepShock(shock) => shock.validate(),
            RatePolicy::ArmReset(arm) => arm.validate(),
        }
    }

    /// Generate the APR curve for a loan starting at `start_apr`, covering at
    /// least `horizon_months` months
    pub fn curve(&self, start_apr: f64, horizon_months: u32) -> RateCurve {
        match self {
            RatePolicy::Flat => RateCurve::flat(start_apr),
            RatePolicy::StepShock(shock) => shock.curve(start_apr, horizon_months),
            RatePolicy::ArmReset(arm) => arm.curve(start_apr, horizon_months),
        }
    }
}

impl StepShock {
    pub fn validate(&self) -> Result<(), InputError> {
        finite("step size", self.step_size)?;
        non_negative_bound("rate cap", self.cap_apr)
    }

    pub fn curve(&self, start_apr: f64, horizon_months: u32) -> RateCurve {
        let mut curve = RateCurve::flat(start_apr);
        if self.every_months == 0 {
            return curve;
        }

        let last_month = self.duration_months.min(horizon_months);
        let mut rate = start_apr;
        let mut month = self.every_months.saturating_add(1);

        while month <= last_month {
            rate += self.step_size;
            if let Some(cap) = self.cap_apr {
                rate = rate.min(cap);
            }
            rate = rate.max(0.0);
            curve.push_change(month, rate);

            month = match month.checked_add(self.every_months) {
                Some(next) => next,
                None => break,
            };
        }

        curve
    }
}

impl ArmReset {
    pub fn fixed_months(&self) -> u32 {
        self.fixed_years.saturating_mul(12)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        finite("margin", self.margin)?;
        non_negative_bound("periodic cap", self.periodic_cap)?;
        non_negative_bound("lifetime cap", self.lifetime_cap_above_start)?;
        non_negative_bound("rate floor", self.floor_apr)?;
        self.index.validate()
    }

    pub fn curve(&self, start_apr: f64, horizon_months: u32) -> RateCurve {
        let mut curve = RateCurve::flat(start_apr);
        if self.adjust_every_months == 0 {
            return curve;
        }
        if self.index.is_degraded() {
            log::warn!(
                "ARM index feed unavailable, using fallback index {:.3}%",
                self.index.value_at_reset(0)
            );
        }

        let lifetime_ceiling = self.lifetime_cap_above_start.map(|cap| start_apr + cap);
        let mut rate = start_apr;
        let mut month = self.fixed_months().saturating_add(1);
        let mut reset = 0usize;

        while month <= horizon_months {
            let mut target = self.index.value_at_reset(reset) + self.margin;

            if let Some(cap) = self.periodic_cap {
                target = target.max(rate - cap).min(rate + cap);
            }
            if let Some(ceiling) = lifetime_ceiling {
                target = target.min(ceiling);
            }
            if let Some(floor) = self.floor_apr {
                target = target.max(floor);
            }

            rate = target.max(0.0);
            curve.push_change(month, rate);
            reset += 1;

            month = match month.checked_add(self.adjust_every_months) {
                Some(next) => next,
                None => break,
            };
        }

        curve
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InputError::NotFinite { field })
    }
}

fn non_negative_bound(field: &'static str, bound: Option<f64>) -> Result<(), InputError> {
    match bound {
        Some(value) if !value.is_finite() => Err(InputError::NotFinite { field }),
        Some(value) if value < 0.0 => Err(InputError::Negative { field, value }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shock(step: f64, every: u32, duration: u32, cap: Option<f64>) -> StepShock {
        StepShock {
            step_size: step,
            every_months: every,
            duration_months: duration,
            cap_apr: cap,
        }
    }

    fn arm(index: IndexSource) -> ArmReset {
        ArmReset {
            fixed_years: 5,
            adjust_every_months: 12,
            index,
            margin: 2.75,
            periodic_cap: Some(2.0),
            lifetime_cap_above_start: Some(5.0),
            floor_apr: Some(3.0),
        }
    }

    #[test]
    fn test_step_shock_skips_month_one() {
        for every in 1..=24 {
            let curve = shock(0.5, every, 360, None).curve(6.0, 360);
            assert_eq!(curve.apr_at(1), 6.0, "every_months = {}", every);
        }
    }

    #[test]
    fn test_step_shock_bump_schedule() {
        let curve = shock(0.25, 6, 24, None).curve(5.0, 360);

        assert_eq!(curve.apr_at(6), 5.0);
        assert_eq!(curve.apr_at(7), 5.25);
        assert_eq!(curve.apr_at(12), 5.25);
        assert_eq!(curve.apr_at(13), 5.5);
        assert_eq!(curve.apr_at(19), 5.75);
        // Month 25 would be the next bump but lies past the duration
        assert_eq!(curve.apr_at(25), 5.75);
        assert_eq!(curve.apr_at(360), 5.75);
    }

    #[test]
    fn test_step_shock_cap() {
        let curve = shock(1.0, 12, 120, Some(8.0)).curve(6.0, 360);

        assert_eq!(curve.apr_at(13), 7.0);
        assert_eq!(curve.apr_at(25), 8.0);
        assert_eq!(curve.apr_at(37), 8.0);
        assert_eq!(curve.peak_within(360), 8.0);
    }

    #[test]
    fn test_step_shock_zero_interval_is_flat() {
        let curve = shock(1.0, 0, 120, None).curve(6.0, 360);
        assert!(curve.is_flat());
    }

    #[test]
    fn test_step_shock_negative_steps_floor_at_zero() {
        let curve = shock(-1.0, 1, 10, None).curve(2.0, 360);
        assert_eq!(curve.apr_at(2), 1.0);
        assert_eq!(curve.apr_at(3), 0.0);
        assert_eq!(curve.apr_at(10), 0.0);
    }

    #[test]
    fn test_arm_fixed_period_holds_start_rate() {
        let curve = arm(IndexSource::Constant { value: 9.0 }).curve(4.0, 360);
        for month in 1..=60 {
            assert_eq!(curve.apr_at(month), 4.0);
        }
        assert!(curve.apr_at(61) > 4.0);
    }

    #[test]
    fn test_arm_periodic_and_lifetime_caps() {
        // Target 11.75 every reset; periodic cap 2 and lifetime ceiling 9
        let curve = arm(IndexSource::Constant { value: 9.0 }).curve(4.0, 360);

        assert_eq!(curve.apr_at(61), 6.0);
        assert_eq!(curve.apr_at(72), 6.0);
        assert_eq!(curve.apr_at(73), 8.0);
        assert_eq!(curve.apr_at(85), 9.0);
        assert_eq!(curve.apr_at(360), 9.0);
    }

    #[test]
    fn test_arm_floor() {
        // Index collapses: target 0.75, periodic cap allows 2 down, floor at 3
        let curve = arm(IndexSource::Constant { value: -2.0 }).curve(6.0, 360);
        assert_eq!(curve.apr_at(61), 4.0);
        assert_eq!(curve.apr_at(73), 3.0);
        assert_eq!(curve.apr_at(85), 3.0);
    }

    #[test]
    fn test_arm_floor_applied_after_lifetime_cap() {
        // Target 11.75 is cut to the 5.0 ceiling, then raised to the 6.0 floor
        let policy = ArmReset {
            periodic_cap: None,
            lifetime_cap_above_start: Some(1.0),
            floor_apr: Some(6.0),
            ..arm(IndexSource::Constant { value: 9.0 })
        };
        let curve = policy.curve(4.0, 360);

        assert_eq!(curve.apr_at(60), 4.0);
        assert_eq!(curve.apr_at(61), 6.0);
        assert_eq!(curve.apr_at(73), 6.0);
    }

    #[test]
    fn test_arm_floor_applied_after_periodic_cap() {
        // Target 2.75 is held to 3.5 by the periodic cap, then raised to the 6.0 floor
        let policy = ArmReset {
            periodic_cap: Some(0.5),
            lifetime_cap_above_start: None,
            floor_apr: Some(6.0),
            ..arm(IndexSource::Constant { value: 0.0 })
        };
        let curve = policy.curve(4.0, 360);

        assert_eq!(curve.apr_at(61), 6.0);
        assert_eq!(curve.apr_at(73), 6.0);
    }

    #[test]
    fn test_arm_manual_index_holds_last_value() {
        let policy = ArmReset {
            fixed_years: 1,
            adjust_every_months: 6,
            index: IndexSource::Manual {
                values: vec![3.0, 4.0],
                fallback: 0.0,
            },
            margin: 1.0,
            periodic_cap: None,
            lifetime_cap_above_start: None,
            floor_apr: None,
        };
        let curve = policy.curve(5.0, 120);

        assert_eq!(curve.apr_at(12), 5.0);
        assert_eq!(curve.apr_at(13), 4.0);
        assert_eq!(curve.apr_at(19), 5.0);
        assert_eq!(curve.apr_at(25), 5.0);
        assert_eq!(curve.apr_at(120), 5.0);
    }

    #[test]
    fn test_arm_feed_falls_back() {
        let source = IndexSource::Feed {
            observed: None,
            fallback: 4.5,
        };
        assert!(source.is_degraded());
        assert_eq!(source.value_at_reset(3), 4.5);

        let live = IndexSource::Feed {
            observed: Some(5.25),
            fallback: 4.5,
        };
        assert!(!live.is_degraded());
        assert_eq!(live.value_at_reset(0), 5.25);
    }

    #[test]
    fn test_arm_without_interval_stays_flat() {
        let policy = ArmReset {
            adjust_every_months: 0,
            periodic_cap: None,
            lifetime_cap_above_start: None,
            floor_apr: None,
            ..arm(IndexSource::Manual {
                values: vec![3.0, 8.0],
                fallback: 0.0,
            })
        };
        let curve = policy.curve(4.0, 360);

        assert!(curve.is_flat());
        assert_eq!(curve.apr_at(61), 4.0);
        assert_eq!(curve.apr_at(360), 4.0);
    }

    #[test]
    fn test_policy_validation() {
        assert!(RatePolicy::Flat.validate().is_ok());
        assert!(RatePolicy::StepShock(shock(0.5, 12, 60, Some(9.0))).validate().is_ok());

        let err = RatePolicy::StepShock(shock(0.5, 12, 60, Some(-1.0)))
            .validate()
            .unwrap_err();
        assert!(matches!(err, InputError::Negative { field: "rate cap", .. }));

        let mut bad_arm = arm(IndexSource::Constant { value: 4.0 });
        bad_arm.margin = f64::NAN;
        assert!(matches!(
            RatePolicy::ArmReset(bad_arm).validate(),
            Err(InputError::NotFinite { field: "margin" })
        ));
    }
}
