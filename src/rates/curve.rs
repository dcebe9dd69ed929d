//! Month-indexed APR curve

use serde::{Deserialize, Serialize};

/// A rate change taking effect at `month` (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub month: u32,
    pub apr_percent: f64,
}

/// Total mapping from month to APR in percent.
///
/// Stored as a starting rate plus an ordered list of change points; months
/// between points carry the last known rate forward. A curve with no change
/// points is flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    start_apr: f64,
    changes: Vec<RatePoint>,
}

impl RateCurve {
    /// Constant rate for every month
    pub fn flat(apr_percent: f64) -> Self {
        Self {
            start_apr: apr_percent,
            changes: Vec::new(),
        }
    }

    /// Build a curve from explicit change points.
    ///
    /// Points are sorted by month; when two points share a month the later one wins.
    /// Points that do not change the rate are dropped.
    pub fn from_points(start_apr: f64, points: impl IntoIterator<Item = RatePoint>) -> Self {
        let mut sorted: Vec<RatePoint> = points.into_iter().collect();
        sorted.sort_by_key(|p| p.month);

        let mut curve = Self::flat(start_apr);
        for point in sorted {
            curve.push_change(point.month, point.apr_percent);
        }
        curve
    }

    /// Append a change at `month`. Months must be pushed in non-decreasing order.
    pub(crate) fn push_change(&mut self, month: u32, apr_percent: f64) {
        if let Some(last) = self.changes.last_mut() {
            if last.month == month {
                last.apr_percent = apr_percent;
                return;
            }
        }
        if self.apr_at(month) != apr_percent {
            self.changes.push(RatePoint { month, apr_percent });
        }
    }

    /// APR in effect for `month` (1-indexed)
    pub fn apr_at(&self, month: u32) -> f64 {
        let idx = self.changes.partition_point(|p| p.month <= month);
        if idx == 0 {
            self.start_apr
        } else {
            self.changes[idx - 1].apr_percent
        }
    }

    pub fn is_flat(&self) -> bool {
        self.changes.is_empty()
    }

    /// Change points in month order
    pub fn changes(&self) -> &[RatePoint] {
        &self.changes
    }

    /// Highest APR the curve reaches at or before `horizon`
    pub fn peak_within(&self, horizon: u32) -> f64 {
        self.changes
            .iter()
            .take_while(|p| p.month <= horizon)
            .map(|p| p.apr_percent)
            .fold(self.start_apr, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_curve() {
        let curve = RateCurve::flat(6.5);
        assert!(curve.is_flat());
        assert_eq!(curve.apr_at(1), 6.5);
        assert_eq!(curve.apr_at(1200), 6.5);
    }

    #[test]
    fn test_carry_forward_between_points() {
        let curve = RateCurve::from_points(
            5.0,
            vec![
                RatePoint { month: 25, apr_percent: 7.0 },
                RatePoint { month: 13, apr_percent: 6.0 },
            ],
        );

        assert_eq!(curve.apr_at(1), 5.0);
        assert_eq!(curve.apr_at(12), 5.0);
        assert_eq!(curve.apr_at(13), 6.0);
        assert_eq!(curve.apr_at(24), 6.0);
        assert_eq!(curve.apr_at(25), 7.0);
        assert_eq!(curve.apr_at(400), 7.0);
        assert_eq!(curve.changes().len(), 2);
    }

    #[test]
    fn test_redundant_points_dropped() {
        let curve = RateCurve::from_points(
            5.0,
            vec![
                RatePoint { month: 2, apr_percent: 5.0 },
                RatePoint { month: 3, apr_percent: 5.5 },
                RatePoint { month: 4, apr_percent: 5.5 },
            ],
        );
        assert_eq!(curve.changes().len(), 1);
        assert_eq!(curve.peak_within(2), 5.0);
        assert_eq!(curve.peak_within(10), 5.5);
    }
}
