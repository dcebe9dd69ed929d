//! Rate curves and the policies that generate them

mod curve;
mod policy;

pub use curve::{RateCurve, RatePoint};
pub use policy::{ArmReset, IndexSource, RatePolicy, StepShock};
