use serde::{Deserialize, Serialize};

use tsad_core::Result;

/// Output of a threshold estimator run over the operational scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRun {
    /// One threshold per operational timestep.
    pub thresholds: Vec<f64>,
    /// Indices flagged as alarms; empty unless alarms were requested.
    pub alarms: Vec<usize>,
}

/// Trait abstracting a peaks-over-threshold style estimator.
///
/// Implemented by [`crate::algorithms::spot::Spot`] and test doubles. The
/// calls are made in order `fit` → `initialize` → `run`, on a fresh
/// instance per score sequence.
pub trait ThresholdEstimator {
    /// Import calibration data (`init_data`) and the operational data to threshold.
    fn fit(&mut self, init_data: &[f64], data: &[f64]) -> Result<()>;

    /// Compute the initial cutoff at probability `level` and fit the tail model.
    ///
    /// `min_extrema` selects the lower tail instead of the upper one.
    fn initialize(&mut self, level: f64, min_extrema: bool) -> Result<()>;

    /// Produce a threshold per operational point.
    ///
    /// With `dynamic = false` the threshold stays at its initial value.
    fn run(&mut self, dynamic: bool, with_alarm: bool) -> Result<ThresholdRun>;
}
