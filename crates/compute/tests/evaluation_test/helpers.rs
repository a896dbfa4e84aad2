use tsad_compute::pipeline::{ThresholdEstimator, ThresholdRun};
use tsad_core::{segments, Result, SegmentKind};

/// Every binary sequence of length `n`, in counting order.
pub fn binary_sequences(n: usize) -> impl Iterator<Item = Vec<u8>> {
    (0u32..1 << n).map(move |bits| (0..n).map(|i| ((bits >> i) & 1) as u8).collect())
}

/// Indices of `labels` that fall in normal segments.
pub fn normal_indices(labels: &[u8]) -> Vec<usize> {
    segments(labels)
        .filter(|s| s.kind == SegmentKind::Normal)
        .flat_map(|s| s.range())
        .collect()
}

/// Exponential(scale) quantiles at evenly spaced probabilities.
pub fn exp_scores(n: usize, scale: f64) -> Vec<f64> {
    (0..n)
        .map(|i| -scale * (1.0 - (i as f64 + 0.5) / n as f64).ln())
        .collect()
}

/// Estimator double that returns a fixed threshold sequence.
pub struct MockEstimator {
    pub thresholds: Vec<f64>,
}

impl ThresholdEstimator for MockEstimator {
    fn fit(&mut self, _init_data: &[f64], _data: &[f64]) -> Result<()> {
        Ok(())
    }

    fn initialize(&mut self, _level: f64, _min_extrema: bool) -> Result<()> {
        Ok(())
    }

    fn run(&mut self, _dynamic: bool, _with_alarm: bool) -> Result<ThresholdRun> {
        Ok(ThresholdRun {
            thresholds: self.thresholds.clone(),
            alarms: Vec::new(),
        })
    }
}
