use serde::{Deserialize, Serialize};

use tsad_core::series::ensure_same_length;
use tsad_core::Result;

/// Smoothing constant added to every denominator.
///
/// Fixed so reported numbers are reproducible across runs.
pub const SMOOTHING_EPSILON: f64 = 1e-5;

/// Confusion-matrix sums. Real-valued so weighted predicates are tolerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub tp: f64,
    pub tn: f64,
    pub fp: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
}

impl ConfusionCounts {
    pub fn total(&self) -> f64 {
        self.tp + self.tn + self.fp + self.fn_
    }
}

/// Point-wise precision/recall/F1 with the confusion counts they came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMetrics {
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
    #[serde(flatten)]
    pub counts: ConfusionCounts,
}

impl PointMetrics {
    /// `(f1, precision, recall, TP, TN, FP, FN)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, f64, f64) {
        (
            self.f1,
            self.precision,
            self.recall,
            self.counts.tp,
            self.counts.tn,
            self.counts.fp,
            self.counts.fn_,
        )
    }
}

/// Compute smoothed precision, recall and F1 of `predict` against `actual`.
///
/// Both sequences are read as 0/1 reals. Every division is smoothed with
/// [`SMOOTHING_EPSILON`], so the result is finite even when nothing is
/// predicted or nothing is anomalous.
pub fn point_metrics<P, A>(predict: &[P], actual: &[A]) -> Result<PointMetrics>
where
    P: Copy + Into<f64>,
    A: Copy + Into<f64>,
{
    ensure_same_length("predict", predict.len(), "actual", actual.len())?;

    let mut counts = ConfusionCounts::default();
    for (&p, &a) in predict.iter().zip(actual) {
        let p: f64 = p.into();
        let a: f64 = a.into();
        counts.tp += p * a;
        counts.tn += (1.0 - p) * (1.0 - a);
        counts.fp += p * (1.0 - a);
        counts.fn_ += (1.0 - p) * a;
    }

    let precision = counts.tp / (counts.tp + counts.fp + SMOOTHING_EPSILON);
    let recall = counts.tp / (counts.tp + counts.fn_ + SMOOTHING_EPSILON);
    let f1 = 2.0 * precision * recall / (precision + recall + SMOOTHING_EPSILON);

    Ok(PointMetrics {
        f1,
        precision,
        recall,
        counts,
    })
}
