//! Evaluation pipeline.
//!
//! - [`estimator`]: the threshold estimator interface
//! - [`adjust`]: segment-credited prediction adjustment
//! - [`metrics`]: smoothed point metrics
//! - [`evaluate`]: estimator → threshold → adjustment → metrics

pub mod adjust;
pub mod estimator;
pub mod evaluate;
pub mod metrics;

pub use adjust::{adjust_predicts, adjust_scores, credited_segments, threshold_predicts};
pub use estimator::{ThresholdEstimator, ThresholdRun};
pub use evaluate::{pot_eval, reduce_threshold, EvaluationReport, EvaluationSettings, Evaluator};
pub use metrics::{point_metrics, ConfusionCounts, PointMetrics, SMOOTHING_EPSILON};
