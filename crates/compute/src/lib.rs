pub mod algorithms;
pub mod input;
pub mod pipeline;

pub use algorithms::gpd::GpdFit;
pub use algorithms::spot::Spot;
pub use input::EvaluationInput;
pub use pipeline::{
    adjust_predicts, adjust_scores, point_metrics, pot_eval, EvaluationReport,
    EvaluationSettings, Evaluator, PointMetrics, ThresholdEstimator, ThresholdRun,
};
