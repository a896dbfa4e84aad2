//! Threshold-and-score evaluation.
//!
//! Obtains a threshold from a [`ThresholdEstimator`], collapses it to a
//! scalar, applies segment credit to the thresholded scores and reports
//! point metrics against the labels.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use tsad_core::series::{ensure_binary_labels, ensure_non_empty, ensure_same_length};
use tsad_core::config::PotConfig;
use tsad_core::{Config, EvalError, Result, ToleranceWindow};

use super::adjust::adjust_scores;
use super::estimator::ThresholdEstimator;
use super::metrics::{point_metrics, PointMetrics};
use crate::algorithms::spot::Spot;
use crate::input::EvaluationInput;

/// Parameters of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Risk quantile handed to estimators built by the evaluator.
    pub risk_q: f64,
    /// Probability of the estimator's initial cutoff.
    pub level: f64,
    /// Early/late detection credit.
    pub tolerance: ToleranceWindow,
}

impl EvaluationSettings {
    /// Check `risk_q` in (0, 1) and `level` in [0, 1).
    pub fn validate(&self) -> Result<()> {
        PotConfig {
            risk_q: self.risk_q,
            level: self.level,
            dataset: None,
        }
        .validate()
    }
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            risk_q: tsad_core::config::DEFAULT_RISK_Q,
            level: tsad_core::config::DEFAULT_LEVEL,
            tolerance: ToleranceWindow::default(),
        }
    }
}

impl From<&Config> for EvaluationSettings {
    fn from(config: &Config) -> Self {
        Self {
            risk_q: config.pot.risk_q,
            level: config.pot.level,
            tolerance: config.tolerance,
        }
    }
}

/// Final output of an evaluation. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    #[serde(flatten)]
    metrics: PointMetrics,
    threshold: f64,
    tolerance: ToleranceWindow,
    #[serde(rename = "pred")]
    predictions: Vec<u8>,
    thresholds: Vec<f64>,
}

impl EvaluationReport {
    pub fn metrics(&self) -> &PointMetrics {
        &self.metrics
    }

    /// Scalar operating threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn tolerance(&self) -> ToleranceWindow {
        self.tolerance
    }

    /// Segment-adjusted predictions, one per timestep.
    pub fn predictions(&self) -> &[u8] {
        &self.predictions
    }

    /// Threshold sequence as returned by the estimator, before reduction.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }
}

/// Collapse an estimator's threshold sequence to its mean.
///
/// Terms are scaled before summing so large finite thresholds do not
/// overflow. Fails when the sequence is empty or the mean is not finite.
pub fn reduce_threshold(thresholds: &[f64]) -> Result<f64> {
    if thresholds.is_empty() {
        return Err(EvalError::estimation("estimator returned no thresholds"));
    }
    let n = thresholds.len() as f64;
    let mean = thresholds.iter().map(|t| t / n).sum::<f64>();
    if !mean.is_finite() {
        warn!(threshold = mean, "estimator produced a non-finite threshold");
        return Err(EvalError::EstimationFailure {
            reason: "reduced threshold is not finite".into(),
            threshold: Some(mean),
        });
    }
    Ok(mean)
}

/// Runs threshold estimation, segment adjustment and scoring.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    settings: EvaluationSettings,
}

impl Evaluator {
    pub fn new(settings: EvaluationSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(EvaluationSettings::from(config))
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Evaluate `scores` against `labels` with a caller-supplied estimator.
    ///
    /// The estimator is driven `fit(init_scores, scores)` →
    /// `initialize(level, false)` → `run(false, false)`, and its threshold
    /// sequence is averaged into the operating threshold. The estimator's own
    /// risk quantile applies; `settings.risk_q` is only used by
    /// [`Evaluator::evaluate_pot`].
    pub fn evaluate<E>(
        &self,
        estimator: &mut E,
        init_scores: &[f64],
        scores: &[f64],
        labels: &[u8],
    ) -> Result<EvaluationReport>
    where
        E: ThresholdEstimator + ?Sized,
    {
        ensure_same_length("score", scores.len(), "label", labels.len())?;
        ensure_non_empty("score", scores)?;
        ensure_non_empty("init_score", init_scores)?;
        ensure_binary_labels(labels)?;
        self.settings.validate()?;

        let _span = info_span!("evaluate", len = scores.len()).entered();

        estimator.fit(init_scores, scores)?;
        estimator.initialize(self.settings.level, false)?;
        let run = estimator.run(false, false)?;
        if run.thresholds.len() != scores.len() {
            warn!(
                thresholds = run.thresholds.len(),
                scores = scores.len(),
                "threshold sequence length differs from score length"
            );
        }

        let threshold = reduce_threshold(&run.thresholds)?;
        let tolerance = self.settings.tolerance;
        let predictions = adjust_scores(scores, labels, threshold, tolerance)?;
        let metrics = point_metrics(&predictions, labels)?;

        info!(
            threshold,
            f1 = metrics.f1,
            precision = metrics.precision,
            recall = metrics.recall,
            "evaluation complete"
        );

        Ok(EvaluationReport {
            metrics,
            threshold,
            tolerance,
            predictions,
            thresholds: run.thresholds,
        })
    }

    /// Evaluate with a fresh [`Spot`] estimator at `settings.risk_q`.
    pub fn evaluate_pot(
        &self,
        init_scores: &[f64],
        scores: &[f64],
        labels: &[u8],
    ) -> Result<EvaluationReport> {
        let mut spot = Spot::new(self.settings.risk_q);
        self.evaluate(&mut spot, init_scores, scores, labels)
    }

    /// Evaluate independent inputs in parallel.
    ///
    /// Every input gets its own estimator from `make_estimator`, so no fitted
    /// tail model is shared between sequences. Results keep input order.
    pub fn evaluate_many<E, F>(
        &self,
        inputs: &[EvaluationInput],
        make_estimator: F,
    ) -> Vec<Result<EvaluationReport>>
    where
        E: ThresholdEstimator,
        F: Fn() -> E + Sync,
    {
        inputs
            .par_iter()
            .map(|input| {
                let mut estimator = make_estimator();
                self.evaluate(&mut estimator, &input.init_score, &input.score, &input.label)
            })
            .collect()
    }
}

/// Evaluate with a [`Spot`] estimator at risk `risk_q` and initial `level`,
/// using the default tolerance of 1 step early and 7 steps late.
pub fn pot_eval(
    init_scores: &[f64],
    scores: &[f64],
    labels: &[u8],
    risk_q: f64,
    level: f64,
) -> Result<EvaluationReport> {
    Evaluator::new(EvaluationSettings {
        risk_q,
        level,
        tolerance: ToleranceWindow::default(),
    })
    .evaluate_pot(init_scores, scores, labels)
}
