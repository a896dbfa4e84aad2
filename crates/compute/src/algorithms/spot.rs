//! SPOT: streaming peaks-over-threshold threshold estimation.
//!
//! Calibration scores set an initial cutoff at an empirical quantile. The
//! exceedances above that cutoff are fitted with a generalized Pareto
//! distribution, which yields the extreme quantile `z_q`: the score a normal
//! point exceeds with probability `q`. In dynamic mode each operational
//! point below `z_q` that still exceeds the cutoff is absorbed as a new peak
//! and the tail is refitted.

use tracing::{debug, warn};

use tsad_core::series::ensure_non_empty;
use tsad_core::{EvalError, Result};

use super::gpd::{grimshaw, GpdFit};
use crate::pipeline::estimator::{ThresholdEstimator, ThresholdRun};

/// Tail model state established by [`Spot::initialize`].
#[derive(Debug, Clone)]
struct TailModel {
    init_threshold: f64,
    peaks: Vec<f64>,
    /// Number of observations seen so far (calibration + absorbed).
    n: usize,
    fit: GpdFit,
    extreme_quantile: f64,
}

impl TailModel {
    fn quantile(&self, risk_q: f64) -> f64 {
        let r = risk_q * self.n as f64 / self.peaks.len() as f64;
        let GpdFit { gamma, sigma, .. } = self.fit;
        if gamma != 0.0 {
            self.init_threshold + sigma / gamma * (r.powf(-gamma) - 1.0)
        } else {
            self.init_threshold - sigma * r.ln()
        }
    }

    fn absorb(&mut self, value: f64, risk_q: f64) {
        self.peaks.push(value - self.init_threshold);
        self.n += 1;
        self.fit = grimshaw(&self.peaks);
        self.extreme_quantile = self.quantile(risk_q);
    }
}

/// Peaks-over-threshold estimator.
///
/// One instance serves one score sequence: `fit` → `initialize` → `run`.
#[derive(Debug, Clone)]
pub struct Spot {
    risk_q: f64,
    init_data: Vec<f64>,
    data: Vec<f64>,
    /// -1 when fitting the lower tail, so the math always sees an upper tail.
    sign: f64,
    model: Option<TailModel>,
}

impl Spot {
    pub fn new(risk_q: f64) -> Self {
        Self {
            risk_q,
            init_data: Vec::new(),
            data: Vec::new(),
            sign: 1.0,
            model: None,
        }
    }

    pub fn risk_q(&self) -> f64 {
        self.risk_q
    }

    /// Initial cutoff, in input score units, once initialized.
    pub fn init_threshold(&self) -> Option<f64> {
        self.model.as_ref().map(|m| self.sign * m.init_threshold)
    }

    /// Current extreme quantile, in input score units, once initialized.
    pub fn extreme_quantile(&self) -> Option<f64> {
        self.model.as_ref().map(|m| self.sign * m.extreme_quantile)
    }

    /// Current GPD fit of the exceedances, once initialized.
    pub fn tail_fit(&self) -> Option<GpdFit> {
        self.model.as_ref().map(|m| m.fit)
    }
}

impl ThresholdEstimator for Spot {
    fn fit(&mut self, init_data: &[f64], data: &[f64]) -> Result<()> {
        ensure_non_empty("init_score", init_data)?;
        if let Some(i) = init_data.iter().position(|x| !x.is_finite()) {
            return Err(EvalError::estimation(format!(
                "calibration score at index {i} is not finite"
            )));
        }
        self.init_data = init_data.to_vec();
        self.data = data.to_vec();
        self.model = None;
        Ok(())
    }

    fn initialize(&mut self, level: f64, min_extrema: bool) -> Result<()> {
        if !(self.risk_q > 0.0 && self.risk_q < 1.0) {
            return Err(EvalError::InvalidParameter(format!(
                "risk quantile q must be in (0, 1), got {}",
                self.risk_q
            )));
        }
        if !(0.0..1.0).contains(&level) {
            return Err(EvalError::InvalidParameter(format!(
                "level must be in [0, 1), got {level}"
            )));
        }
        if self.init_data.is_empty() {
            return Err(EvalError::estimation("initialize called before fit"));
        }

        self.sign = if min_extrema { -1.0 } else { 1.0 };
        let sign = self.sign;

        let mut sorted: Vec<f64> = self.init_data.iter().map(|&x| sign * x).collect();
        sorted.sort_by(f64::total_cmp);
        let n_init = sorted.len();
        let idx = ((level * n_init as f64) as usize).min(n_init - 1);
        let init_threshold = sorted[idx];

        let peaks: Vec<f64> = sorted
            .iter()
            .filter(|&&x| x > init_threshold)
            .map(|&x| x - init_threshold)
            .collect();
        if peaks.is_empty() {
            warn!(level, init_threshold = sign * init_threshold, "no exceedances above initial threshold");
            return Err(EvalError::EstimationFailure {
                reason: "no calibration score exceeds the initial threshold".into(),
                threshold: Some(sign * init_threshold),
            });
        }

        let fit = grimshaw(&peaks);
        let mut model = TailModel {
            init_threshold,
            peaks,
            n: n_init,
            fit,
            extreme_quantile: 0.0,
        };
        model.extreme_quantile = model.quantile(self.risk_q);

        debug!(
            init_threshold = sign * init_threshold,
            peaks = model.peaks.len(),
            gamma = fit.gamma,
            sigma = fit.sigma,
            extreme_quantile = sign * model.extreme_quantile,
            "initialized tail model"
        );

        self.model = Some(model);
        Ok(())
    }

    fn run(&mut self, dynamic: bool, with_alarm: bool) -> Result<ThresholdRun> {
        let risk_q = self.risk_q;
        let sign = self.sign;
        let model = self
            .model
            .as_mut()
            .ok_or_else(|| EvalError::estimation("run called before initialize"))?;

        let mut thresholds = Vec::with_capacity(self.data.len());
        let mut alarms = Vec::new();

        for (i, &raw) in self.data.iter().enumerate() {
            let x = sign * raw;
            if dynamic {
                if x > model.extreme_quantile {
                    if with_alarm {
                        alarms.push(i);
                    } else {
                        model.absorb(x, risk_q);
                    }
                } else if x > model.init_threshold {
                    model.absorb(x, risk_q);
                } else {
                    model.n += 1;
                }
            } else if with_alarm && x > model.extreme_quantile {
                alarms.push(i);
            }
            thresholds.push(sign * model.extreme_quantile);
        }

        Ok(ThresholdRun { thresholds, alarms })
    }
}
