//! Generalized Pareto distribution fitting for peaks-over-threshold.
//!
//! Maximum-likelihood fit via Grimshaw's reduction: with `theta = gamma / sigma`
//! the likelihood equations collapse to one equation `w(theta) = 0`, where
//! `w(t) = u(t) * v(t) - 1`, `u(t) = 1 + mean(ln(1 + t*y))` and
//! `v(t) = mean(1 / (1 + t*y))`. Candidate roots are found on both sides of
//! zero and the candidate with the best log-likelihood wins, with the
//! exponential tail (`gamma = 0`) as the fallback.

use serde::{Deserialize, Serialize};

/// Offset keeping the root search away from the trivial root at 0 and from
/// the pole at `-1 / max(y)`.
pub const GRIMSHAW_EPSILON: f64 = 1e-8;

/// Grid points scanned per search interval.
const GRID_POINTS: usize = 50;

const BISECTION_STEPS: usize = 100;

/// Fitted GPD parameters for a set of exceedances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpdFit {
    /// Shape parameter.
    pub gamma: f64,
    /// Scale parameter.
    pub sigma: f64,
    pub log_likelihood: f64,
}

/// GPD log-likelihood of `peaks` (all > 0) under shape `gamma` and scale `sigma`.
///
/// Returns `-inf` outside the distribution's support.
pub fn log_likelihood(peaks: &[f64], gamma: f64, sigma: f64) -> f64 {
    let n = peaks.len() as f64;
    if sigma <= 0.0 || peaks.is_empty() {
        return f64::NEG_INFINITY;
    }
    if gamma == 0.0 {
        return -n * (sigma.ln() + mean(peaks) / sigma);
    }

    let tau = gamma / sigma;
    let mut log_sum = 0.0;
    for &y in peaks {
        let s = 1.0 + tau * y;
        if s <= 0.0 {
            return f64::NEG_INFINITY;
        }
        log_sum += s.ln();
    }
    -n * sigma.ln() - (1.0 + 1.0 / gamma) * log_sum
}

/// Fit a GPD to `peaks` with Grimshaw's method.
///
/// `peaks` must be non-empty and strictly positive; callers build them as
/// exceedances above a cutoff.
pub fn grimshaw(peaks: &[f64]) -> GpdFit {
    let y_min = peaks.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = peaks.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_mean = mean(peaks);

    let mut candidates = Vec::new();

    // Negative side: theta in (-1/y_max, 0).
    let pole = 1.0 / y_max;
    if pole > 2.0 * GRIMSHAW_EPSILON {
        let mut grid: Vec<f64> = geometric_grid(GRIMSHAW_EPSILON, pole - GRIMSHAW_EPSILON)
            .into_iter()
            .map(|m| -m)
            .collect();
        grid.reverse();
        candidates.extend(find_roots(|t| w(peaks, t), &grid));
    }

    // Positive side: theta in (0, 2 (mean - min) / min^2).
    let upper = 2.0 * (y_mean - y_min) / (y_min * y_min);
    if upper.is_finite() && upper > 2.0 * GRIMSHAW_EPSILON {
        let grid = geometric_grid(GRIMSHAW_EPSILON, upper);
        candidates.extend(find_roots(|t| w(peaks, t), &grid));
    }

    let mut best = GpdFit {
        gamma: 0.0,
        sigma: y_mean,
        log_likelihood: log_likelihood(peaks, 0.0, y_mean),
    };

    for theta in candidates {
        let gamma = peaks.iter().map(|&y| (1.0 + theta * y).ln()).sum::<f64>() / peaks.len() as f64;
        let sigma = gamma / theta;
        let ll = log_likelihood(peaks, gamma, sigma);
        if ll.is_finite() && ll > best.log_likelihood {
            best = GpdFit {
                gamma,
                sigma,
                log_likelihood: ll,
            };
        }
    }

    best
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn w(peaks: &[f64], t: f64) -> f64 {
    let n = peaks.len() as f64;
    let mut log_sum = 0.0;
    let mut inv_sum = 0.0;
    for &y in peaks {
        let s = 1.0 + t * y;
        log_sum += s.ln();
        inv_sum += 1.0 / s;
    }
    (1.0 + log_sum / n) * (inv_sum / n) - 1.0
}

/// `GRID_POINTS` values spaced geometrically over `[lo, hi]`, `0 < lo < hi`.
fn geometric_grid(lo: f64, hi: f64) -> Vec<f64> {
    let ratio = (hi / lo).powf(1.0 / (GRID_POINTS - 1) as f64);
    (0..GRID_POINTS).map(|i| lo * ratio.powi(i as i32)).collect()
}

/// Roots of `f` located by sign changes between consecutive grid points,
/// refined by bisection.
fn find_roots<F: Fn(f64) -> f64>(f: F, grid: &[f64]) -> Vec<f64> {
    let values: Vec<f64> = grid.iter().map(|&x| f(x)).collect();
    let mut roots = Vec::new();

    for i in 0..grid.len().saturating_sub(1) {
        let (mut a, mut b) = (grid[i], grid[i + 1]);
        let (mut fa, fb) = (values[i], values[i + 1]);
        if !fa.is_finite() || !fb.is_finite() {
            continue;
        }
        if fa == 0.0 {
            roots.push(a);
            continue;
        }
        if fa * fb > 0.0 {
            continue;
        }
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (a + b);
            let fm = f(mid);
            if fa * fm <= 0.0 {
                b = mid;
            } else {
                a = mid;
                fa = fm;
            }
        }
        roots.push(0.5 * (a + b));
    }

    roots
}
