//! Segment-credited prediction adjustment.
//!
//! A detector that fires anywhere inside the tolerance window around the start
//! of a ground-truth anomaly segment is credited with the whole segment. One
//! that misses the window gets nothing for that segment, even if it fired
//! later inside it. Predictions in normal segments are never revised.

use tracing::debug;

use tsad_core::series::{ensure_binary_labels, ensure_non_empty, ensure_same_length};
use tsad_core::{segments, Result, ToleranceWindow};

/// Threshold a score sequence: a point is anomalous when `score > threshold`.
pub fn threshold_predicts(scores: &[f64], threshold: f64) -> Vec<u8> {
    scores.iter().map(|&s| u8::from(s > threshold)).collect()
}

/// Adjust a raw predicate against ground-truth `labels`.
///
/// Returns a fresh binary vector; `predict` is left untouched. Any nonzero
/// prediction counts as a hit and is written as 1. Anomaly segments in the
/// output are uniformly 0 or 1, normal segments equal the input.
pub fn adjust_predicts(
    predict: &[u8],
    labels: &[u8],
    window: ToleranceWindow,
) -> Result<Vec<u8>> {
    check_inputs("predict", predict.len(), labels)?;

    let mut adjusted: Vec<u8> = predict.iter().map(|&p| u8::from(p != 0)).collect();
    let mut credited = 0usize;
    let mut missed = 0usize;

    for segment in segments(labels).filter(|s| s.kind.is_anomaly()) {
        let hit = predict[window.credit_range(&segment)]
            .iter()
            .any(|&p| p != 0);
        let fill = u8::from(hit);
        adjusted[segment.range()].fill(fill);
        if hit {
            credited += 1;
        } else {
            missed += 1;
        }
    }

    debug!(
        len = labels.len(),
        advance = window.advance,
        delay = window.delay,
        credited,
        missed,
        "adjusted predictions"
    );

    Ok(adjusted)
}

/// Threshold `scores` and adjust the result against `labels`.
pub fn adjust_scores(
    scores: &[f64],
    labels: &[u8],
    threshold: f64,
    window: ToleranceWindow,
) -> Result<Vec<u8>> {
    check_inputs("score", scores.len(), labels)?;
    adjust_predicts(&threshold_predicts(scores, threshold), labels, window)
}

/// Number of anomaly segments that receive credit under `window`.
pub fn credited_segments(
    predict: &[u8],
    labels: &[u8],
    window: ToleranceWindow,
) -> Result<usize> {
    check_inputs("predict", predict.len(), labels)?;
    Ok(segments(labels)
        .filter(|s| s.kind.is_anomaly())
        .filter(|s| predict[window.credit_range(s)].iter().any(|&p| p != 0))
        .count())
}

fn check_inputs(what: &'static str, len: usize, labels: &[u8]) -> Result<()> {
    ensure_same_length(what, len, "label", labels.len())?;
    ensure_non_empty("label", labels)?;
    ensure_binary_labels(labels)
}
