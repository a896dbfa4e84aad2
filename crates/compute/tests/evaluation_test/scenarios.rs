use tsad_compute::pipeline::{adjust_predicts, adjust_scores, Evaluator};
use tsad_core::{EvalError, ToleranceWindow};

use crate::helpers::MockEstimator;

const LABEL: [u8; 7] = [0, 0, 1, 1, 1, 0, 0];

#[test]
fn hit_inside_delay_window_credits_whole_segment() {
    let predict = [0, 0, 0, 1, 0, 0, 0];
    let adjusted = adjust_predicts(&predict, &LABEL, ToleranceWindow::new(0, 1)).unwrap();
    assert_eq!(adjusted, vec![0, 0, 1, 1, 1, 0, 0]);
}

#[test]
fn hit_after_segment_end_passes_through_unchanged() {
    let predict = [0, 0, 0, 0, 0, 1, 0];
    let adjusted = adjust_predicts(&predict, &LABEL, ToleranceWindow::new(0, 1)).unwrap();
    assert_eq!(adjusted, vec![0, 0, 0, 0, 0, 1, 0]);
}

#[test]
fn score_and_label_length_mismatch() {
    let err = adjust_scores(&[0.0; 10], &[0; 9], 0.5, ToleranceWindow::default()).unwrap_err();
    match err {
        EvalError::LengthMismatch {
            left,
            left_len,
            right,
            right_len,
        } => {
            assert_eq!((left, left_len, right, right_len), ("score", 10, "label", 9));
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }

    let mut mock = MockEstimator {
        thresholds: vec![0.5; 10],
    };
    assert!(matches!(
        Evaluator::default().evaluate(&mut mock, &[0.0], &[0.0; 10], &[0; 9]),
        Err(EvalError::LengthMismatch { .. })
    ));
}

#[test]
fn nan_thresholds_raise_estimation_failure() {
    let mut mock = MockEstimator {
        thresholds: vec![f64::NAN, f64::NAN],
    };
    let err = Evaluator::default()
        .evaluate(&mut mock, &[0.1, 0.2], &[0.3, 0.9], &[0, 1])
        .unwrap_err();
    match err {
        EvalError::EstimationFailure { threshold, .. } => {
            assert!(threshold.is_some_and(f64::is_nan));
        }
        other => panic!("expected EstimationFailure, got {other:?}"),
    }
}

#[test]
fn empty_sequences_are_rejected() {
    let mut mock = MockEstimator {
        thresholds: vec![0.5],
    };
    assert!(matches!(
        Evaluator::default().evaluate(&mut mock, &[0.1], &[], &[]),
        Err(EvalError::EmptyInput { .. })
    ));
}
