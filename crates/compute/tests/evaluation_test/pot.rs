use tsad_compute::pipeline::{pot_eval, EvaluationSettings, Evaluator};
use tsad_compute::{EvaluationInput, Spot};
use tsad_core::{EvalError, ToleranceWindow};

use crate::helpers::exp_scores;

/// Normal operation with two injected anomaly segments.
fn operational() -> (Vec<f64>, Vec<u8>) {
    let mut scores = vec![0.5; 120];
    let mut labels = vec![0u8; 120];
    // First segment detected two steps after it starts.
    labels[20..30].fill(1);
    scores[22] = 15.0;
    // Second segment only fires well past the delay window.
    labels[60..80].fill(1);
    scores[75] = 15.0;
    (scores, labels)
}

#[test]
fn pot_eval_end_to_end() {
    let init = exp_scores(2000, 1.0);
    let (scores, labels) = operational();

    let report = pot_eval(&init, &scores, &labels, 1e-3, 0.96).unwrap();

    assert!(report.threshold() > 3.0 && report.threshold() < 15.0);
    assert_eq!(report.thresholds().len(), scores.len());
    assert!(report.predictions()[20..30].iter().all(|&p| p == 1));
    assert!(report.predictions()[60..80].iter().all(|&p| p == 0));
    assert_eq!(report.metrics().counts.tp, 10.0);
    assert_eq!(report.metrics().counts.fn_, 20.0);
    assert_eq!(report.metrics().counts.fp, 0.0);
    assert!((report.metrics().recall - 1.0 / 3.0).abs() < 1e-4);
}

#[test]
fn wider_delay_credits_the_late_segment() {
    let init = exp_scores(2000, 1.0);
    let (scores, labels) = operational();
    let settings = EvaluationSettings {
        risk_q: 1e-3,
        level: 0.96,
        tolerance: ToleranceWindow::new(1, 20),
    };

    let report = Evaluator::new(settings)
        .evaluate_pot(&init, &scores, &labels)
        .unwrap();
    assert_eq!(report.metrics().counts.tp, 30.0);
    assert!(report.metrics().f1 > 0.99);
}

#[test]
fn degenerate_calibration_fails_estimation() {
    let (scores, labels) = operational();
    let err = pot_eval(&[1.0; 100], &scores, &labels, 1e-3, 0.96).unwrap_err();
    assert!(matches!(err, EvalError::EstimationFailure { .. }));
}

#[test]
fn batch_evaluation_keeps_order_and_isolates_failures() {
    let (scores, labels) = operational();
    let inputs = vec![
        EvaluationInput {
            name: Some("good".into()),
            init_score: exp_scores(2000, 1.0),
            score: scores.clone(),
            label: labels.clone(),
        },
        EvaluationInput {
            name: Some("flat".into()),
            init_score: vec![1.0; 100],
            score: scores.clone(),
            label: labels.clone(),
        },
        EvaluationInput {
            name: Some("short".into()),
            init_score: exp_scores(2000, 1.0),
            score: scores[..10].to_vec(),
            label: labels.clone(),
        },
    ];

    let evaluator = Evaluator::new(EvaluationSettings {
        risk_q: 1e-3,
        ..EvaluationSettings::default()
    });
    let results = evaluator.evaluate_many(&inputs, || Spot::new(1e-3));

    assert_eq!(results.len(), 3);
    let single = evaluator.evaluate_pot(&inputs[0].init_score, &scores, &labels).unwrap();
    assert_eq!(results[0].as_ref().unwrap(), &single);
    assert!(matches!(results[1], Err(EvalError::EstimationFailure { .. })));
    assert!(matches!(results[2], Err(EvalError::LengthMismatch { .. })));
}

#[test]
fn inputs_round_trip_through_a_file() {
    let (scores, labels) = operational();
    let input = EvaluationInput {
        name: Some("machine-1-1".into()),
        init_score: exp_scores(500, 1.0),
        score: scores,
        label: labels,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.json");
    std::fs::write(&path, serde_json::to_string(&input).unwrap()).unwrap();

    let loaded = tsad_compute::input::load_inputs(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, input.name);
    assert_eq!(loaded[0].label, input.label);
    assert_eq!(loaded[0].score, input.score);
    assert_eq!(loaded[0].init_score.len(), input.init_score.len());
    for (a, b) in loaded[0].init_score.iter().zip(&input.init_score) {
        assert!((a - b).abs() < 1e-12);
    }
}
