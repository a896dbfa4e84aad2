use tsad_compute::pipeline::{adjust_predicts, credited_segments, point_metrics};
use tsad_core::{segments, ToleranceWindow};

use crate::helpers::{binary_sequences, normal_indices};

const MAX_LEN: usize = 7;

const WINDOWS: [ToleranceWindow; 4] = [
    ToleranceWindow::new(0, 0),
    ToleranceWindow::new(0, 1),
    ToleranceWindow::new(1, 7),
    ToleranceWindow::new(3, 2),
];

#[test]
fn metrics_are_finite_and_counts_sum_to_length() {
    for n in 1..=MAX_LEN {
        for predict in binary_sequences(n) {
            for actual in binary_sequences(n) {
                let m = point_metrics(&predict, &actual).unwrap();
                let (f1, p, r, ..) = m.as_tuple();
                assert!(f1.is_finite() && p.is_finite() && r.is_finite());
                assert_eq!(m.counts.total(), n as f64);
            }
        }
    }
}

#[test]
fn identical_sequences_score_one() {
    for n in 1..=MAX_LEN {
        for x in binary_sequences(n).filter(|x| x.contains(&1)) {
            let m = point_metrics(&x, &x).unwrap();
            assert!((m.precision - 1.0).abs() < 1e-4, "{x:?}");
            assert!((m.recall - 1.0).abs() < 1e-4, "{x:?}");
            assert!((m.f1 - 1.0).abs() < 1e-4, "{x:?}");
        }
    }
}

#[test]
fn normal_segments_are_untouched() {
    for n in 1..=MAX_LEN {
        for labels in binary_sequences(n) {
            let normal = normal_indices(&labels);
            for predict in binary_sequences(n) {
                for window in WINDOWS {
                    let out = adjust_predicts(&predict, &labels, window).unwrap();
                    assert_eq!(out.len(), n);
                    for &i in &normal {
                        assert_eq!(out[i], predict[i], "labels={labels:?} predict={predict:?}");
                    }
                }
            }
        }
    }
}

#[test]
fn anomaly_segments_are_uniform() {
    for n in 1..=MAX_LEN {
        for labels in binary_sequences(n) {
            for predict in binary_sequences(n) {
                for window in WINDOWS {
                    let out = adjust_predicts(&predict, &labels, window).unwrap();
                    for seg in segments(&labels).filter(|s| s.kind.is_anomaly()) {
                        let first = out[seg.start];
                        assert!(out[seg.range()].iter().all(|&v| v == first));
                    }
                    assert!(out.iter().all(|&v| v <= 1));
                }
            }
        }
    }
}

#[test]
fn larger_delay_never_loses_credit() {
    for n in 1..=MAX_LEN {
        for labels in binary_sequences(n) {
            for predict in binary_sequences(n) {
                for advance in 0..3 {
                    let mut previous = 0;
                    for delay in 0..=n {
                        let window = ToleranceWindow::new(advance, delay);
                        let credited = credited_segments(&predict, &labels, window).unwrap();
                        assert!(credited >= previous, "labels={labels:?} predict={predict:?}");
                        previous = credited;
                    }
                }
            }
        }
    }
}

#[test]
fn credited_segments_match_adjusted_output() {
    for n in 1..=MAX_LEN {
        for labels in binary_sequences(n) {
            for predict in binary_sequences(n) {
                let window = ToleranceWindow::default();
                let out = adjust_predicts(&predict, &labels, window).unwrap();
                let detected = segments(&labels)
                    .filter(|s| s.kind.is_anomaly() && out[s.start] == 1)
                    .count();
                assert_eq!(credited_segments(&predict, &labels, window).unwrap(), detected);
            }
        }
    }
}
