//! Unit tests for error analysis.

use super::metrics::{relative_error, snr_db};
use super::*;
use crate::align::align;

fn sine(len: usize, amplitude: f64) -> Vec<f64> {
    (0..len)
        .map(|i| (i as f64 * 0.2).sin() * amplitude)
        .collect()
}

fn matrices(original: &[f64], decoded: &[f64]) -> (FrameMatrix, FrameMatrix) {
    let frame_count = decoded.len() / 16;
    align(original, decoded, 16, frame_count).unwrap()
}

#[test]
fn test_identical_signals() {
    let signal = sine(64, 0.5);
    let (a, b) = matrices(&signal, &signal);
    let report = analyze(&a, &b).unwrap();

    assert_eq!(report.snr_db, f64::INFINITY);
    assert_eq!(report.relative_error, vec![0.0; 4]);
    assert_eq!(report.error_rms, 0.0);
    assert_eq!(report.frame_count, 4);
    assert_eq!(report.frame_width, 16);
}

#[test]
fn test_silence_against_silence() {
    let silence = vec![0.0; 32];
    let (a, b) = matrices(&silence, &silence);
    let report = analyze(&a, &b).unwrap();
    assert_eq!(report.snr_db, f64::INFINITY);
    assert_eq!(report.relative_error, vec![0.0, 0.0]);
    assert_eq!(report.frame_rms, vec![0.0, 0.0]);
}

#[test]
fn test_silent_original_with_noise_diverges() {
    let silence = vec![0.0; 16];
    let noise = vec![0.01; 16];
    let (a, b) = matrices(&silence, &noise);
    let report = analyze(&a, &b).unwrap();
    assert_eq!(report.snr_db, f64::NEG_INFINITY);
}

#[test]
fn test_snr_known_value() {
    // Constant error of one tenth the amplitude: 20 dB.
    let original = vec![1.0; 16];
    let decoded = vec![1.1; 16];
    let (a, b) = matrices(&original, &decoded);
    let report = analyze(&a, &b).unwrap();
    assert!((report.snr_db - 20.0).abs() < 1e-9, "snr {}", report.snr_db);
    assert!((report.signal_rms - 1.0).abs() < 1e-12);
    assert!((report.error_rms - 0.1).abs() < 1e-9);
}

#[test]
fn test_relative_error_uses_midpoint() {
    let original = [1.0; 4];
    let decoded = [3.0; 4];
    // delta^2 = 4 per sample, mid^2 = 4 per sample.
    assert_eq!(relative_error(&original, &decoded), 1.0);
}

#[test]
fn test_relative_error_is_symmetric() {
    let original = sine(48, 0.7);
    let decoded: Vec<f64> = original
        .iter()
        .enumerate()
        .map(|(i, s)| s + (i as f64 * 1.3).cos() * 0.05)
        .collect();
    let (a, b) = matrices(&original, &decoded);
    let forward = analyze(&a, &b).unwrap();
    let backward = analyze(&b, &a).unwrap();
    assert_eq!(forward.relative_error, backward.relative_error);
}

#[test]
fn test_frame_rms() {
    let mut original = vec![0.0; 32];
    original[16..].iter_mut().for_each(|s| *s = 0.5);
    let (a, b) = matrices(&original, &original);
    let report = analyze(&a, &b).unwrap();
    assert_eq!(report.frame_rms, vec![0.0, 0.5]);
}

#[test]
fn test_shape_mismatch() {
    let a = FrameMatrix::new(vec![0.0; 32], 16).unwrap();
    let b = FrameMatrix::new(vec![0.0; 48], 16).unwrap();
    assert_eq!(
        analyze(&a, &b),
        Err(ShapeError {
            original: (2, 16),
            decoded: (3, 16)
        })
    );
    let c = FrameMatrix::new(vec![0.0; 32], 8).unwrap();
    assert!(analyze(&a, &c).is_err());
}

#[test]
fn test_snr_db_edge_cases() {
    assert_eq!(snr_db(0.0, 0.0), f64::INFINITY);
    assert_eq!(snr_db(1.0, 0.0), f64::INFINITY);
    assert_eq!(snr_db(0.0, 1.0), f64::NEG_INFINITY);
    assert!((snr_db(100.0, 1.0) - 20.0).abs() < 1e-12);
}

#[test]
fn test_predictors_and_rows() {
    let signal = sine(32, 0.25);
    let (a, b) = matrices(&signal, &signal);
    let report = analyze(&a, &b).unwrap();
    assert!(report.frame_rows().all(|row| row.predictor.is_none()));

    let report = report.with_predictors(vec![1, 3]);
    let rows: Vec<_> = report.frame_rows().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].index, 1);
    assert_eq!(rows[1].predictor, Some(3));
    let histogram = report.predictor_histogram();
    assert_eq!(histogram[1], 1);
    assert_eq!(histogram[3], 1);
}

#[test]
fn test_report_json_encodes_infinity() {
    let signal = sine(16, 0.25);
    let (a, b) = matrices(&signal, &signal);
    let report = analyze(&a, &b).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["snr_db"], "inf");
    assert_eq!(json["relative_error"][0], 0.0);
    assert_eq!(json["frame_count"], 1);
}
