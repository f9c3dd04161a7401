//! Error analysis between aligned original and decoded frames.
//!
//! Produces the global SNR, a per-frame relative error normalized by the
//! midpoint energy of the two frames, and the per-frame RMS of the original.
//!
//! The global SNR is deliberately asymmetric (the original is the signal) and
//! diverges for a silent original. The per-frame relative error is symmetric
//! in its two inputs.

mod metrics;

#[cfg(test)]
mod tests;

use serde::{Serialize, Serializer};

use crate::align::FrameMatrix;
use crate::error::ShapeError;
use crate::vadpcm::{predictor_histogram, PREDICTOR_SLOTS};

/// Result of comparing an original signal against its decoded counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Global signal-to-noise ratio in decibels.
    #[serde(serialize_with = "serialize_float")]
    pub snr_db: f64,
    /// RMS of the (padded) original over all frames.
    pub signal_rms: f64,
    /// RMS of the difference over all frames.
    pub error_rms: f64,
    /// Number of frames.
    pub frame_count: usize,
    /// Samples per frame.
    pub frame_width: usize,
    /// Relative error of each frame.
    #[serde(serialize_with = "serialize_floats")]
    pub relative_error: Vec<f64>,
    /// RMS of each original frame.
    pub frame_rms: Vec<f64>,
    /// Predictor index of each frame; empty when no container was analyzed.
    pub predictors: Vec<u8>,
}

impl ErrorReport {
    /// Attaches the predictor index of each compressed frame.
    pub fn with_predictors(mut self, predictors: Vec<u8>) -> Self {
        self.predictors = predictors;
        self
    }

    /// Frames per predictor index.
    pub fn predictor_histogram(&self) -> [usize; PREDICTOR_SLOTS] {
        predictor_histogram(&self.predictors)
    }

    /// Iterates over per-frame rows: `(index, predictor, signal_rms, relative_error)`.
    ///
    /// The predictor is `None` when none were attached.
    pub fn frame_rows(&self) -> impl Iterator<Item = FrameRow> + '_ {
        (0..self.frame_count).map(move |index| FrameRow {
            index,
            predictor: self.predictors.get(index).copied(),
            signal_rms: self.frame_rms[index],
            relative_error: self.relative_error[index],
        })
    }
}

/// One frame's entry in an [`ErrorReport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    /// Frame index.
    pub index: usize,
    /// Predictor index.
    pub predictor: Option<u8>,
    /// RMS of the original frame.
    pub signal_rms: f64,
    /// Relative error of the frame.
    pub relative_error: f64,
}

/// Computes the error report for two frame matrices of the same shape.
pub fn analyze(original: &FrameMatrix, decoded: &FrameMatrix) -> Result<ErrorReport, ShapeError> {
    if original.shape() != decoded.shape() {
        return Err(ShapeError {
            original: original.shape(),
            decoded: decoded.shape(),
        });
    }
    let (frame_count, frame_width) = original.shape();

    let mut signal_energy = 0.0;
    let mut noise_energy = 0.0;
    let mut relative_error = Vec::with_capacity(frame_count);
    let mut frame_rms = Vec::with_capacity(frame_count);
    for (o, d) in original.frames().zip(decoded.frames()) {
        let signal = metrics::energy(o);
        signal_energy += signal;
        noise_energy += metrics::error_energy(o, d);
        relative_error.push(metrics::relative_error(o, d));
        frame_rms.push(metrics::rms(signal, frame_width));
    }

    let sample_count = frame_count * frame_width;
    let snr_db = metrics::snr_db(signal_energy, noise_energy);
    tracing::debug!(frame_count, snr_db, "analyzed frames");

    Ok(ErrorReport {
        snr_db,
        signal_rms: metrics::rms(signal_energy, sample_count),
        error_rms: metrics::rms(noise_energy, sample_count),
        frame_count,
        frame_width,
        relative_error,
        frame_rms,
        predictors: Vec::new(),
    })
}

/// JSON has no infinities; non-finite values are written as strings.
fn float_value(value: f64) -> serde_json::Value {
    if value.is_finite() {
        serde_json::json!(value)
    } else if value.is_nan() {
        serde_json::json!("nan")
    } else if value > 0.0 {
        serde_json::json!("inf")
    } else {
        serde_json::json!("-inf")
    }
}

fn serialize_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    float_value(*value).serialize(serializer)
}

#[allow(clippy::ptr_arg)]
fn serialize_floats<S: Serializer>(values: &Vec<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|&v| float_value(v)))
}
