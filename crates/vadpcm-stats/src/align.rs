//! Alignment of original and decoded sample streams to compressed frames.
//!
//! The decoder always emits whole frames, so the decoded stream is a multiple
//! of the frame width. The original may end mid-frame; it is zero-padded to
//! the next frame boundary. The decoded stream is never padded.

use serde::Serialize;

use crate::error::AlignmentError;

/// Samples arranged as `frame_count` rows of `frame_width` samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameMatrix {
    samples: Vec<f64>,
    frame_width: usize,
}

impl FrameMatrix {
    /// Wraps a sample buffer whose length is a multiple of `frame_width`.
    ///
    /// Returns `None` if the width is zero or does not divide the length.
    pub fn new(samples: Vec<f64>, frame_width: usize) -> Option<Self> {
        if frame_width == 0 || samples.len() % frame_width != 0 {
            return None;
        }
        Some(Self {
            samples,
            frame_width,
        })
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.frame_width
    }

    /// Samples per frame.
    pub fn frame_width(&self) -> usize {
        self.frame_width
    }

    /// `(frame_count, frame_width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.frame_count(), self.frame_width)
    }

    /// Returns frame `index`, if in range.
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.frame_width)?;
        self.samples.get(start..start + self.frame_width)
    }

    /// Iterates over frames in order.
    pub fn frames(&self) -> std::slice::ChunksExact<'_, f64> {
        self.samples.chunks_exact(self.frame_width)
    }

    /// All samples, row-major.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

/// Number of zeros needed to pad `len` to a multiple of `frame_width`.
///
/// Always in `0..frame_width`.
pub fn padding_for(len: usize, frame_width: usize) -> usize {
    (frame_width - len % frame_width) % frame_width
}

/// Pads the original, checks both lengths against the frame count, and
/// reshapes both streams into frames.
pub fn align(
    original: &[f64],
    decoded: &[f64],
    frame_sample_width: usize,
    frame_count: usize,
) -> Result<(FrameMatrix, FrameMatrix), AlignmentError> {
    if frame_sample_width == 0 {
        return Err(AlignmentError::ZeroFrameWidth);
    }
    let padding = padding_for(original.len(), frame_sample_width);
    let padded_len = original.len() + padding;
    let expected = frame_count * frame_sample_width;
    if padded_len != expected {
        return Err(AlignmentError::FrameCount {
            original: padded_len,
            expected,
            frame_count,
        });
    }
    if decoded.len() != padded_len {
        return Err(AlignmentError::DecodedLength {
            original: padded_len,
            decoded: decoded.len(),
        });
    }
    tracing::debug!(
        original_len = original.len(),
        padding,
        frame_count,
        "aligned sample streams"
    );

    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(original);
    padded.resize(padded_len, 0.0);

    Ok((
        FrameMatrix {
            samples: padded,
            frame_width: frame_sample_width,
        },
        FrameMatrix {
            samples: decoded.to_vec(),
            frame_width: frame_sample_width,
        },
    ))
}
