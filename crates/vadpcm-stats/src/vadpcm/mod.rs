//! VADPCM payload extraction and per-frame metadata.
//!
//! A VADPCM `SSND` chunk holds an 8-byte offset/block-size header followed by
//! 9-byte frames. Each frame encodes 16 samples; the high nibble of the first
//! byte is the scale and the low nibble selects the predictor.

mod codebook;


use crate::aiff::{Chunk, FourCc};
use crate::error::FormatError;

pub use codebook::{decode_codebook, Codebook, MAX_ORDER, MAX_PREDICTOR_COUNT};

/// Bytes per encoded VADPCM frame.
pub const FRAME_BYTE_SIZE: usize = 9;
/// Samples per decoded VADPCM frame.
pub const FRAME_SAMPLE_COUNT: usize = 16;
/// Size of the offset/block-size header at the start of `SSND`.
pub const SOUND_DATA_HEADER_SIZE: usize = 8;
/// Number of distinct predictor indexes a frame header can select.
pub const PREDICTOR_SLOTS: usize = 16;

/// A row-major view of compressed frames borrowed from an `SSND` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedFrames<'a> {
    data: &'a [u8],
    frame_byte_size: usize,
}

impl<'a> CompressedFrames<'a> {
    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.data.len() / self.frame_byte_size
    }

    /// Bytes per frame.
    pub fn frame_byte_size(&self) -> usize {
        self.frame_byte_size
    }

    /// Returns frame `index`, if in range.
    pub fn frame(&self, index: usize) -> Option<&'a [u8]> {
        let start = index.checked_mul(self.frame_byte_size)?;
        self.data.get(start..start + self.frame_byte_size)
    }

    /// Iterates over frames in file order.
    pub fn iter(&self) -> std::slice::ChunksExact<'a, u8> {
        self.data.chunks_exact(self.frame_byte_size)
    }

    /// The frame bytes, all frames concatenated.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// `(frame_count, frame_byte_size)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.frame_count(), self.frame_byte_size)
    }
}

/// Locates the `SSND` chunk and splits its payload into compressed frames.
///
/// Uses the first `SSND` chunk. The first 8 bytes of the payload are skipped;
/// the rest must be a whole number of `frame_byte_size` frames.
pub fn extract_compressed_frames<'a>(
    chunks: &[Chunk<'a>],
    frame_byte_size: usize,
) -> Result<CompressedFrames<'a>, FormatError> {
    extract_frames_from(chunks, FourCc::SSND, frame_byte_size)
}

/// Like [`extract_compressed_frames`], with a configurable sound-data tag.
pub fn extract_frames_from<'a>(
    chunks: &[Chunk<'a>],
    tag: FourCc,
    frame_byte_size: usize,
) -> Result<CompressedFrames<'a>, FormatError> {
    let chunk = chunks
        .iter()
        .find(|chunk| chunk.tag == tag)
        .ok_or(FormatError::MissingChunk { tag })?;
    let length = chunk.payload.len();
    let bad_length = FormatError::BadPayloadLength {
        length,
        frame_byte_size,
    };
    if frame_byte_size == 0 || length < SOUND_DATA_HEADER_SIZE {
        return Err(bad_length);
    }
    let data = &chunk.payload[SOUND_DATA_HEADER_SIZE..];
    if data.len() % frame_byte_size != 0 {
        return Err(bad_length);
    }
    tracing::debug!(
        frame_count = data.len() / frame_byte_size,
        frame_byte_size,
        "extracted compressed frames"
    );
    Ok(CompressedFrames {
        data,
        frame_byte_size,
    })
}

/// Returns the predictor index of each frame: the low nibble of its first byte.
pub fn decode_predictors(frames: &CompressedFrames<'_>) -> Vec<u8> {
    frames.iter().map(|frame| frame[0] & 0x0f).collect()
}

/// Counts how many frames use each predictor index.
pub fn predictor_histogram(predictors: &[u8]) -> [usize; PREDICTOR_SLOTS] {
    let mut counts = [0usize; PREDICTOR_SLOTS];
    for &p in predictors {
        counts[usize::from(p & 0x0f)] += 1;
    }
    counts
}
