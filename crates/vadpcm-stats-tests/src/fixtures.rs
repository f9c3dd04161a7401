//! Test fixture utilities for building containers, signals, and corpora.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use vadpcm_stats::aiff::{u32_to_extended, write_container, Chunk, FourCc};
use vadpcm_stats::pcm::encode_aiff;
use vadpcm_stats::{FRAME_BYTE_SIZE, FRAME_SAMPLE_COUNT};

/// A sine wave of `len` samples with the given period (in samples) and peak.
pub fn sine(len: usize, period: f64, amplitude: f64) -> Vec<f64> {
    (0..len)
        .map(|i| (i as f64 * std::f64::consts::TAU / period).sin() * amplitude)
        .collect()
}

/// Compressed frame bytes with the given predictor indices.
///
/// The scale nibble and the packed residuals are arbitrary but fixed.
pub fn vadpcm_frames(predictors: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(predictors.len() * FRAME_BYTE_SIZE);
    for (i, &predictor) in predictors.iter().enumerate() {
        data.push(0x30 | (predictor & 0x0f));
        data.extend((1..FRAME_BYTE_SIZE).map(|j| (i * 31 + j * 7) as u8));
    }
    data
}

/// An `SSND` payload: the 8-byte offset/block-size header, then `data`.
pub fn ssnd_payload(data: &[u8]) -> Vec<u8> {
    let mut payload = vec![0u8; 8];
    payload.extend_from_slice(data);
    payload
}

/// An AIFF-C `COMM` payload for mono 16-bit VADPCM.
pub fn vadpcm_comm(sample_frames: u32, sample_rate: u32) -> Vec<u8> {
    let mut comm = Vec::with_capacity(24);
    comm.extend_from_slice(&1u16.to_be_bytes());
    comm.extend_from_slice(&sample_frames.to_be_bytes());
    comm.extend_from_slice(&16u16.to_be_bytes());
    comm.extend_from_slice(&u32_to_extended(sample_rate));
    comm.extend_from_slice(&FourCc::VAPC.0);
    // Empty compression name, padded to even length.
    comm.extend_from_slice(&[0, 0]);
    comm
}

/// An `APPL` payload holding a codebook with zeroed vectors.
pub fn codebook_payload(order: u16, predictor_count: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"stoc");
    payload.extend_from_slice(b"\x0bVADPCMCODES");
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&order.to_be_bytes());
    payload.extend_from_slice(&predictor_count.to_be_bytes());
    let vectors = usize::from(order) * usize::from(predictor_count);
    payload.resize(payload.len() + vectors * 16, 0);
    payload
}

/// Builds AIFF-C containers chunk by chunk.
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    chunks: Vec<(FourCc, Vec<u8>)>,
}

impl ContainerBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk.
    pub fn chunk(mut self, tag: FourCc, payload: Vec<u8>) -> Self {
        self.chunks.push((tag, payload));
        self
    }

    /// Appends a typical VADPCM layout: `COMM`, codebook `APPL`, and `SSND`
    /// holding one frame per predictor index.
    pub fn vadpcm(self, predictors: &[u8]) -> Self {
        let sample_frames = (predictors.len() * FRAME_SAMPLE_COUNT) as u32;
        self.chunk(FourCc::COMM, vadpcm_comm(sample_frames, 22050))
            .chunk(FourCc::APPL, codebook_payload(2, 4))
            .chunk(FourCc::SSND, ssnd_payload(&vadpcm_frames(predictors)))
    }

    /// Serializes an AIFF-C `FORM` container.
    pub fn build(&self) -> Vec<u8> {
        let chunks: Vec<Chunk<'_>> = self
            .chunks
            .iter()
            .map(|(tag, payload)| Chunk::new(*tag, payload))
            .collect();
        write_container(FourCc::AIFC, &chunks)
    }
}

/// Three directories of original, encoded, and decoded files.
pub struct CorpusFixture {
    pub root: TempDir,
    pub original_dir: PathBuf,
    pub encoded_dir: PathBuf,
    pub decoded_dir: PathBuf,
}

impl CorpusFixture {
    /// Create a new empty corpus.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let original_dir = root.path().join("original");
        let encoded_dir = root.path().join("encoded");
        let decoded_dir = root.path().join("decoded");
        for dir in [&original_dir, &encoded_dir, &decoded_dir] {
            fs::create_dir_all(dir).expect("Failed to create corpus dir");
        }
        Self {
            root,
            original_dir,
            encoded_dir,
            decoded_dir,
        }
    }

    /// Get the corpus root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Add one triple under `name` (a relative path without extension).
    ///
    /// The decoded stream is the original scaled by `gain`, padded with
    /// silence to a whole number of frames, then resized to `decoded_len`
    /// when given.
    pub fn add(
        &self,
        name: &str,
        original: &[f64],
        gain: f64,
        decoded_len: Option<usize>,
    ) -> PathBuf {
        let frame_count = original.len().div_ceil(FRAME_SAMPLE_COUNT);
        let predictors: Vec<u8> = (0..frame_count).map(|i| (i % 4) as u8).collect();
        let mut decoded: Vec<f64> = original.iter().map(|s| s * gain).collect();
        decoded.resize(
            decoded_len.unwrap_or(frame_count * FRAME_SAMPLE_COUNT),
            0.0,
        );

        let original_path = self.write(&self.original_dir, name, "aiff", encode_aiff(original, 22050));
        self.write(
            &self.encoded_dir,
            name,
            "aifc",
            ContainerBuilder::new().vadpcm(&predictors).build(),
        );
        self.write(&self.decoded_dir, name, "aiff", encode_aiff(&decoded, 22050));
        original_path
    }

    fn write(&self, dir: &Path, name: &str, extension: &str, data: Vec<u8>) -> PathBuf {
        let path = dir.join(format!("{}.{}", name, extension));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create corpus subdir");
        }
        fs::write(&path, data).expect("Failed to write corpus file");
        path
    }
}

impl Default for CorpusFixture {
    fn default() -> Self {
        Self::new()
    }
}
