//! VADPCM fidelity analysis.
//!
//! This crate measures how faithfully the VADPCM codec reproduces a signal.
//! Given the encoded AIFF-C container and the original and decoded PCM
//! samples, it locates the compressed frames, aligns both sample streams to
//! them, and computes signal-to-noise metrics.
//!
//! # Overview
//!
//! - **Chunk reader** ([`aiff`]): parses the IFF `FORM` container into tagged chunks
//! - **Payload extractor** ([`vadpcm`]): splits the `SSND` chunk into 9-byte frames
//! - **Frame metadata** ([`vadpcm::decode_predictors`]): predictor index per frame
//! - **Signal aligner** ([`align`]): pads the original and reshapes both streams
//! - **Error analyzer** ([`analysis`]): global SNR and per-frame relative error
//!
//! # Example
//!
//! ```
//! use vadpcm_stats::aiff::{write_container, Chunk, FourCc};
//! use vadpcm_stats::{analyze_container, AnalysisConfig};
//!
//! // Two frames of VADPCM data after the 8-byte SSND header.
//! let mut ssnd = vec![0u8; 8];
//! ssnd.extend_from_slice(&[0x01; 18]);
//! let encoded = write_container(FourCc::AIFC, &[Chunk::new(FourCc::SSND, &ssnd)]);
//!
//! let original: Vec<f64> = (0..32).map(|i| (i as f64 * 0.1).sin()).collect();
//! let decoded: Vec<f64> = original.iter().map(|s| s * 0.99).collect();
//!
//! let analysis =
//!     analyze_container(&AnalysisConfig::default(), &encoded, &original, &decoded).unwrap();
//! assert_eq!(analysis.report.frame_count, 2);
//! assert_eq!(analysis.report.predictors, vec![1, 1]);
//! assert!((analysis.report.snr_db - 40.0).abs() < 0.01);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error types with stable codes
//! - [`config`]: Frame layout configuration
//! - [`pcm`]: 16-bit mono PCM loading from AIFF and WAV
//! - [`summary`]: Per-file CSV summary records

pub mod aiff;
pub mod align;
pub mod analysis;
pub mod config;
pub mod error;
pub mod pcm;
pub mod pipeline;
pub mod summary;
pub mod vadpcm;

// Re-export commonly used types at the crate root
pub use aiff::{parse_chunks, parse_container, Chunk, Container, FourCc};
pub use align::{align, padding_for, FrameMatrix};
pub use analysis::{analyze, ErrorReport, FrameRow};
pub use config::AnalysisConfig;
pub use error::{
    AlignmentError, AnalysisError, AnalysisResult, ConfigError, FormatError, SampleError,
    ShapeError,
};
pub use pcm::{load_pcm, PcmAudio};
pub use pipeline::{analyze_container, Analysis, ContainerInfo};
pub use summary::{format_summary, write_frame_rows, write_summary, SummaryRecord};
pub use vadpcm::{
    decode_codebook, decode_predictors, extract_compressed_frames, CompressedFrames,
    FRAME_BYTE_SIZE, FRAME_SAMPLE_COUNT,
};
