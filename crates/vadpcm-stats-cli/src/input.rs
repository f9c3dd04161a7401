//! Loading of analysis inputs from disk.
//!
//! An analysis needs three files: the original PCM, the VADPCM-encoded
//! container, and the PCM decoded from it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use vadpcm_stats::{analyze_container, Analysis, AnalysisConfig, AnalysisError, SampleError};

/// Error codes for failures outside the analysis library.
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Configuration file could not be loaded
    pub const CONFIG: &str = "CLI_002";
    /// Output could not be written
    pub const FILE_WRITE: &str = "CLI_003";
}

/// Paths of one original/encoded/decoded triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTriple {
    /// Original PCM (AIFF or WAV).
    pub original: PathBuf,
    /// VADPCM-encoded AIFF-C.
    pub encoded: PathBuf,
    /// PCM decoded from `encoded`.
    pub decoded: PathBuf,
}

/// Failure to analyze a file triple.
#[derive(Debug, Error)]
pub enum InputError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A PCM file could not be decoded.
    #[error("failed to load samples from {}: {source}", path.display())]
    Samples {
        path: PathBuf,
        #[source]
        source: SampleError,
    },

    /// The encoded container or the sample streams were rejected.
    #[error("{}: {source}", path.display())]
    Analysis {
        path: PathBuf,
        #[source]
        source: AnalysisError,
    },
}

impl InputError {
    /// Stable code: the library's code when it produced the error.
    pub fn code(&self) -> &'static str {
        match self {
            InputError::Read { .. } => error_codes::FILE_READ,
            InputError::Samples { source, .. } => source.code(),
            InputError::Analysis { source, .. } => source.code(),
        }
    }

    /// Path of the file the error concerns.
    pub fn path(&self) -> &Path {
        match self {
            InputError::Read { path, .. }
            | InputError::Samples { path, .. }
            | InputError::Analysis { path, .. } => path,
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, InputError> {
    fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a PCM file and returns its normalized samples.
pub fn load_samples(path: &Path) -> Result<Vec<f64>, InputError> {
    let data = read(path)?;
    let audio = vadpcm_stats::load_pcm(&data).map_err(|source| InputError::Samples {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), samples = audio.samples.len(), "loaded samples");
    Ok(audio.samples)
}

/// Loads all three files and runs the analysis.
pub fn analyze_triple(config: &AnalysisConfig, files: &FileTriple) -> Result<Analysis, InputError> {
    let original = load_samples(&files.original)?;
    let decoded = load_samples(&files.decoded)?;
    let encoded = read(&files.encoded)?;
    analyze_container(config, &encoded, &original, &decoded).map_err(|source| {
        InputError::Analysis {
            path: files.encoded.clone(),
            source,
        }
    })
}

/// Loads the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("invalid config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}
