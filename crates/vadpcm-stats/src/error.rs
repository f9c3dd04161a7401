//! Error types for container parsing, signal alignment, and analysis.

use thiserror::Error;

use crate::aiff::FourCc;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The container bytes do not follow the expected chunk structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The buffer cannot hold the 12-byte FORM header.
    #[error("file too short for FORM header: {size} bytes, need at least 12")]
    TruncatedHeader {
        /// Buffer length.
        size: usize,
    },

    /// The container id is not `FORM`.
    #[error("bad container chunk '{id}', expected 'FORM'")]
    NotForm {
        /// The id that was found.
        id: FourCc,
    },

    /// The declared form size cannot contain a form type.
    #[error("declared form size {size} is too small, minimum is 4")]
    FormTooSmall {
        /// Declared form size.
        size: u32,
    },

    /// A chunk header would extend past the declared form size.
    #[error("chunk header at offset {offset} extends past form size {form_size}")]
    HeaderPastForm {
        /// Byte offset of the chunk header.
        offset: usize,
        /// Declared form size.
        form_size: u32,
    },

    /// The buffer ends inside a chunk header.
    #[error("incomplete chunk header at offset {offset}: {available} bytes available, need 8")]
    IncompleteHeader {
        /// Byte offset of the chunk header.
        offset: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// The buffer ends inside a chunk payload.
    #[error(
        "chunk '{tag}' at offset {offset} is truncated: declared {declared} bytes, {available} available"
    )]
    TruncatedPayload {
        /// Chunk tag.
        tag: FourCc,
        /// Byte offset of the chunk header.
        offset: usize,
        /// Declared payload size.
        declared: u32,
        /// Bytes left in the buffer after the header.
        available: usize,
    },

    /// No chunk with the requested tag.
    #[error("no '{tag}' chunk")]
    MissingChunk {
        /// Requested tag.
        tag: FourCc,
    },

    /// The sound data is not a whole number of frames.
    #[error("bad VADPCM data length: {length} (header 8 + frames of {frame_byte_size} bytes)")]
    BadPayloadLength {
        /// Payload length including the 8-byte header.
        length: usize,
        /// Expected frame size.
        frame_byte_size: usize,
    },

    /// Malformed COMM chunk.
    #[error("invalid COMM chunk: {message}")]
    InvalidCommon {
        /// Description of the problem.
        message: String,
    },

    /// Malformed codebook.
    #[error("invalid codebook: {message}")]
    InvalidCodebook {
        /// Description of the problem.
        message: String,
    },
}

impl FormatError {
    /// Creates an invalid COMM chunk error.
    pub fn common(message: impl Into<String>) -> Self {
        Self::InvalidCommon {
            message: message.into(),
        }
    }

    /// Creates an invalid codebook error.
    pub fn codebook(message: impl Into<String>) -> Self {
        Self::InvalidCodebook {
            message: message.into(),
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            FormatError::TruncatedHeader { .. } => "FMT_001",
            FormatError::NotForm { .. } => "FMT_002",
            FormatError::FormTooSmall { .. } => "FMT_003",
            FormatError::HeaderPastForm { .. } => "FMT_004",
            FormatError::IncompleteHeader { .. } => "FMT_005",
            FormatError::TruncatedPayload { .. } => "FMT_006",
            FormatError::MissingChunk { .. } => "FMT_007",
            FormatError::BadPayloadLength { .. } => "FMT_008",
            FormatError::InvalidCommon { .. } => "FMT_009",
            FormatError::InvalidCodebook { .. } => "FMT_010",
        }
    }
}

/// The sample buffers do not line up with the compressed frames.
///
/// Usually means the original, encoded, and decoded files were paired wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    /// The padded original does not cover the compressed frame count.
    #[error(
        "mismatched length: padded original has {original} samples, {frame_count} frames need {expected}"
    )]
    FrameCount {
        /// Padded original length.
        original: usize,
        /// `frame_count * frame_sample_width`.
        expected: usize,
        /// Compressed frame count.
        frame_count: usize,
    },

    /// The decoded length differs from the padded original length.
    #[error("mismatched length: {original} {decoded}")]
    DecodedLength {
        /// Padded original length.
        original: usize,
        /// Decoded length.
        decoded: usize,
    },

    /// A frame width of zero cannot partition anything.
    #[error("frame sample width must be non-zero")]
    ZeroFrameWidth,
}

impl AlignmentError {
    /// Returns the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AlignmentError::FrameCount { .. } => "ALN_001",
            AlignmentError::DecodedLength { .. } => "ALN_002",
            AlignmentError::ZeroFrameWidth => "ALN_003",
        }
    }
}

/// Two frame matrices that should match do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "frame matrices differ in shape: original {}x{}, decoded {}x{}",
    original.0, original.1, decoded.0, decoded.1
)]
pub struct ShapeError {
    /// `(frame_count, frame_width)` of the original.
    pub original: (usize, usize),
    /// `(frame_count, frame_width)` of the decoded signal.
    pub decoded: (usize, usize),
}

/// A PCM sample source could not be loaded.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The file is neither AIFF nor WAV.
    #[error("unrecognized audio container (expected AIFF, AIFF-C, or WAV)")]
    UnknownContainer,

    /// Only mono sources are supported.
    #[error("unsupported channel count: {channels} (only mono is supported)")]
    UnsupportedChannels {
        /// Channel count found.
        channels: u16,
    },

    /// Only 16-bit integer PCM is supported.
    #[error("unsupported sample format: {bits} bits (only 16-bit PCM is supported)")]
    UnsupportedSampleSize {
        /// Bits per sample found.
        bits: u16,
    },

    /// AIFF-C compression other than `NONE`.
    #[error("unsupported AIFF-C compression '{compression}'")]
    UnsupportedCompression {
        /// Compression type found.
        compression: FourCc,
    },

    /// SSND holds fewer bytes than COMM declares.
    #[error("sound data too short: COMM declares {expected} bytes, SSND holds {actual}")]
    ShortSoundData {
        /// Bytes implied by COMM.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Malformed AIFF structure.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Malformed WAV structure.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl SampleError {
    /// Returns the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            SampleError::UnknownContainer => "PCM_001",
            SampleError::UnsupportedChannels { .. } => "PCM_002",
            SampleError::UnsupportedSampleSize { .. } => "PCM_003",
            SampleError::UnsupportedCompression { .. } => "PCM_004",
            SampleError::ShortSoundData { .. } => "PCM_005",
            SampleError::Format(e) => e.code(),
            SampleError::Wav(_) => "PCM_006",
        }
    }
}

/// An analysis configuration could not be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for [`crate::AnalysisConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds an unusable value.
    #[error("invalid config field '{field}': {message}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
}

impl ConfigError {
    /// Returns the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "CFG_001",
            ConfigError::Parse(_) => "CFG_002",
            ConfigError::Invalid { .. } => "CFG_003",
        }
    }
}

/// Any failure of a full analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Malformed container.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Mismatched sample buffers.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Mismatched frame matrices.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Unloadable PCM source.
    #[error(transparent)]
    Sample(#[from] SampleError),
}

impl AnalysisError {
    /// Returns the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::Format(e) => e.code(),
            AnalysisError::Alignment(e) => e.code(),
            AnalysisError::Shape(_) => "SHP_001",
            AnalysisError::Sample(e) => e.code(),
        }
    }
}
