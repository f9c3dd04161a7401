//! Loading of 16-bit mono PCM sample sources.
//!
//! Accepts AIFF, AIFF-C with `NONE`/`twos` compression, and WAV. Samples are
//! normalized to `[-1.0, 1.0)` by dividing by 32768.

use std::io::Cursor;

use serde::Serialize;

use crate::aiff::{parse_common, parse_container, u32_to_extended, FourCc};
use crate::error::{FormatError, SampleError};
use crate::vadpcm::SOUND_DATA_HEADER_SIZE;

/// Big-endian 16-bit PCM in AIFF-C (`twos`).
const TWOS: FourCc = FourCc(*b"twos");
const SAMPLE_SCALE: f64 = 32768.0;

/// Decoded mono PCM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcmAudio {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Normalized samples.
    #[serde(skip)]
    pub samples: Vec<f64>,
}

/// Loads PCM from the bytes of an AIFF, AIFF-C, or WAV file.
pub fn load_pcm(data: &[u8]) -> Result<PcmAudio, SampleError> {
    match data.get(0..4) {
        Some(b"FORM") => load_aiff(data),
        Some(b"RIFF") => load_wav(data),
        _ => Err(SampleError::UnknownContainer),
    }
}

fn load_aiff(data: &[u8]) -> Result<PcmAudio, SampleError> {
    let container = parse_container(data)?;
    if container.form_type != FourCc::AIFF && container.form_type != FourCc::AIFC {
        return Err(SampleError::UnknownContainer);
    }
    let comm = container.find(FourCc::COMM).ok_or(FormatError::MissingChunk {
        tag: FourCc::COMM,
    })?;
    let common = parse_common(comm.payload, container.is_aifc())?;
    if let Some(compression) = common.compression {
        if compression != FourCc::NONE && compression != TWOS {
            return Err(SampleError::UnsupportedCompression { compression });
        }
    }
    if common.channels != 1 {
        return Err(SampleError::UnsupportedChannels {
            channels: common.channels,
        });
    }
    if common.sample_size != 16 {
        return Err(SampleError::UnsupportedSampleSize {
            bits: common.sample_size,
        });
    }

    let ssnd = container.find(FourCc::SSND).ok_or(FormatError::MissingChunk {
        tag: FourCc::SSND,
    })?;
    let expected = common.sample_frames as usize * 2;
    let sound = sound_data(ssnd.payload).unwrap_or(&[]);
    if sound.len() < expected {
        return Err(SampleError::ShortSoundData {
            expected,
            actual: sound.len(),
        });
    }
    let samples = sound[..expected]
        .chunks_exact(2)
        .map(|pair| f64::from(i16::from_be_bytes([pair[0], pair[1]])) / SAMPLE_SCALE)
        .collect();
    tracing::debug!(
        frames = common.sample_frames,
        rate = common.sample_rate,
        "loaded AIFF PCM"
    );
    Ok(PcmAudio {
        sample_rate: common.sample_rate,
        samples,
    })
}

/// Returns the sample bytes of an `SSND` payload, honoring its offset field.
fn sound_data(payload: &[u8]) -> Option<&[u8]> {
    let header = payload.get(..SOUND_DATA_HEADER_SIZE)?;
    let offset = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    payload.get(SOUND_DATA_HEADER_SIZE.checked_add(offset)?..)
}

fn load_wav(data: &[u8]) -> Result<PcmAudio, SampleError> {
    let reader = hound::WavReader::new(Cursor::new(data))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(SampleError::UnsupportedChannels {
            channels: spec.channels,
        });
    }
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(SampleError::UnsupportedSampleSize {
            bits: spec.bits_per_sample,
        });
    }
    let samples = reader
        .into_samples::<i16>()
        .map(|s| s.map(|s| f64::from(s) / SAMPLE_SCALE))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        samples = samples.len(),
        rate = spec.sample_rate,
        "loaded WAV PCM"
    );
    Ok(PcmAudio {
        sample_rate: f64::from(spec.sample_rate),
        samples,
    })
}

/// Encodes normalized samples as a 16-bit mono AIFF file.
///
/// Samples are clamped to the 16-bit range.
pub fn encode_aiff(samples: &[f64], sample_rate: u32) -> Vec<u8> {
    use crate::aiff::{write_container, Chunk};

    let mut comm = Vec::with_capacity(18);
    comm.extend_from_slice(&1u16.to_be_bytes());
    comm.extend_from_slice(&(samples.len() as u32).to_be_bytes());
    comm.extend_from_slice(&16u16.to_be_bytes());
    comm.extend_from_slice(&u32_to_extended(sample_rate));

    let mut ssnd = vec![0u8; SOUND_DATA_HEADER_SIZE];
    for &s in samples {
        let value = (s * SAMPLE_SCALE).round().clamp(-32768.0, 32767.0) as i16;
        ssnd.extend_from_slice(&value.to_be_bytes());
    }

    write_container(
        FourCc::AIFF,
        &[
            Chunk::new(FourCc::COMM, &comm),
            Chunk::new(FourCc::SSND, &ssnd),
        ],
    )
}
