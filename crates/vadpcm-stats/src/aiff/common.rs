//! COMM chunk decoding.

use serde::{Deserialize, Serialize};

use super::FourCc;
use crate::error::FormatError;

/// Size of an AIFF COMM chunk.
const AIFF_COMM_SIZE: usize = 18;
/// Minimum size of an AIFF-C COMM chunk: the AIFF fields, the compression
/// type, and at least the length byte of the compression name.
const AIFC_COMM_MIN_SIZE: usize = 23;

/// Decoded COMM chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonChunk {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Number of sample frames (samples per channel).
    pub sample_frames: u32,
    /// Bits per sample.
    pub sample_size: u16,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// AIFF-C compression type; `None` for plain AIFF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<FourCc>,
}

/// Decodes a COMM chunk payload.
///
/// Plain AIFF requires exactly 18 bytes. AIFF-C requires at least 23.
pub fn parse_common(payload: &[u8], is_aifc: bool) -> Result<CommonChunk, FormatError> {
    if is_aifc {
        if payload.len() < AIFC_COMM_MIN_SIZE {
            return Err(FormatError::common(format!(
                "size {}, minimum {}",
                payload.len(),
                AIFC_COMM_MIN_SIZE
            )));
        }
    } else if payload.len() != AIFF_COMM_SIZE {
        return Err(FormatError::common(format!(
            "size {}, expected {}",
            payload.len(),
            AIFF_COMM_SIZE
        )));
    }

    let channels = u16::from_be_bytes([payload[0], payload[1]]);
    let sample_frames = u32::from_be_bytes([payload[2], payload[3], payload[4], payload[5]]);
    let sample_size = u16::from_be_bytes([payload[6], payload[7]]);
    let mut rate = [0u8; 10];
    rate.copy_from_slice(&payload[8..18]);
    let sample_rate = extended_to_f64(rate);
    let compression = is_aifc.then(|| FourCc::from_slice(&payload[18..22]));

    Ok(CommonChunk {
        channels,
        sample_frames,
        sample_size,
        sample_rate,
        compression,
    })
}

/// Converts an 80-bit IEEE 754 extended float (big-endian) to `f64`.
///
/// The mantissa carries an explicit integer bit. Values outside the `f64`
/// range saturate to zero or infinity.
pub(crate) fn extended_to_f64(bytes: [u8; 10]) -> f64 {
    let sign_exponent = u16::from_be_bytes([bytes[0], bytes[1]]);
    let mut mantissa_bytes = [0u8; 8];
    mantissa_bytes.copy_from_slice(&bytes[2..]);
    let mantissa = u64::from_be_bytes(mantissa_bytes);

    let negative = sign_exponent & 0x8000 != 0;
    let exponent = i32::from(sign_exponent & 0x7fff);
    let magnitude = if exponent == 0 && mantissa == 0 {
        0.0
    } else if exponent == 0x7fff {
        if mantissa << 1 == 0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        // mantissa * 2^(exponent - bias - 63), split so neither factor
        // overflows on its own.
        let shift = exponent - 16383 - 63;
        (mantissa as f64) * 2f64.powi(shift / 2) * 2f64.powi(shift - shift / 2)
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Encodes an integer as an 80-bit IEEE 754 extended float (big-endian).
pub fn u32_to_extended(value: u32) -> [u8; 10] {
    let mut out = [0u8; 10];
    if value == 0 {
        return out;
    }
    let shift = value.leading_zeros();
    let exponent = 16383 + 31 - shift as u16;
    let mantissa = u64::from(value) << (32 + shift);
    out[..2].copy_from_slice(&exponent.to_be_bytes());
    out[2..].copy_from_slice(&mantissa.to_be_bytes());
    out
}
