//! VADPCM codebook stored in an `APPL` chunk.
//!
//! Layout: `stoc` signature, the Pascal string `VADPCMCODES` (padded to even
//! length), then version (1), order, predictor count, and
//! `order * predictor_count` vectors of eight big-endian `i16`.

use serde::Serialize;

use crate::aiff::{Chunk, FourCc};
use crate::error::FormatError;

/// Largest predictor order the codec supports.
pub const MAX_ORDER: u16 = 8;
/// Largest predictor count the codec supports.
pub const MAX_PREDICTOR_COUNT: u16 = 16;

const APPL_SIGNATURE: &[u8; 4] = b"stoc";
const CODEBOOK_NAME: &[u8; 12] = b"\x0bVADPCMCODES";
const VECTOR_LEN: usize = 8;

/// A decoded codebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Codebook {
    /// Predictor order.
    pub order: u16,
    /// Number of predictors.
    pub predictor_count: u16,
    /// `order * predictor_count` coefficient vectors.
    #[serde(skip)]
    pub vectors: Vec<[i16; VECTOR_LEN]>,
}

/// Finds and decodes the codebook, if the container has one.
///
/// `APPL` chunks with another signature or name are skipped. A second
/// codebook is an error.
pub fn decode_codebook(chunks: &[Chunk<'_>]) -> Result<Option<Codebook>, FormatError> {
    let mut found = None;
    for chunk in chunks.iter().filter(|c| c.tag == FourCc::APPL) {
        let Some(data) = codebook_data(chunk.payload)? else {
            continue;
        };
        if found.is_some() {
            return Err(FormatError::codebook("multiple codebooks found"));
        }
        found = Some(parse_codebook(data)?);
    }
    Ok(found)
}

/// Returns the codebook bytes of an `APPL` payload, or `None` for other
/// application chunks.
fn codebook_data(payload: &[u8]) -> Result<Option<&[u8]>, FormatError> {
    if payload.len() < 4 {
        return Err(FormatError::codebook(format!(
            "APPL chunk too small: size {}, minimum 4",
            payload.len()
        )));
    }
    if &payload[..4] != APPL_SIGNATURE {
        return Ok(None);
    }
    let name = &payload[4..];
    let Some(&name_length) = name.first() else {
        return Err(FormatError::codebook("APPL stoc chunk too small"));
    };
    // Length byte plus characters, padded to even.
    let padded = (usize::from(name_length) + 2) & !1;
    if name.len() < padded {
        return Err(FormatError::codebook("APPL stoc chunk is truncated"));
    }
    if name[..padded] != CODEBOOK_NAME[..] {
        return Ok(None);
    }
    Ok(Some(&name[padded..]))
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn parse_codebook(data: &[u8]) -> Result<Codebook, FormatError> {
    if data.len() < 2 {
        return Err(FormatError::codebook(format!("too short: size {}", data.len())));
    }
    let version = read_u16(data, 0);
    if version != 1 {
        return Err(FormatError::codebook(format!("unknown version {}", version)));
    }
    if data.len() < 6 {
        return Err(FormatError::codebook(format!("too short: size {}", data.len())));
    }
    let order = read_u16(data, 2);
    let predictor_count = read_u16(data, 4);
    if order > MAX_ORDER {
        return Err(FormatError::codebook(format!(
            "order {} is too large, maximum {}",
            order, MAX_ORDER
        )));
    }
    if predictor_count > MAX_PREDICTOR_COUNT {
        return Err(FormatError::codebook(format!(
            "predictor count {} is too large, maximum {}",
            predictor_count, MAX_PREDICTOR_COUNT
        )));
    }
    let vector_count = usize::from(order) * usize::from(predictor_count);
    let needed = 6 + vector_count * VECTOR_LEN * 2;
    if data.len() < needed {
        return Err(FormatError::codebook(format!(
            "too short: size {}, need {}",
            data.len(),
            needed
        )));
    }
    let vectors = data[6..needed]
        .chunks_exact(VECTOR_LEN * 2)
        .map(|raw| {
            let mut v = [0i16; VECTOR_LEN];
            for (slot, pair) in v.iter_mut().zip(raw.chunks_exact(2)) {
                *slot = i16::from_be_bytes([pair[0], pair[1]]);
            }
            v
        })
        .collect();
    Ok(Codebook {
        order,
        predictor_count,
        vectors,
    })
}
