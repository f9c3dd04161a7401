//! IFF chunk reader for AIFF and AIFF-C containers.
//!
//! A container is a `FORM` chunk: the id `FORM`, a big-endian 32-bit form
//! size, a 4-byte form type, then a sequence of chunks. Each chunk is a 4-byte
//! tag, a big-endian 32-bit payload size, and the payload, padded to an even
//! length. The form size counts from the form type onward.
//!
//! Chunks borrow their payloads from the input buffer; nothing is copied.

pub(crate) mod common;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

pub use common::{parse_common, u32_to_extended, CommonChunk};

/// Offset of the first chunk header in the buffer.
const CHUNKS_OFFSET: usize = 12;
/// Size of a chunk header (tag and size).
const CHUNK_HEADER_SIZE: usize = 8;
/// Offset of the form body (form type and chunks) in the buffer.
const FORM_BODY_OFFSET: usize = 8;

/// A four-character code identifying a chunk or form type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// `FORM` container id.
    pub const FORM: FourCc = FourCc(*b"FORM");
    /// `AIFF` form type.
    pub const AIFF: FourCc = FourCc(*b"AIFF");
    /// `AIFC` form type.
    pub const AIFC: FourCc = FourCc(*b"AIFC");
    /// Common chunk: channel count, frame count, sample size, sample rate.
    pub const COMM: FourCc = FourCc(*b"COMM");
    /// Sound data chunk.
    pub const SSND: FourCc = FourCc(*b"SSND");
    /// Application-specific chunk, which carries the VADPCM codebook.
    pub const APPL: FourCc = FourCc(*b"APPL");
    /// Format version chunk (AIFF-C).
    pub const FVER: FourCc = FourCc(*b"FVER");
    /// AIFF-C compression type for uncompressed big-endian PCM.
    pub const NONE: FourCc = FourCc(*b"NONE");
    /// AIFF-C compression type for VADPCM.
    pub const VAPC: FourCc = FourCc(*b"VAPC");

    /// Reads a code from the first four bytes of a slice.
    fn from_slice(bytes: &[u8]) -> Self {
        FourCc([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc('{}')", self)
    }
}

impl FromStr for FourCc {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii() && !b.is_ascii_control()) {
            return Err(format!(
                "'{}' is not a four-character ASCII code",
                s.escape_default()
            ));
        }
        Ok(FourCc::from_slice(bytes))
    }
}

impl TryFrom<String> for FourCc {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FourCc> for String {
    fn from(value: FourCc) -> Self {
        value.to_string()
    }
}

/// A tagged chunk borrowed from a container buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Chunk tag.
    pub tag: FourCc,
    /// Chunk payload, excluding the padding byte.
    pub payload: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Creates a chunk.
    pub fn new(tag: FourCc, payload: &'a [u8]) -> Self {
        Self { tag, payload }
    }

    /// Bytes this chunk occupies in a container: header, payload, and padding.
    pub fn encoded_len(&self) -> usize {
        CHUNK_HEADER_SIZE + self.payload.len() + (self.payload.len() & 1)
    }
}

/// A parsed `FORM` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<'a> {
    /// Form type, normally `AIFF` or `AIFC`.
    pub form_type: FourCc,
    /// Declared form size.
    pub form_size: u32,
    /// Chunks in file order.
    pub chunks: Vec<Chunk<'a>>,
}

impl<'a> Container<'a> {
    /// Returns the first chunk with the given tag.
    pub fn find(&self, tag: FourCc) -> Option<&Chunk<'a>> {
        find_chunk(&self.chunks, tag)
    }

    /// Whether this is an AIFF-C container.
    pub fn is_aifc(&self) -> bool {
        self.form_type == FourCc::AIFC
    }
}

fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Parses the chunks of a container.
///
/// Walks the chunk list from offset 12 until the cursor reaches the declared
/// form size. The form id and form type are not checked; use
/// [`parse_container`] for that.
///
/// A chunk header must lie inside the declared form size. A chunk payload
/// must lie inside the buffer, but may run past the declared form size, in
/// which case it is the last chunk read.
pub fn parse_chunks(data: &[u8]) -> Result<Vec<Chunk<'_>>, FormatError> {
    if data.len() < CHUNKS_OFFSET {
        return Err(FormatError::TruncatedHeader { size: data.len() });
    }
    let form_size = read_u32_be(&data[4..8]);
    if form_size < 4 {
        return Err(FormatError::FormTooSmall { size: form_size });
    }
    tracing::debug!(form_size, "parsing chunks");

    let end = form_size as usize;
    let mut chunks = Vec::new();
    // Position relative to the start of the form body.
    let mut pos = CHUNKS_OFFSET - FORM_BODY_OFFSET;
    while pos < end {
        let offset = pos + FORM_BODY_OFFSET;
        if pos + CHUNK_HEADER_SIZE > end {
            return Err(FormatError::HeaderPastForm { offset, form_size });
        }
        let header = data
            .get(offset..offset + CHUNK_HEADER_SIZE)
            .ok_or(FormatError::IncompleteHeader {
                offset,
                available: data.len().saturating_sub(offset),
            })?;
        let tag = FourCc::from_slice(header);
        let size = read_u32_be(&header[4..]);

        let start = offset + CHUNK_HEADER_SIZE;
        let payload = start
            .checked_add(size as usize)
            .and_then(|stop| data.get(start..stop))
            .ok_or(FormatError::TruncatedPayload {
                tag,
                offset,
                declared: size,
                available: data.len() - start,
            })?;
        tracing::debug!(%tag, offset, size, "chunk");

        let chunk = Chunk::new(tag, payload);
        pos += chunk.encoded_len();
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Parses a container, requiring the `FORM` id.
pub fn parse_container(data: &[u8]) -> Result<Container<'_>, FormatError> {
    if data.len() < CHUNKS_OFFSET {
        return Err(FormatError::TruncatedHeader { size: data.len() });
    }
    let id = FourCc::from_slice(&data[0..4]);
    if id != FourCc::FORM {
        return Err(FormatError::NotForm { id });
    }
    let form_type = FourCc::from_slice(&data[8..12]);
    let chunks = parse_chunks(data)?;
    tracing::debug!(%form_type, chunk_count = chunks.len(), "parsed container");
    Ok(Container {
        form_type,
        form_size: read_u32_be(&data[4..8]),
        chunks,
    })
}

/// Returns the first chunk with the given tag.
///
/// Later chunks with the same tag are never considered.
pub fn find_chunk<'c, 'a>(chunks: &'c [Chunk<'a>], tag: FourCc) -> Option<&'c Chunk<'a>> {
    chunks.iter().find(|chunk| chunk.tag == tag)
}

/// Serializes chunks back to their container encoding, zero-padding odd payloads.
pub fn write_chunks(chunks: &[Chunk<'_>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chunks.iter().map(Chunk::encoded_len).sum());
    for chunk in chunks {
        out.extend_from_slice(&chunk.tag.0);
        out.extend_from_slice(&(chunk.payload.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk.payload);
        if chunk.payload.len() & 1 != 0 {
            out.push(0);
        }
    }
    out
}

/// Serializes a complete `FORM` container.
pub fn write_container(form_type: FourCc, chunks: &[Chunk<'_>]) -> Vec<u8> {
    let body = write_chunks(chunks);
    let mut out = Vec::with_capacity(CHUNKS_OFFSET + body.len());
    out.extend_from_slice(&FourCc::FORM.0);
    out.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
    out.extend_from_slice(&form_type.0);
    out.extend_from_slice(&body);
    out
}
