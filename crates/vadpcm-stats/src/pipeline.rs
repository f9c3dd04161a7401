//! End-to-end analysis of one original/encoded/decoded triple.

use serde::Serialize;

use crate::aiff::{parse_chunks, parse_common, CommonChunk, FourCc};
use crate::align::align;
use crate::analysis::{analyze, ErrorReport};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisResult, FormatError};
use crate::vadpcm::{decode_codebook, decode_predictors, extract_frames_from, Codebook};

/// What the encoded container says about itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerInfo {
    /// Form type from bytes 8..12.
    pub form_type: FourCc,
    /// Number of chunks.
    pub chunk_count: usize,
    /// Decoded COMM chunk, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common: Option<CommonChunk>,
    /// Codebook header, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codebook: Option<Codebook>,
    /// Number of compressed frames.
    pub frame_count: usize,
}

/// Result of a full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Container metadata.
    pub container: ContainerInfo,
    /// Error metrics.
    pub report: ErrorReport,
}

/// Parses the encoded container, aligns the two sample streams to its frames,
/// and computes the error report.
///
/// Fails on the first malformed chunk structure, sound data, or sample
/// stream; nothing partial is returned. `COMM` and codebook metadata are
/// best-effort: a malformed one is logged and reported as absent.
pub fn analyze_container(
    config: &AnalysisConfig,
    encoded: &[u8],
    original: &[f64],
    decoded: &[f64],
) -> AnalysisResult<Analysis> {
    let chunks = parse_chunks(encoded)?;
    let frames = extract_frames_from(&chunks, config.sound_data_tag, config.frame_byte_size)?;
    let predictors = decode_predictors(&frames);

    let (original_frames, decoded_frames) = align(
        original,
        decoded,
        config.frame_sample_width,
        frames.frame_count(),
    )?;
    let report = analyze(&original_frames, &decoded_frames)?.with_predictors(predictors);

    let form_type = FourCc([encoded[8], encoded[9], encoded[10], encoded[11]]);
    let common = chunks
        .iter()
        .find(|c| c.tag == FourCc::COMM)
        .and_then(|c| metadata("COMM", parse_common(c.payload, form_type == FourCc::AIFC)));
    let codebook = metadata("codebook", decode_codebook(&chunks)).flatten();

    Ok(Analysis {
        container: ContainerInfo {
            form_type,
            chunk_count: chunks.len(),
            common,
            codebook,
            frame_count: frames.frame_count(),
        },
        report,
    })
}

/// Keeps a metadata value, or logs why it was dropped.
fn metadata<T>(what: &str, result: Result<T, FormatError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "ignoring malformed {}", what);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aiff::{write_container, Chunk};
    use crate::error::{AlignmentError, AnalysisError};

    fn ssnd(frame_count: usize) -> Vec<u8> {
        let mut ssnd = vec![0u8; 8];
        for i in 0..frame_count {
            let mut frame = [0u8; 9];
            frame[0] = 0x20 | (i % 4) as u8;
            ssnd.extend_from_slice(&frame);
        }
        ssnd
    }

    fn encoded(frame_count: usize) -> Vec<u8> {
        write_container(FourCc::AIFC, &[Chunk::new(FourCc::SSND, &ssnd(frame_count))])
    }

    #[test]
    fn test_analyze_container() {
        let original: Vec<f64> = (0..60).map(|i| (i as f64 * 0.3).sin() * 0.5).collect();
        let mut decoded = original.clone();
        decoded.resize(64, 0.0);
        decoded[10] += 0.01;

        let analysis =
            analyze_container(&AnalysisConfig::default(), &encoded(4), &original, &decoded)
                .unwrap();
        assert_eq!(analysis.container.frame_count, 4);
        assert_eq!(analysis.container.form_type, FourCc::AIFC);
        assert_eq!(analysis.container.chunk_count, 1);
        assert!(analysis.container.common.is_none());
        assert_eq!(analysis.report.predictors, vec![0, 1, 2, 3]);
        assert!(analysis.report.relative_error[0] > 0.0);
        assert_eq!(analysis.report.relative_error[1..], [0.0, 0.0, 0.0]);
        assert!(analysis.report.snr_db.is_finite());
    }

    #[test]
    fn test_analyze_container_misaligned() {
        let original = vec![0.0; 60];
        let decoded = vec![0.0; 63];
        let err = analyze_container(&AnalysisConfig::default(), &encoded(4), &original, &decoded)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Alignment(AlignmentError::DecodedLength {
                original: 64,
                decoded: 63
            })
        ));
    }

    #[test]
    fn test_analyze_container_bad_container() {
        let err = analyze_container(&AnalysisConfig::default(), b"FORM\0\0\0\x02AIFC", &[], &[])
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Format(FormatError::FormTooSmall { size: 2 })
        ));
    }

    #[test]
    fn test_malformed_metadata_keeps_report() {
        let sound = ssnd(2);
        let samples: Vec<f64> = (0..32).map(|i| (i as f64 * 0.5).sin() * 0.25).collect();
        let short_appl = [0u8; 2];
        // An AIFF-sized COMM is too short inside an AIFC form.
        let short_comm = [0u8; 18];

        for extra in [
            Chunk::new(FourCc::APPL, &short_appl),
            Chunk::new(FourCc::COMM, &short_comm),
        ] {
            let data = write_container(FourCc::AIFC, &[extra, Chunk::new(FourCc::SSND, &sound)]);
            let analysis =
                analyze_container(&AnalysisConfig::default(), &data, &samples, &samples).unwrap();
            assert_eq!(analysis.container.frame_count, 2);
            assert_eq!(analysis.container.chunk_count, 2);
            assert!(analysis.container.common.is_none());
            assert!(analysis.container.codebook.is_none());
            assert_eq!(analysis.report.snr_db, f64::INFINITY);
            assert_eq!(analysis.report.predictors, vec![0, 1]);
        }
    }
}
