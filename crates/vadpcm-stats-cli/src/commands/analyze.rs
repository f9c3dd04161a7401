//! Analyze command implementation
//!
//! Measures the coding error of one original/encoded/decoded triple.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vadpcm_stats::{write_frame_rows, Analysis, ErrorReport};

use super::json_output::{AnalyzeOutput, JsonError};
use crate::input::{analyze_triple, error_codes, load_config, FileTriple};

/// Run the analyze command
///
/// # Arguments
/// * `files` - Original, encoded, and decoded paths
/// * `frames_path` - Optional path for the per-frame CSV table
/// * `config_path` - Optional analysis configuration file
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 if the files could not be analyzed
pub fn run(
    files: &FileTriple,
    frames_path: Option<&Path>,
    config_path: Option<&Path>,
    json_output: bool,
) -> Result<ExitCode> {
    if json_output {
        run_json(files, frames_path, config_path)
    } else {
        run_human(files, frames_path, config_path)
    }
}

/// Run analyze with human-readable (colored) output
fn run_human(
    files: &FileTriple,
    frames_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let config = load_config(config_path)?;

    println!("{} {}", "Analyzing:".cyan().bold(), files.encoded.display());
    println!("{} {}", "Original:".dimmed(), files.original.display());
    println!("{} {}", "Decoded:".dimmed(), files.decoded.display());

    let analysis = analyze_triple(&config, files)?;
    print_analysis(&analysis);

    if let Some(path) = frames_path {
        write_frames(path, &analysis.report)?;
        println!("\n{} {}", "Frame table written to:".green().bold(), path.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Run analyze with machine-readable JSON output
fn run_json(
    files: &FileTriple,
    frames_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            let mut error = JsonError::new(error_codes::CONFIG, format!("{:#}", e));
            if let Some(path) = config_path {
                error = error.with_file(path.display().to_string());
            }
            return print_failure(error);
        }
    };

    let analysis = match analyze_triple(&config, files) {
        Ok(analysis) => analysis,
        Err(e) => return print_failure(JsonError::from(&e)),
    };

    if let Some(path) = frames_path {
        if let Err(e) = write_frames(path, &analysis.report) {
            let error = JsonError::new(error_codes::FILE_WRITE, format!("{:#}", e))
                .with_file(path.display().to_string());
            return print_failure(error);
        }
    }

    let output = AnalyzeOutput::success(analysis);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

fn print_failure(error: JsonError) -> Result<ExitCode> {
    let output = AnalyzeOutput::failure(vec![error]);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::from(1))
}

/// Writes the per-frame CSV table.
fn write_frames(path: &Path, report: &ErrorReport) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_frame_rows(&mut out, report)
        .and_then(|_| out.flush())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), rows = report.frame_count, "wrote frame table");
    Ok(())
}

/// Print analysis metrics in human-readable format.
fn print_analysis(analysis: &Analysis) {
    let container = &analysis.container;
    let report = &analysis.report;

    println!(
        "\n{} {} ({} chunks, {} frames)",
        "Container:".cyan(),
        container.form_type,
        container.chunk_count,
        container.frame_count
    );
    if let Some(common) = &container.common {
        println!(
            "  {} {} Hz, {} channel(s), {} sample frames",
            "Format:".dimmed(),
            common.sample_rate,
            common.channels,
            common.sample_frames
        );
    }
    if let Some(codebook) = &container.codebook {
        println!(
            "  {} order {}, {} predictor(s)",
            "Codebook:".dimmed(),
            codebook.order,
            codebook.predictor_count
        );
    }

    println!("\n  {} {:.2} dB", "SNR:".cyan(), report.snr_db);
    println!("       ({})", snr_status(report.snr_db));
    println!("  {} {:.6}", "Signal RMS:".cyan(), report.signal_rms);
    println!("  {} {:.6}", "Error RMS:".cyan(), report.error_rms);

    if let Some(worst) = report
        .frame_rows()
        .max_by(|a, b| a.relative_error.total_cmp(&b.relative_error))
    {
        println!(
            "  {} frame {} (relative error {:.6})",
            "Worst frame:".cyan(),
            worst.index,
            worst.relative_error
        );
    }

    let histogram = report.predictor_histogram();
    if histogram.iter().any(|&n| n > 0) {
        println!("  {}", "Predictor usage:".cyan());
        for (index, count) in histogram.iter().enumerate().filter(|(_, &n)| n > 0) {
            println!("    {} {}", format!("{:2}:", index).dimmed(), count);
        }
    }
}

fn snr_status(snr_db: f64) -> colored::ColoredString {
    if snr_db > 40.0 {
        "excellent".green()
    } else if snr_db > 20.0 {
        "good".yellow()
    } else if snr_db > 10.0 {
        "fair".yellow()
    } else {
        "poor".red()
    }
}

/// Builds a triple from command-line paths.
pub fn triple(original: PathBuf, encoded: PathBuf, decoded: PathBuf) -> FileTriple {
    FileTriple {
        original,
        encoded,
        decoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use vadpcm_stats::aiff::{write_container, Chunk, FourCc};
    use vadpcm_stats::pcm::encode_aiff;

    fn write_inputs(dir: &Path) -> FileTriple {
        let original: Vec<f64> = (0..40).map(|i| (i as f64 * 0.4).sin() * 0.25).collect();
        let decoded: Vec<f64> = original
            .iter()
            .chain(std::iter::repeat(&0.0).take(8))
            .map(|s| s * 0.9)
            .collect();
        let mut ssnd = vec![0u8; 8];
        for predictor in [0u8, 1, 1] {
            ssnd.push(0x40 | predictor);
            ssnd.extend_from_slice(&[0; 8]);
        }
        let encoded = write_container(FourCc::AIFC, &[Chunk::new(FourCc::SSND, &ssnd)]);

        let files = triple(
            dir.join("orig.aiff"),
            dir.join("enc.aifc"),
            dir.join("dec.aiff"),
        );
        fs::write(&files.original, encode_aiff(&original, 16000)).unwrap();
        fs::write(&files.encoded, encoded).unwrap();
        fs::write(&files.decoded, encode_aiff(&decoded, 16000)).unwrap();
        files
    }

    #[test]
    fn test_analyze_human() {
        let tmp = tempfile::tempdir().unwrap();
        let files = write_inputs(tmp.path());
        let code = run(&files, None, None, false).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_analyze_json_writes_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let files = write_inputs(tmp.path());
        let frames = tmp.path().join("frames.csv");
        let code = run(&files, Some(&frames), None, true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let table = fs::read_to_string(&frames).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "frame,predictor,signal_rms,rel_error");
        assert!(lines[1].starts_with("0,0,"));
        assert!(lines[3].starts_with("2,1,"));
    }

    #[test]
    fn test_analyze_missing_file_human() {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = write_inputs(tmp.path());
        files.original = tmp.path().join("nope.aiff");
        let err = run(&files, None, None, false).unwrap_err();
        assert!(err.to_string().contains("nope.aiff"));
    }

    #[test]
    fn test_analyze_missing_file_json() {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = write_inputs(tmp.path());
        files.encoded = tmp.path().join("nope.aifc");
        let code = run(&files, None, None, true).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_analyze_bad_config_json() {
        let tmp = tempfile::tempdir().unwrap();
        let files = write_inputs(tmp.path());
        let config = tmp.path().join("config.json");
        fs::write(&config, r#"{"frame_sample_width": 0}"#).unwrap();
        let code = run(&files, None, Some(&config), true).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }
}
