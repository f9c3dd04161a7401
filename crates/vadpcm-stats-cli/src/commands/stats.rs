//! Stats command implementation
//!
//! Analyzes every file of a corpus and writes the per-file summary CSV.
//! Files are paired across the three directories by their path relative to
//! the directory root, ignoring the extension.

use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

use vadpcm_stats::{write_summary, AnalysisConfig, SummaryRecord};

use crate::input::{analyze_triple, load_config, FileTriple};

/// Options for the stats command.
#[derive(Debug, Clone)]
pub struct StatsOptions {
    /// Directory of original PCM files
    pub original_dir: PathBuf,
    /// Directory of VADPCM-encoded files
    pub encoded_dir: PathBuf,
    /// Directory of decoded PCM files
    pub decoded_dir: PathBuf,
    /// Summary output path (default: stdout)
    pub output: Option<PathBuf>,
    /// Number of worker threads (default: number of CPUs)
    pub jobs: Option<usize>,
    /// Analysis configuration file
    pub config: Option<PathBuf>,
}

/// A file to analyze, named by its path relative to the original directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    /// Name written to the summary.
    pub name: String,
    /// Files to analyze.
    pub files: FileTriple,
}

/// Run the stats command
///
/// # Returns
/// Exit code: 0 if every file was analyzed, 1 otherwise
pub fn run(options: &StatsOptions) -> Result<ExitCode> {
    let config = load_config(options.config.as_deref())?;
    let inputs = collect_inputs(
        &options.original_dir,
        &options.encoded_dir,
        &options.decoded_dir,
    )?;
    let records = analyze_all(&config, &inputs, options.jobs)?;

    match &options.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_summary(&mut out, &records)
                .and_then(|_| out.flush())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_summary(&mut out, &records).context("Failed to write summary")?;
        }
    }

    let failed = records.iter().filter(|r| !r.is_success()).count();
    eprintln!(
        "{} {} file(s), {} failed",
        "Analyzed".cyan().bold(),
        records.len(),
        failed
    );
    if let Some(path) = &options.output {
        eprintln!("{} {}", "Summary written to:".green().bold(), path.display());
    }

    if failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Lists regular files under `dir` in a stable order.
fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Pairing key: the path relative to `root` without its extension.
fn stem_key(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).with_extension("")
}

/// Maps each pairing key under `dir` to the first file with that key.
fn index_dir(dir: &Path) -> Result<BTreeMap<PathBuf, PathBuf>> {
    let mut index = BTreeMap::new();
    for path in walk_files(dir)? {
        index.entry(stem_key(dir, &path)).or_insert(path);
    }
    Ok(index)
}

/// Pairs every original file with its encoded and decoded counterparts.
///
/// Originals without both counterparts are skipped with a warning.
pub fn collect_inputs(
    original_dir: &Path,
    encoded_dir: &Path,
    decoded_dir: &Path,
) -> Result<Vec<BatchInput>> {
    let encoded = index_dir(encoded_dir)?;
    let decoded = index_dir(decoded_dir)?;

    let mut inputs = Vec::new();
    for original in walk_files(original_dir)? {
        let key = stem_key(original_dir, &original);
        let name = original
            .strip_prefix(original_dir)
            .unwrap_or(&original)
            .to_string_lossy()
            .into_owned();
        match (encoded.get(&key), decoded.get(&key)) {
            (Some(enc), Some(dec)) => inputs.push(BatchInput {
                name,
                files: FileTriple {
                    original,
                    encoded: enc.clone(),
                    decoded: dec.clone(),
                },
            }),
            (enc, _) => {
                let missing = if enc.is_none() { "encoded" } else { "decoded" };
                tracing::warn!(file = %name, missing, "skipping file without counterpart");
            }
        }
    }
    tracing::debug!(count = inputs.len(), "collected batch inputs");
    Ok(inputs)
}

/// Analyzes all inputs on a thread pool, returning records in input order.
pub fn analyze_all(
    config: &AnalysisConfig,
    inputs: &[BatchInput],
    jobs: Option<usize>,
) -> Result<Vec<SummaryRecord>> {
    let threads = jobs
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .clamp(1, inputs.len().max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to start worker threads")?;
    tracing::debug!(threads, "analyzing batch");

    let records: Vec<SummaryRecord> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| match analyze_triple(config, &input.files) {
                Ok(analysis) => {
                    tracing::debug!(file = %input.name, snr_db = analysis.report.snr_db, "analyzed");
                    SummaryRecord::from_report(&input.name, &analysis.report)
                }
                Err(e) => {
                    eprintln!("{} [{}] {}", "error:".red().bold(), e.code(), e);
                    SummaryRecord::failed(&input.name)
                }
            })
            .collect()
    });
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use vadpcm_stats::aiff::{write_container, Chunk, FourCc};
    use vadpcm_stats::pcm::encode_aiff;

    struct Corpus {
        _tmp: tempfile::TempDir,
        options: StatsOptions,
    }

    fn corpus() -> Corpus {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let options = StatsOptions {
            original_dir: root.join("orig"),
            encoded_dir: root.join("enc"),
            decoded_dir: root.join("dec"),
            output: Some(root.join("summary.csv")),
            jobs: Some(2),
            config: None,
        };
        for dir in [
            &options.original_dir,
            &options.encoded_dir,
            &options.decoded_dir,
        ] {
            fs::create_dir_all(dir.join("22050")).unwrap();
        }
        Corpus { _tmp: tmp, options }
    }

    fn add_file(options: &StatsOptions, name: &str, frames: usize, decoded_len: usize) {
        let original: Vec<f64> = (0..frames * 16)
            .map(|i| (i as f64 * 0.1).cos() * 0.5)
            .collect();
        let mut decoded: Vec<f64> = original.iter().map(|s| s * 0.95).collect();
        decoded.resize(decoded_len, 0.0);
        let mut ssnd = vec![0u8; 8];
        ssnd.extend(std::iter::repeat(0).take(frames * 9));

        fs::write(
            options.original_dir.join(format!("{}.aiff", name)),
            encode_aiff(&original, 22050),
        )
        .unwrap();
        fs::write(
            options.encoded_dir.join(format!("{}.aifc", name)),
            write_container(FourCc::AIFC, &[Chunk::new(FourCc::SSND, &ssnd)]),
        )
        .unwrap();
        fs::write(
            options.decoded_dir.join(format!("{}.aiff", name)),
            encode_aiff(&decoded, 22050),
        )
        .unwrap();
    }

    #[test]
    fn test_collect_inputs_pairs_by_stem() {
        let corpus = corpus();
        let options = &corpus.options;
        add_file(options, "22050/a", 2, 32);
        add_file(options, "b", 1, 16);
        fs::write(options.original_dir.join("orphan.aiff"), b"").unwrap();

        let inputs = collect_inputs(
            &options.original_dir,
            &options.encoded_dir,
            &options.decoded_dir,
        )
        .unwrap();
        let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|n| n.ends_with("a.aiff")));
        assert!(names.contains(&"b.aiff"));
        for input in &inputs {
            assert_eq!(
                input.files.encoded.extension().and_then(|e| e.to_str()),
                Some("aifc")
            );
        }
    }

    #[test]
    fn test_stats_success() {
        let corpus = corpus();
        let options = &corpus.options;
        add_file(options, "22050/a", 2, 32);
        add_file(options, "b", 3, 48);

        let code = run(options).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let summary = fs::read_to_string(options.output.as_ref().unwrap()).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "file,signal_rms,error_rms");
        assert_eq!(lines.len(), 3);
        assert!(lines[1..].iter().all(|l| !l.ends_with(",,")));
    }

    #[test]
    fn test_stats_failure_keeps_row() {
        let corpus = corpus();
        let options = &corpus.options;
        add_file(options, "good", 2, 32);
        // Decoded stream one sample short of the padded length.
        add_file(options, "short", 2, 31);

        let code = run(options).unwrap();
        assert_eq!(code, ExitCode::from(1));

        let summary = fs::read_to_string(options.output.as_ref().unwrap()).unwrap();
        assert!(summary.contains("short.aiff,,\r\n"));
        assert!(summary.lines().any(|l| l.starts_with("good.aiff,0.")));
    }

    #[test]
    fn test_analyze_all_preserves_order() {
        let corpus = corpus();
        let options = &corpus.options;
        for name in ["c", "a", "b"] {
            add_file(options, name, 1, 16);
        }
        let inputs = collect_inputs(
            &options.original_dir,
            &options.encoded_dir,
            &options.decoded_dir,
        )
        .unwrap();
        let records = analyze_all(&AnalysisConfig::default(), &inputs, Some(3)).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(names, vec!["a.aiff", "b.aiff", "c.aiff"]);
    }

    #[test]
    fn test_empty_corpus() {
        let corpus = corpus();
        let records = analyze_all(&AnalysisConfig::default(), &[], None).unwrap();
        assert!(records.is_empty());
        assert_eq!(run(&corpus.options).unwrap(), ExitCode::SUCCESS);
    }
}
