//! vadpcmstats - measure how faithfully VADPCM reproduces a signal
//!
//! This binary compares original PCM against the output of a VADPCM
//! encode/decode round trip, for one file or a whole corpus.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use vadpcm_stats_cli::commands;
use vadpcm_stats_cli::commands::stats::StatsOptions;
use vadpcm_stats_cli::logging::init_logging;

/// vadpcmstats - VADPCM codec fidelity analysis
#[derive(Parser)]
#[command(name = "vadpcmstats")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one original/encoded/decoded triple
    Analyze {
        /// Original PCM file (AIFF or WAV)
        original: PathBuf,

        /// VADPCM-encoded AIFF-C file
        encoded: PathBuf,

        /// PCM decoded from the encoded file (AIFF or WAV)
        decoded: PathBuf,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,

        /// Write per-frame statistics as CSV to this file
        #[arg(long)]
        frames: Option<PathBuf>,

        /// Analysis configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Analyze a corpus and write the per-file summary CSV
    Stats {
        /// Directory of original PCM files
        #[arg(long)]
        original_dir: PathBuf,

        /// Directory of VADPCM-encoded files
        #[arg(long)]
        encoded_dir: PathBuf,

        /// Directory of decoded PCM files
        #[arg(long)]
        decoded_dir: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of worker threads (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Analysis configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            original,
            encoded,
            decoded,
            json,
            frames,
            config,
        } => {
            let files = commands::analyze::triple(original, encoded, decoded);
            commands::analyze::run(&files, frames.as_deref(), config.as_deref(), json)
        }
        Commands::Stats {
            original_dir,
            encoded_dir,
            decoded_dir,
            output,
            jobs,
            config,
        } => commands::stats::run(&StatsOptions {
            original_dir,
            encoded_dir,
            decoded_dir,
            output,
            jobs,
            config,
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
