mod batch;
mod display;

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use lexclaim_core::{ClaimGroups, PatternConfig, Patterns};
use lexclaim_extract::{ClaimExtractor, Extraction};
use serde::Serialize;

use batch::OutputKind;

#[derive(Parser)]
#[command(name = "lexclaim", version, about = "Extract damage claims from Chinese civil judgments")]
struct Cli {
    /// JSON pattern-table overrides (keyword families, calculation bases, thresholds).
    #[arg(long, global = true, env = "LEXCLAIM_PATTERNS")]
    patterns: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the layout detection for a document.
    Detect { file: PathBuf },
    /// Extract the claims in one document.
    Extract {
        file: PathBuf,
        /// Print JSON instead of a card.
        #[arg(long)]
        json: bool,
    },
    /// Extract every case in a JSONL file of `{"case_id", "text"}` rows.
    Batch {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputKind::Full)]
        output: OutputKind,
    },
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    #[serde(flatten)]
    extraction: &'a Extraction,
    groups: ClaimGroups,
    total: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    tracing::debug!("lexclaim v{}", env!("CARGO_PKG_VERSION"));

    let extractor = build_extractor(cli.patterns.as_deref())?;

    match cli.command {
        Command::Detect { file } => {
            let text = read_text(&file)?;
            display::print_detection(&file.display().to_string(), &extractor.detect(&text))
                .context("writing detection")?;
        }
        Command::Extract { file, json } => {
            let text = read_text(&file)?;
            let extraction = extractor.extract(&text);
            if json {
                let output = ExtractOutput {
                    groups: extraction.groups(),
                    total: extraction.total(),
                    extraction: &extraction,
                };
                let rendered =
                    serde_json::to_string_pretty(&output).context("serializing extraction")?;
                println!("{rendered}");
            } else {
                display::print_claim_card(&file.display().to_string(), &extraction)
                    .context("writing claim card")?;
            }
        }
        Command::Batch { input, output } => {
            let (cases, skipped) = batch::load_cases(&input)?;
            eprintln!("  Read {} cases from {}", cases.len(), input.display());
            if skipped > 0 {
                eprintln!("  Skipped {skipped} blank or malformed rows");
            }

            let stdout = io::stdout();
            let stats = batch::run_batch(&extractor, &cases, output, BufWriter::new(stdout.lock()))?;

            eprintln!(
                "  Extracted {} claims from {} cases, total {}元 ({:.2}s) at {}",
                stats.items,
                stats.cases,
                lexclaim_core::format_amount(stats.total_amount),
                stats.elapsed_secs,
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    Ok(())
}

fn build_extractor(patterns: Option<&Path>) -> anyhow::Result<ClaimExtractor> {
    let Some(path) = patterns else {
        return Ok(ClaimExtractor::new(Patterns::default()));
    };
    let config = PatternConfig::from_path(path)
        .with_context(|| format!("loading pattern config {}", path.display()))?;
    let extractor = ClaimExtractor::from_config(&config)
        .with_context(|| format!("compiling pattern config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded pattern config");
    Ok(extractor)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
