//! Batch pipeline: reads JSONL cases, extracts in parallel, writes one JSON
//! record per case.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use clap::ValueEnum;
use lexclaim_core::ClaimGroups;
use lexclaim_core::knowledge_graph::GraphWrites;
use lexclaim_core::search_index::IndexDocument;
use lexclaim_extract::{CaseExtraction, CaseText, ClaimExtractor};
use serde::Serialize;

/// Shape of each output record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    /// Graph detail nodes per case.
    Graph,
    /// Search-index documents.
    Index,
    /// Detection, items, groups, and counters.
    Full,
}

pub struct BatchStats {
    pub cases: usize,
    pub items: usize,
    pub total_amount: u64,
    pub elapsed_secs: f64,
}

#[derive(Serialize)]
struct FullRecord<'a> {
    #[serde(flatten)]
    case: &'a CaseExtraction,
    groups: ClaimGroups,
}

/// Parse one `{"case_id", "text"}` object per line.
///
/// Blank and malformed rows are skipped with a warning; the second value is
/// the number skipped.
pub fn read_cases(reader: impl BufRead) -> anyhow::Result<(Vec<CaseText>, usize)> {
    let mut cases = Vec::new();
    let mut skipped = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", idx + 1))?;
        let line = line.trim();
        if line.is_empty() {
            skipped += 1;
            continue;
        }
        match serde_json::from_str::<CaseText>(line) {
            Ok(case) => cases.push(case),
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "skipping malformed row");
                skipped += 1;
            }
        }
    }
    Ok((cases, skipped))
}

pub fn load_cases(path: &Path) -> anyhow::Result<(Vec<CaseText>, usize)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_cases(BufReader::new(file))
}

/// Extract `cases` and write one JSON line per case to `out`, in input order.
pub fn run_batch(
    extractor: &ClaimExtractor,
    cases: &[CaseText],
    output: OutputKind,
    mut out: impl Write,
) -> anyhow::Result<BatchStats> {
    let start = Instant::now();
    let results = extractor.extract_batch(cases);

    let mut items = 0;
    let mut total_amount = 0;
    for result in &results {
        let groups = result.extraction.groups();
        items += result.extraction.items.len();
        total_amount += groups.total();

        let line = match output {
            OutputKind::Graph => {
                serde_json::to_string(&GraphWrites::from_groups(&result.case_id, &groups))
            }
            OutputKind::Index => {
                serde_json::to_string(&IndexDocument::from_groups(&result.case_id, &groups))
            }
            OutputKind::Full => serde_json::to_string(&FullRecord {
                case: result,
                groups,
            }),
        }
        .with_context(|| format!("serializing case {}", result.case_id))?;
        writeln!(out, "{line}").context("writing output")?;
    }
    out.flush().context("flushing output")?;

    Ok(BatchStats {
        cases: results.len(),
        items,
        total_amount,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
