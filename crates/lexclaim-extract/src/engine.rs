//! The extraction pipeline: detect → extract → attribute → dedup → filter.

use std::sync::Arc;

use lexclaim_core::{ClaimGroups, ConfigError, DamageItem, PatternConfig, Patterns};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calc_filter::CalculationBaseFilter;
use crate::dedup::Deduplicator;
use crate::detector::{FormatDetection, FormatDetector};
use crate::format::FormatBasedExtractor;
use crate::mixed::MixedStrategyExtractor;
use crate::plaintiff::{DocumentContext, PlaintiffContextResolver};

/// One document to extract, as handed over by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseText {
    pub case_id: String,
    pub text: String,
}

/// Counters for one document, for logging and the CLI summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub format_candidates: usize,
    pub mixed_candidates: usize,
    pub unparsed: usize,
    pub rejected: usize,
    pub totals_skipped: usize,
    pub unclassified: usize,
    pub merged: usize,
    pub calculation_bases: usize,
    pub survivors: usize,
}

/// Result of extracting one document.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub detection: FormatDetection,
    pub items: Vec<DamageItem>,
    pub stats: ExtractionStats,
}

impl Extraction {
    /// Surviving items grouped by plaintiff.
    pub fn groups(&self) -> ClaimGroups {
        ClaimGroups::from_items(&self.items)
    }

    pub fn total(&self) -> u64 {
        self.items.iter().map(DamageItem::amount).sum()
    }
}

/// [`Extraction`] tagged with its case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseExtraction {
    pub case_id: String,
    #[serde(flatten)]
    pub extraction: Extraction,
}

/// Runs every component over a document.
///
/// Holds no per-document state; one extractor serves any number of
/// documents concurrently.
pub struct ClaimExtractor {
    patterns: Arc<Patterns>,
    detector: FormatDetector,
    format: FormatBasedExtractor,
    mixed: MixedStrategyExtractor,
    resolver: PlaintiffContextResolver,
    dedup: Deduplicator,
    filter: CalculationBaseFilter,
}

impl ClaimExtractor {
    pub fn new(patterns: Patterns) -> Self {
        let patterns = Arc::new(patterns);
        Self {
            detector: FormatDetector::new(patterns.clone()),
            format: FormatBasedExtractor::new(patterns.clone()),
            mixed: MixedStrategyExtractor::new(patterns.clone()),
            resolver: PlaintiffContextResolver::new(patterns.clone()),
            dedup: Deduplicator,
            filter: CalculationBaseFilter::new(patterns.clone()),
            patterns,
        }
    }

    /// Compile `config` and build an extractor from it.
    pub fn from_config(config: &PatternConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Patterns::compile(config)?))
    }

    /// Replace the plaintiff resolver, e.g. with a custom strategy order.
    pub fn with_resolver(mut self, resolver: PlaintiffContextResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    pub fn detect(&self, text: &str) -> FormatDetection {
        self.detector.detect(text)
    }

    /// Extract the claims in `text`.
    ///
    /// Format extraction runs only for structured layouts; mixed extraction
    /// always runs. Both candidate lists are merged, deduplicated, and
    /// stripped of calculation bases.
    pub fn extract(&self, text: &str) -> Extraction {
        let detection = self.detector.detect(text);
        let context = DocumentContext::scan(text, &self.patterns);

        let format = self
            .format
            .extract(text, &detection, &context, &self.resolver);
        let mixed = self.mixed.extract(text, &context, &self.resolver);

        let mut stats = ExtractionStats {
            format_candidates: format.items.len(),
            mixed_candidates: mixed.items.len(),
            unparsed: format.unparsed + mixed.unparsed,
            rejected: format.rejected + mixed.rejected,
            totals_skipped: format.totals + mixed.totals,
            unclassified: format.unclassified + mixed.unclassified,
            ..Default::default()
        };

        let mut candidates = format.items;
        candidates.extend(mixed.items);
        let candidate_count = candidates.len();

        let deduped = self.dedup.dedup(candidates);
        stats.merged = candidate_count - deduped.len();

        let (items, excluded) = self.filter.filter(deduped);
        stats.calculation_bases = excluded;
        stats.survivors = items.len();

        tracing::info!(
            layout = ?detection.layout,
            confidence = detection.confidence,
            plaintiffs = context.names.len(),
            candidates = candidate_count,
            merged = stats.merged,
            calculation_bases = stats.calculation_bases,
            rejected = stats.rejected,
            survivors = stats.survivors,
            "extracted claims"
        );

        Extraction {
            detection,
            items,
            stats,
        }
    }

    pub fn extract_case(&self, case: &CaseText) -> CaseExtraction {
        let span = tracing::debug_span!("case", case_id = %case.case_id);
        let _enter = span.enter();
        CaseExtraction {
            case_id: case.case_id.clone(),
            extraction: self.extract(&case.text),
        }
    }

    /// Extract every case in parallel. Results keep the input order.
    pub fn extract_batch(&self, cases: &[CaseText]) -> Vec<CaseExtraction> {
        cases.par_iter().map(|case| self.extract_case(case)).collect()
    }
}

impl Default for ClaimExtractor {
    fn default() -> Self {
        Self::new(Patterns::default())
    }
}
