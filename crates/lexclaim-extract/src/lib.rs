//! Damage-claim extraction for Chinese civil judgments.
//!
//! [`ClaimExtractor`] runs the full pipeline over one document or a batch:
//! layout detection, format and mixed extraction, plaintiff attribution,
//! deduplication, and calculation-base filtering.

mod calc_filter;
pub mod classify;
mod dedup;
mod detector;
mod engine;
mod format;
mod harvest;
mod mixed;
pub mod plaintiff;
mod text;

pub use calc_filter::CalculationBaseFilter;
pub use dedup::Deduplicator;
pub use detector::{FormatDetection, FormatDetector, Layout, StructureKind};
pub use engine::{CaseExtraction, CaseText, ClaimExtractor, Extraction, ExtractionStats};
pub use format::FormatBasedExtractor;
pub use harvest::Harvest;
pub use mixed::MixedStrategyExtractor;
pub use plaintiff::{DocumentContext, PlaintiffContextResolver, PlaintiffStrategy};
