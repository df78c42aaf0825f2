//! Candidate collection shared by both extractors.

use lexclaim_core::{ClaimError, DamageItem};

/// Candidates from one extraction pass plus the reasons others were dropped.
#[derive(Debug, Default)]
pub struct Harvest {
    pub items: Vec<DamageItem>,
    /// Amount tokens whose digits did not parse.
    pub unparsed: usize,
    /// Candidates that violated a [`DamageItem`] invariant.
    pub rejected: usize,
    /// Amounts labelled as a sum of other claims.
    pub totals: usize,
    /// Amounts with no claim keyword in reach.
    pub unclassified: usize,
}

impl Harvest {
    pub(crate) fn push(&mut self, candidate: Result<DamageItem, ClaimError>) {
        match candidate {
            Ok(item) => self.items.push(item),
            Err(e) => {
                tracing::warn!(error = %e, "rejected claim candidate");
                self.rejected += 1;
            }
        }
    }
}
