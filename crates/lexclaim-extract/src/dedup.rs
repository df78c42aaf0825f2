//! Collapsing repeated mentions of the same claim.

use std::collections::HashMap;

use lexclaim_core::{DamageItem, Origin, PlaintiffKey};

/// What makes two candidates the same claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ClusterKey {
    /// Named and default items: one claim per amount per plaintiff.
    Attributed(u64, PlaintiffKey),
    /// Unattributed items stay apart across plaintiff sections.
    General(u64, Option<usize>),
}

impl ClusterKey {
    fn of(item: &DamageItem) -> Self {
        match item.plaintiff() {
            PlaintiffKey::General => Self::General(item.amount(), item.section()),
            other => Self::Attributed(item.amount(), other.clone()),
        }
    }
}

/// Whether `candidate` should represent its cluster instead of `current`.
/// Earlier indices win ties, so only a strictly better candidate replaces.
fn outranks(candidate: &DamageItem, current: &DamageItem) -> bool {
    match candidate.confidence().total_cmp(&current.confidence()) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => {
            candidate.origin() == Origin::Format && current.origin() != Origin::Format
        }
    }
}

/// Merges candidates describing the same claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator;

impl Deduplicator {
    /// Collapse `items` to one representative per claim.
    ///
    /// # Algorithm
    ///
    /// 1. Cluster by `(amount, plaintiff)`; `general` items also key on their
    ///    section so that separate plaintiff sections never merge.
    /// 2. Each cluster keeps its highest-confidence item, preferring
    ///    [`Origin::Format`] on ties, then the first seen.
    /// 3. A `general` representative is dropped when a named representative
    ///    has the same amount in the same section, or in any section when the
    ///    general item has none.
    /// 4. Survivors are ordered by document offset.
    ///
    /// Representatives are returned unchanged, so a second pass is a no-op.
    pub fn dedup(&self, items: Vec<DamageItem>) -> Vec<DamageItem> {
        let before = items.len();
        let mut slots: HashMap<ClusterKey, usize> = HashMap::new();
        let mut reps: Vec<DamageItem> = Vec::new();

        for item in items {
            let key = ClusterKey::of(&item);
            match slots.get(&key) {
                Some(&slot) => {
                    if outranks(&item, &reps[slot]) {
                        tracing::debug!(
                            amount = item.amount(),
                            plaintiff = %item.plaintiff(),
                            kept = ?item.origin(),
                            "merged duplicate claim"
                        );
                        reps[slot] = item;
                    }
                }
                None => {
                    slots.insert(key, reps.len());
                    reps.push(item);
                }
            }
        }

        let named: Vec<(u64, Option<usize>)> = reps
            .iter()
            .filter(|r| r.plaintiff().is_named())
            .map(|r| (r.amount(), r.section()))
            .collect();
        reps.retain(|r| {
            if r.plaintiff() != &PlaintiffKey::General {
                return true;
            }
            let absorbed = named
                .iter()
                .any(|&(amount, section)| amount == r.amount() && (r.section().is_none() || section == r.section()));
            if absorbed {
                tracing::debug!(amount = r.amount(), "general claim absorbed by named claim");
            }
            !absorbed
        });

        reps.sort_by_key(|r| r.offset());
        tracing::debug!(before, after = reps.len(), "deduplicated");
        reps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexclaim_core::{ClaimType, Evidence};

    /// An item whose amount sits at `offset` in a synthetic document.
    fn item(
        amount: u64,
        plaintiff: PlaintiffKey,
        origin: Origin,
        confidence: f32,
        offset: usize,
        section: Option<usize>,
    ) -> DamageItem {
        let raw = format!("醫療費用{amount}元");
        let prefix = "醫療費用".len();
        DamageItem::new(
            ClaimType::MedicalExpense,
            amount,
            "醫療費用",
            Evidence {
                span: offset - prefix..offset - prefix + raw.len(),
                raw_text: raw,
                offset,
                section,
            },
            confidence,
            plaintiff,
            origin,
        )
        .unwrap()
    }

    fn named(n: &str) -> PlaintiffKey {
        PlaintiffKey::Named(n.to_string())
    }

    #[test]
    fn format_beats_mixed_on_equal_key() {
        let items = vec![
            item(1036, named("陳慶華"), Origin::Mixed, 0.6, 100, Some(0)),
            item(1036, named("陳慶華"), Origin::Format, 0.8, 100, Some(0)),
        ];
        let out = Deduplicator.dedup(items);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].origin(), Origin::Format);
    }

    #[test]
    fn format_wins_confidence_tie() {
        let items = vec![
            item(500, PlaintiffKey::Default, Origin::Mixed, 0.8, 300, None),
            item(500, PlaintiffKey::Default, Origin::Format, 0.8, 100, None),
        ];
        let out = Deduplicator.dedup(items);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].origin(), Origin::Format);
        assert_eq!(out[0].offset(), 100);
    }

    #[test]
    fn first_seen_wins_full_tie() {
        let items = vec![
            item(500, PlaintiffKey::Default, Origin::Mixed, 0.6, 300, None),
            item(500, PlaintiffKey::Default, Origin::Mixed, 0.6, 100, None),
        ];
        let out = Deduplicator.dedup(items);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].offset(), 300);
    }

    #[test]
    fn distinct_plaintiffs_never_merge() {
        let items = vec![
            item(300_000, named("陳慶華"), Origin::Format, 0.8, 100, Some(0)),
            item(300_000, named("朱庭慧"), Origin::Format, 0.8, 400, Some(200)),
        ];
        assert_eq!(Deduplicator.dedup(items).len(), 2);
    }

    #[test]
    fn general_items_in_different_sections_stay_apart() {
        let items = vec![
            item(2000, PlaintiffKey::General, Origin::Mixed, 0.4, 100, Some(0)),
            item(2000, PlaintiffKey::General, Origin::Mixed, 0.4, 400, Some(200)),
        ];
        assert_eq!(Deduplicator.dedup(items).len(), 2);
    }

    #[test]
    fn general_absorbed_by_named_in_same_section() {
        let items = vec![
            item(300_000, PlaintiffKey::General, Origin::Mixed, 0.6, 150, Some(0)),
            item(300_000, named("陳慶華"), Origin::Format, 0.8, 100, Some(0)),
            item(300_000, PlaintiffKey::General, Origin::Mixed, 0.6, 500, Some(200)),
        ];
        let out = Deduplicator.dedup(items);
        let offsets: Vec<_> = out.iter().map(|i| i.offset()).collect();
        assert_eq!(offsets, vec![100, 500]);
    }

    #[test]
    fn sectionless_general_absorbed_by_any_named() {
        let items = vec![
            item(300_000, named("陳慶華"), Origin::Format, 0.8, 100, Some(0)),
            item(300_000, PlaintiffKey::General, Origin::Mixed, 0.6, 900, None),
        ];
        let out = Deduplicator.dedup(items);
        assert_eq!(out.len(), 1);
        assert!(out[0].plaintiff().is_named());
    }

    #[test]
    fn output_ordered_by_offset() {
        let items = vec![
            item(3, PlaintiffKey::Default, Origin::Mixed, 0.6, 300, None),
            item(1, PlaintiffKey::Default, Origin::Mixed, 0.6, 100, None),
            item(2, PlaintiffKey::Default, Origin::Mixed, 0.6, 200, None),
        ];
        let amounts: Vec<_> = Deduplicator.dedup(items).iter().map(|i| i.amount()).collect();
        assert_eq!(amounts, vec![1, 2, 3]);
    }

    #[test]
    fn idempotent() {
        let items = vec![
            item(300_000, PlaintiffKey::General, Origin::Mixed, 0.6, 150, Some(0)),
            item(300_000, named("陳慶華"), Origin::Format, 0.8, 100, Some(0)),
            item(300_000, named("陳慶華"), Origin::Mixed, 0.6, 120, Some(0)),
            item(2000, PlaintiffKey::General, Origin::Mixed, 0.4, 700, Some(200)),
            item(2000, PlaintiffKey::General, Origin::Mixed, 0.4, 710, Some(200)),
            item(4862, named("朱庭慧"), Origin::Mixed, 0.6, 600, Some(200)),
        ];
        let once = Deduplicator.dedup(items);
        let twice = Deduplicator.dedup(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
