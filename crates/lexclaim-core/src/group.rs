//! Per-plaintiff aggregation of surviving claims.

use serde::Serialize;

use crate::item::{ClaimType, DamageItem, PlaintiffKey};

/// The downstream view of one claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimRecord {
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub amount: u64,
    pub description: String,
}

impl From<&DamageItem> for ClaimRecord {
    fn from(item: &DamageItem) -> Self {
        Self {
            claim_type: item.claim_type().clone(),
            amount: item.amount(),
            description: item.description().to_string(),
        }
    }
}

/// All claims attributed to one plaintiff key, in first-appearance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaintiffGroup {
    pub plaintiff: PlaintiffKey,
    pub items: Vec<ClaimRecord>,
}

impl PlaintiffGroup {
    pub fn subtotal(&self) -> u64 {
        self.items.iter().map(|r| r.amount).sum()
    }
}

/// Claims grouped by plaintiff, groups ordered by their first claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClaimGroups {
    pub groups: Vec<PlaintiffGroup>,
}

impl ClaimGroups {
    /// Group `items`, which must already be in appearance order.
    pub fn from_items(items: &[DamageItem]) -> Self {
        let mut groups: Vec<PlaintiffGroup> = Vec::new();
        for item in items {
            let record = ClaimRecord::from(item);
            match groups.iter_mut().find(|g| &g.plaintiff == item.plaintiff()) {
                Some(group) => group.items.push(record),
                None => groups.push(PlaintiffGroup {
                    plaintiff: item.plaintiff().clone(),
                    items: vec![record],
                }),
            }
        }
        Self { groups }
    }

    pub fn get(&self, plaintiff: &PlaintiffKey) -> Option<&PlaintiffGroup> {
        self.groups.iter().find(|g| &g.plaintiff == plaintiff)
    }

    pub fn plaintiffs(&self) -> impl Iterator<Item = &PlaintiffKey> {
        self.groups.iter().map(|g| &g.plaintiff)
    }

    /// Sum of every claim across all plaintiffs.
    pub fn total(&self) -> u64 {
        self.groups.iter().map(PlaintiffGroup::subtotal).sum()
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Evidence, Origin};

    fn item(amount: u64, plaintiff: PlaintiffKey, claim_type: ClaimType) -> DamageItem {
        let raw = format!("{}：{amount}元", claim_type.label_zh());
        let offset = raw.find(|c: char| c.is_ascii_digit()).unwrap();
        DamageItem::new(
            claim_type.clone(),
            amount,
            claim_type.label_zh(),
            Evidence {
                span: 0..raw.len(),
                raw_text: raw,
                offset,
                section: None,
            },
            0.8,
            plaintiff,
            Origin::Format,
        )
        .unwrap()
    }

    fn named(name: &str) -> PlaintiffKey {
        PlaintiffKey::Named(name.to_string())
    }

    #[test]
    fn groups_preserve_first_appearance() {
        let items = vec![
            item(1036, named("陳慶華"), ClaimType::MedicalExpense),
            item(4862, named("朱庭慧"), ClaimType::MedicalExpense),
            item(300_000, named("陳慶華"), ClaimType::ConsolationMoney),
            item(300_000, named("朱庭慧"), ClaimType::ConsolationMoney),
        ];
        let groups = ClaimGroups::from_items(&items);

        let order: Vec<_> = groups.plaintiffs().map(|p| p.as_str()).collect();
        assert_eq!(order, vec!["陳慶華", "朱庭慧"]);

        let chen = groups.get(&named("陳慶華")).unwrap();
        assert_eq!(
            chen.items.iter().map(|r| r.amount).collect::<Vec<_>>(),
            vec![1036, 300_000]
        );
        assert_eq!(chen.subtotal(), 301_036);
    }

    #[test]
    fn total_sums_all_plaintiffs() {
        let items = vec![
            item(50, PlaintiffKey::Default, ClaimType::MedicalExpense),
            item(460, PlaintiffKey::Default, ClaimType::MedicalExpense),
            item(1000, PlaintiffKey::General, ClaimType::General),
        ];
        let groups = ClaimGroups::from_items(&items);
        assert_eq!(groups.total(), 1510);
        assert_eq!(groups.item_count(), 3);
        assert_eq!(groups.groups.len(), 2);
    }

    #[test]
    fn empty_input() {
        let groups = ClaimGroups::from_items(&[]);
        assert!(groups.is_empty());
        assert_eq!(groups.total(), 0);
    }

    #[test]
    fn serializes_as_plain_keys() {
        let groups = ClaimGroups::from_items(&[item(
            1036,
            named("陳慶華"),
            ClaimType::MedicalExpense,
        )]);
        let v = serde_json::to_value(&groups).unwrap();
        assert_eq!(v["groups"][0]["plaintiff"], "陳慶華");
        assert_eq!(v["groups"][0]["items"][0]["type"], "medical_expense");
    }
}
