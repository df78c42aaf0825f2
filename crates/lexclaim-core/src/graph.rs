/// Node payloads for the graph persistence collaborator.
///
/// The engine never writes to the graph itself; it emits plain `(name, text)`
/// pairs that the writer stores as-is.
pub mod knowledge_graph {
    use serde::Serialize;

    use crate::amount::format_amount;
    use crate::group::ClaimGroups;
    use crate::item::PlaintiffKey;

    /// The fixed case chain: `(from, relation, to)`.
    pub const CASE_CHAIN: &[(&str, &str, &str)] = &[
        ("Case", "包含", "Facts"),
        ("Facts", "適用", "Laws"),
        ("Laws", "計算", "Compensation"),
        ("Compensation", "包含", "CompensationDetail"),
    ];

    /// The lawyer-input side branch.
    pub const LAWYER_BRANCH: &[(&str, &str, &str)] = &[
        ("LawyerInput", "因", "Cause"),
        ("LawyerInput", "果", "Effect"),
    ];

    /// One `CompensationDetail` node.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct DetailNode {
        pub name: String,
        pub text: String,
    }

    /// Everything the graph collaborator writes for one case.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct GraphWrites {
        pub case_id: String,
        pub compensation_amount: u64,
        pub details: Vec<DetailNode>,
    }

    impl GraphWrites {
        /// One detail node per surviving claim, in group order.
        ///
        /// Named plaintiffs prefix the node name so that two plaintiffs'
        /// identical claim types stay distinct nodes.
        pub fn from_groups(case_id: &str, groups: &ClaimGroups) -> Self {
            let mut details = Vec::with_capacity(groups.item_count());
            for group in &groups.groups {
                for record in &group.items {
                    let label = record.claim_type.label_zh();
                    let name = match &group.plaintiff {
                        PlaintiffKey::Named(n) => format!("{n}-{label}"),
                        _ => label.to_string(),
                    };
                    let mut text = format!("{label}：{}元", format_amount(record.amount));
                    if let PlaintiffKey::Named(n) = &group.plaintiff {
                        text.push_str(&format!("（原告{n}）"));
                    }
                    details.push(DetailNode { name, text });
                }
            }

            Self {
                case_id: case_id.to_string(),
                compensation_amount: groups.total(),
                details,
            }
        }

        /// `(name, text)` pairs as consumed by the writer.
        pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
            self.details
                .iter()
                .map(|d| (d.name.as_str(), d.text.as_str()))
        }
    }
}

/// Documents for the search-index collaborator.
pub mod search_index {
    use serde::Serialize;

    use crate::group::{ClaimGroups, PlaintiffGroup};

    /// One indexed case, faceted on the total compensation amount.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct IndexDocument {
        pub case_id: String,
        pub compensation_amount: u64,
        pub plaintiffs: Vec<String>,
        pub groups: Vec<PlaintiffGroup>,
    }

    impl IndexDocument {
        pub fn from_groups(case_id: &str, groups: &ClaimGroups) -> Self {
            Self {
                case_id: case_id.to_string(),
                compensation_amount: groups.total(),
                plaintiffs: groups.plaintiffs().map(|p| p.to_string()).collect(),
                groups: groups.groups.clone(),
            }
        }
    }
}
