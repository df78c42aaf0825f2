pub mod amount;
pub mod config;
mod error;
pub mod graph;
pub mod group;
pub mod item;
pub mod patterns;

pub use amount::{contains_amount, format_amount, normalize_separators, parse_amount};
pub use config::{CalculationRule, KeywordFamily, PatternConfig};
pub use error::{ClaimError, ConfigError};
pub use graph::{knowledge_graph, search_index};
pub use group::{ClaimGroups, ClaimRecord, PlaintiffGroup};
pub use item::{ClaimType, DamageItem, Evidence, Origin, PlaintiffKey};
pub use patterns::Patterns;
