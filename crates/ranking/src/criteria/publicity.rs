use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tables::LookupTable;
use super::{CriterionScorer, Evaluation, decode};
use crate::error::{ConfigError, PayloadError};

/// A yes/no item of the publicity checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagRule {
    pub name: String,
    /// Only counts once a reviewer confirmed it.
    pub gated: bool,
}

impl FlagRule {
    pub fn new(name: impl Into<String>, gated: bool) -> Self {
        Self {
            name: name.into(),
            gated,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlagValue {
    present: bool,
    verified: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PublicityData {
    mentions: Vec<Value>,
    flags: BTreeMap<String, FlagValue>,
}

/// Media mentions ranked against peers, plus a checklist bonus that is added
/// to the resulting place.
#[derive(Debug, Clone)]
pub struct PublicityScorer {
    pub flags: Vec<FlagRule>,
    pub bonus: LookupTable,
}

impl Default for PublicityScorer {
    fn default() -> Self {
        let flags = vec![
            FlagRule::new("community_page", true),
            FlagRule::new("emblem", false),
            FlagRule::new("uniform", false),
            FlagRule::new("anthem", true),
        ];
        let bonus = LookupTable::descending(flags.len() as u32, 0);
        Self { flags, bonus }
    }
}

impl PublicityScorer {
    fn checked_flags(&self, data: &PublicityData) -> u32 {
        self.flags
            .iter()
            .filter(|rule| {
                data.flags
                    .get(&rule.name)
                    .is_some_and(|flag| flag.present && (!rule.gated || flag.verified))
            })
            .count() as u32
    }
}

impl CriterionScorer for PublicityScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: PublicityData = decode(data)?;
        let score = Decimal::from(data.mentions.len() as u64);
        let bonus = self.bonus.get_or_worst(self.checked_flags(&data));
        Ok(Evaluation::ScoreWithBonus { score, bonus })
    }

    fn validate(&self, criterion: &str) -> Result<(), ConfigError> {
        self.bonus.validate_covers(criterion, self.flags.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn gated_flags_need_verification() {
        let data = json!({
            "mentions": [{ "url": "https://example.org/a" }, { "url": "https://example.org/b" }],
            "flags": {
                "community_page": { "present": true },
                "emblem": { "present": true },
                "uniform": { "present": true },
                "anthem": { "present": true, "verified": true },
            }
        });
        assert_eq!(
            PublicityScorer::default().evaluate(&data).unwrap(),
            Evaluation::ScoreWithBonus {
                score: dec!(2),
                bonus: 1
            }
        );
    }

    #[test]
    fn empty_report_has_the_largest_bonus() {
        assert_eq!(
            PublicityScorer::default().evaluate(&json!({})).unwrap(),
            Evaluation::ScoreWithBonus {
                score: Decimal::ZERO,
                bonus: 4
            }
        );
    }
}
