//! Clause rules and their weights

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::search::InvalidWeight;

/// Segmentation rules, primary ones in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseRule {
    CopulaPrepObject,
    Copula,
    VerbObject,
    VerbPrepObject,
    Appositive,
}

impl ClauseRule {
    /// Tried in this order; the first that yields triples wins
    pub const PRIMARY: [ClauseRule; 4] = [
        ClauseRule::CopulaPrepObject,
        ClauseRule::Copula,
        ClauseRule::VerbObject,
        ClauseRule::VerbPrepObject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseRule::CopulaPrepObject => "copula_prep_object",
            ClauseRule::Copula => "copula",
            ClauseRule::VerbObject => "verb_object",
            ClauseRule::VerbPrepObject => "verb_prep_object",
            ClauseRule::Appositive => "appositive",
        }
    }
}

impl fmt::Display for ClauseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_copula_prep_object() -> f64 {
    0.9
}

fn default_copula() -> f64 {
    1.0
}

fn default_verb_object() -> f64 {
    1.0
}

fn default_verb_prep_object() -> f64 {
    0.9
}

fn default_appositive() -> f64 {
    0.8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleWeights {
    #[serde(default = "default_copula_prep_object")]
    pub copula_prep_object: f64,
    #[serde(default = "default_copula")]
    pub copula: f64,
    #[serde(default = "default_verb_object")]
    pub verb_object: f64,
    #[serde(default = "default_verb_prep_object")]
    pub verb_prep_object: f64,
    #[serde(default = "default_appositive")]
    pub appositive: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            copula_prep_object: default_copula_prep_object(),
            copula: default_copula(),
            verb_object: default_verb_object(),
            verb_prep_object: default_verb_prep_object(),
            appositive: default_appositive(),
        }
    }
}

impl RuleWeights {
    pub fn weight(&self, rule: ClauseRule) -> f64 {
        match rule {
            ClauseRule::CopulaPrepObject => self.copula_prep_object,
            ClauseRule::Copula => self.copula,
            ClauseRule::VerbObject => self.verb_object,
            ClauseRule::VerbPrepObject => self.verb_prep_object,
            ClauseRule::Appositive => self.appositive,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidWeight> {
        for rule in ClauseRule::PRIMARY.iter().chain(&[ClauseRule::Appositive]) {
            let weight = self.weight(*rule);
            if !(weight > 0.0 && weight <= 1.0) {
                return Err(InvalidWeight {
                    table: "rule",
                    key: rule.as_str().to_string(),
                    weight,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_uses_defaults() {
        let weights: RuleWeights = toml::from_str("copula = 0.7").unwrap();
        assert_eq!(weights.copula, 0.7);
        assert_eq!(weights.weight(ClauseRule::VerbObject), 1.0);
        assert_eq!(weights.weight(ClauseRule::Appositive), 0.8);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let weights = RuleWeights {
            appositive: 1.2,
            ..RuleWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert_eq!(err.key, "appositive");
        assert_eq!(err.table, "rule");
    }
}
