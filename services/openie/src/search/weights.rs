//! Relation label → deletion weight table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::base_relation;

/// A weight outside (0, 1] in one of the configured tables
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{table} weight for '{key}' must be in (0, 1], got {weight}")]
pub struct InvalidWeight {
    pub table: &'static str,
    pub key: String,
    pub weight: f64,
}

/// Which relations may be deleted, and how confident each deletion is.
///
/// A label missing from the table is never deletable. Lookup tries the full
/// label first (`nmod:poss`), then the base label (`nmod`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeletionWeights {
    weights: BTreeMap<String, f64>,
}

impl Default for DeletionWeights {
    fn default() -> Self {
        Self::standard()
    }
}

impl DeletionWeights {
    pub fn standard() -> Self {
        let entries = [
            // determiners and pure specifiers
            ("det", 1.0),
            ("predet", 1.0),
            ("det:predet", 1.0),
            ("discourse", 1.0),
            // adjectival and adverbial modifiers
            ("amod", 0.95),
            ("advmod", 0.9),
            ("poss", 0.9),
            ("nmod:poss", 0.9),
            ("tmod", 0.9),
            ("nmod:tmod", 0.9),
            ("obl:tmod", 0.9),
            ("npadvmod", 0.85),
            ("obl:npmod", 0.85),
            ("appos", 0.85),
            // prepositional attachments
            ("prep", 0.8),
            ("nmod", 0.8),
            ("obl", 0.8),
            // clausal modifiers
            ("acl:relcl", 0.75),
            ("rcmod", 0.75),
            ("acl", 0.7),
            ("vmod", 0.7),
            ("partmod", 0.7),
            ("infmod", 0.7),
            ("conj", 0.7),
            ("advcl", 0.6),
            ("parataxis", 0.5),
            ("dep", 0.5),
        ];
        Self {
            weights: entries
                .iter()
                .map(|(label, weight)| (label.to_string(), *weight))
                .collect(),
        }
    }

    pub fn from_map(weights: BTreeMap<String, f64>) -> Result<Self, InvalidWeight> {
        let table = Self { weights };
        table.validate()?;
        Ok(table)
    }

    /// Standard table with `overrides` layered on top
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, f64>) -> Result<Self, InvalidWeight> {
        for (label, weight) in overrides {
            self.weights.insert(label.clone(), *weight);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), InvalidWeight> {
        for (key, weight) in &self.weights {
            if !(*weight > 0.0 && *weight <= 1.0) {
                return Err(InvalidWeight {
                    table: "deletion",
                    key: key.clone(),
                    weight: *weight,
                });
            }
        }
        Ok(())
    }

    /// Weight for deleting a dependent attached by `relation`
    pub fn weight(&self, relation: &str) -> Option<f64> {
        self.weights
            .get(relation)
            .or_else(|| self.weights.get(base_relation(relation)))
            .copied()
    }

    pub fn is_deletable(&self, relation: &str) -> bool {
        self.weight(relation).is_some()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
