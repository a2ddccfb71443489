//! Confidence scoring for extracted triples

use serde::Serialize;

use crate::segment::{CandidateTriple, RuleWeights};

/// Path weight × rule weight, clamped to [0, 1]
///
/// Fragment weights only shrink along a deletion chain, so a triple read off
/// a more heavily edited fragment never scores above one read off its
/// ancestor under the same rule.
pub fn score(fragment_weight: f64, rule_weight: f64) -> f64 {
    let score = fragment_weight * rule_weight;
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

pub fn candidate_confidence(candidate: &CandidateTriple, rules: &RuleWeights) -> f64 {
    score(candidate.fragment_weight, rules.weight(candidate.rule))
}

/// Reporting band of a confidence value, written alongside JSONL triples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    /// Bands start at 0.8, 0.6 and 0.4; NaN falls through to `VeryLow`
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.8 => ConfidenceLevel::High,
            s if s >= 0.6 => ConfidenceLevel::Medium,
            s if s >= 0.4 => ConfidenceLevel::Low,
            _ => ConfidenceLevel::VeryLow,
        }
    }
}
