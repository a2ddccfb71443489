//! Rendering, deduplication and filtering of triples

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::graph::DependencyGraph;
use crate::segment::{CandidateTriple, RuleWeights};
use crate::triples::confidence::{candidate_confidence, ConfidenceLevel};

/// A rendered subject–relation–object fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTriple {
    pub subject: String,
    pub relation: String,
    pub object: String,
    pub confidence: f64,
}

impl RelationTriple {
    pub fn new(subject: &str, relation: &str, object: &str, confidence: f64) -> Self {
        Self {
            subject: subject.to_string(),
            relation: relation.to_string(),
            object: object.to_string(),
            confidence,
        }
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    pub fn to_tsv(&self, with_confidence: bool) -> String {
        if with_confidence {
            format!(
                "{:.3}\t{}\t{}\t{}",
                self.confidence, self.subject, self.relation, self.object
            )
        } else {
            format!("{}\t{}\t{}", self.subject, self.relation, self.object)
        }
    }
}

impl fmt::Display for RelationTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tsv(true))
    }
}

/// Words of `span` in sentence order, punctuation dropped, whitespace collapsed
pub fn render_span(graph: &DependencyGraph, span: &[usize]) -> String {
    let mut indices = span.to_vec();
    indices.sort_unstable();
    indices.dedup();
    indices
        .iter()
        .map(|i| graph.token(*i))
        .filter(|t| !t.is_punctuation())
        .flat_map(|t| t.word.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns candidates into the final per-sentence triple list
#[derive(Debug, Clone, Default)]
pub struct TripleAssembler {
    rule_weights: RuleWeights,
    min_confidence: Option<f64>,
}

impl TripleAssembler {
    pub fn new(rule_weights: RuleWeights) -> Self {
        Self {
            rule_weights,
            min_confidence: None,
        }
    }

    pub fn with_min_confidence(mut self, threshold: Option<f64>) -> Self {
        self.min_confidence = threshold;
        self
    }

    pub fn render(&self, graph: &DependencyGraph, candidate: &CandidateTriple) -> RelationTriple {
        let relation = match &candidate.implied_relation {
            Some(implied) if candidate.relation.is_empty() => implied.clone(),
            Some(implied) => format!("{} {}", implied, render_span(graph, &candidate.relation)),
            None => render_span(graph, &candidate.relation),
        };
        RelationTriple {
            subject: render_span(graph, &candidate.subject),
            relation,
            object: render_span(graph, &candidate.object),
            confidence: candidate_confidence(candidate, &self.rule_weights),
        }
    }

    pub fn assemble(&self, graph: &DependencyGraph, candidates: &[CandidateTriple]) -> Vec<RelationTriple> {
        let rendered = candidates.iter().map(|c| self.render(graph, c)).collect();
        self.finish(rendered)
    }

    /// Deduplicate on the three texts keeping the best confidence, apply the
    /// threshold, and order by confidence then text. Idempotent.
    pub fn finish(&self, triples: Vec<RelationTriple>) -> Vec<RelationTriple> {
        let mut best: HashMap<(String, String, String), f64> = HashMap::new();
        for triple in triples {
            if triple.subject.is_empty() || triple.relation.is_empty() || triple.object.is_empty() {
                continue;
            }
            let entry = best
                .entry((triple.subject, triple.relation, triple.object))
                .or_insert(triple.confidence);
            if triple.confidence > *entry {
                *entry = triple.confidence;
            }
        }

        let mut out: Vec<RelationTriple> = best
            .into_iter()
            .filter(|(_, confidence)| self.min_confidence.map_or(true, |min| *confidence >= min))
            .map(|((subject, relation, object), confidence)| RelationTriple {
                subject,
                relation,
                object,
                confidence,
            })
            .collect();

        out.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.subject.cmp(&b.subject))
                .then_with(|| a.relation.cmp(&b.relation))
                .then_with(|| a.object.cmp(&b.object))
        });
        out
    }
}
