//! Candidate triples before rendering

use crate::graph::{DependencyGraph, NodeSet};
use crate::segment::rules::ClauseRule;

/// Subject / relation / object token spans from one fragment.
///
/// Spans are sorted token indices and pairwise disjoint. An appositive
/// carries no relation tokens, only the implied copula.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTriple {
    pub subject: Vec<usize>,
    pub relation: Vec<usize>,
    pub implied_relation: Option<String>,
    pub object: Vec<usize>,
    pub rule: ClauseRule,
    pub fragment_weight: f64,
}

impl CandidateTriple {
    pub(crate) fn new(
        subject: Vec<usize>,
        relation: Vec<usize>,
        object: Vec<usize>,
        rule: ClauseRule,
        fragment_weight: f64,
    ) -> Self {
        Self {
            subject: sorted(subject),
            relation: sorted(relation),
            implied_relation: None,
            object: sorted(object),
            rule,
            fragment_weight,
        }
    }

    pub(crate) fn implied(mut self, relation: &str) -> Self {
        self.implied_relation = Some(relation.to_string());
        self
    }

    /// Spans are non-empty after punctuation is dropped and never share a token
    pub fn is_well_formed(&self, graph: &DependencyGraph) -> bool {
        let content = |span: &[usize]| span.iter().any(|i| !graph.token(*i).is_punctuation());
        if !content(&self.subject) || !content(&self.object) {
            return false;
        }
        if !content(&self.relation) && self.implied_relation.is_none() {
            return false;
        }
        let span = |tokens: &[usize]| NodeSet::from_indices(graph.len(), tokens.iter().copied());
        let (subject, relation, object) = (span(&self.subject), span(&self.relation), span(&self.object));
        subject.is_disjoint(&relation) && subject.is_disjoint(&object) && relation.is_disjoint(&object)
    }
}

fn sorted(mut span: Vec<usize>) -> Vec<usize> {
    span.sort_unstable();
    span.dedup();
    span
}
