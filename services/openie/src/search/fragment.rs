//! Entailed sentence fragments

use serde::Serialize;

use crate::graph::{DepEdge, DependencyGraph, NodeSet};

/// One subtree deletion on a fragment's provenance trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deletion {
    pub node: usize,
    pub relation: String,
    pub removed: Vec<usize>,
    pub weight: f64,
}

/// An order-preserving subsequence of a sentence judged entailed by it.
///
/// Immutable once built. The tree edges it keeps are those between retained
/// tokens, reached through [`SentenceFragment::children`].
#[derive(Debug, Clone)]
pub struct SentenceFragment {
    retained: NodeSet,
    tokens: Vec<usize>,
    provenance: Vec<Deletion>,
    weight: f64,
}

impl SentenceFragment {
    pub(crate) fn new(retained: NodeSet, provenance: Vec<Deletion>, weight: f64) -> Self {
        Self {
            tokens: retained.to_vec(),
            retained,
            provenance,
            weight,
        }
    }

    /// The unmodified sentence, trivially self-entailed
    pub fn full(graph: &DependencyGraph) -> Self {
        Self::new(NodeSet::full(graph.len()), Vec::new(), 1.0)
    }

    /// Retained token indices, strictly increasing
    pub fn tokens(&self) -> &[usize] {
        &self.tokens
    }

    pub fn retained(&self) -> &NodeSet {
        &self.retained
    }

    pub fn contains(&self, token: usize) -> bool {
        self.retained.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn provenance(&self) -> &[Deletion] {
        &self.provenance
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_original(&self) -> bool {
        self.provenance.is_empty()
    }

    /// Tree edges from `node` to retained dependents; the fragment's own edges
    pub fn children<'g>(
        &'g self,
        graph: &'g DependencyGraph,
        node: usize,
    ) -> impl Iterator<Item = &'g DepEdge> + 'g {
        graph
            .children(node)
            .filter(move |e| self.retained.contains(e.dependent))
    }

    /// Surface string, whitespace-joined in sentence order
    pub fn render(&self, graph: &DependencyGraph) -> String {
        graph.render(self.tokens.iter().copied())
    }
}
