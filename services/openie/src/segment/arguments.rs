//! Argument spans inside a clause

use crate::graph::{DependencyGraph, NodeSet};

/// Never part of any argument span
const SPAN_EXCLUDED: &[&str] = &["punct", "appos"];

/// Dropped from a span only directly under its head (coordination)
const HEAD_EXCLUDED: &[&str] = &["conj", "cc"];

pub const SUBJECT_RELATIONS: &[&str] = &["nsubj", "nsubjpass"];
pub const OBJECT_RELATIONS: &[&str] = &["obj", "dobj"];

pub const RELATIVE_PRONOUNS: &[&str] = &["that", "which", "who", "whom"];

/// Tokens under `head` inside `nodes`, without punctuation, appositives or
/// the head's own coordinated conjuncts. Sorted.
pub fn argument_span(graph: &DependencyGraph, nodes: &NodeSet, head: usize) -> Vec<usize> {
    let mut visited = NodeSet::empty(graph.len());
    let mut stack = vec![head];
    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        for edge in graph.children(current) {
            let child = edge.dependent;
            if !nodes.contains(child) || visited.contains(child) {
                continue;
            }
            let base = edge.base_relation();
            if SPAN_EXCLUDED.contains(&base) || graph.token(child).is_punctuation() {
                continue;
            }
            if current == head && HEAD_EXCLUDED.contains(&base) {
                continue;
            }
            stack.push(child);
        }
    }
    visited.to_vec()
}

/// `head` followed by its coordinated conjuncts, in sentence order
pub fn conjuncts(graph: &DependencyGraph, nodes: &NodeSet, head: usize) -> Vec<usize> {
    let mut out = vec![head];
    let mut seen = NodeSet::empty(graph.len());
    seen.insert(head);
    let mut cursor = 0;
    while cursor < out.len() {
        let current = out[cursor];
        cursor += 1;
        for conj in graph.children_labeled(current, &["conj"]) {
            if nodes.contains(conj) && seen.insert(conj) {
                out.push(conj);
            }
        }
    }
    out.sort_unstable();
    out
}

/// Retained dependents of `node` under one of `labels`
pub fn dependents(
    graph: &DependencyGraph,
    nodes: &NodeSet,
    node: usize,
    labels: &[&str],
) -> Vec<usize> {
    graph
        .children_labeled(node, labels)
        .filter(|d| nodes.contains(*d))
        .collect()
}

pub fn is_relative_pronoun(graph: &DependencyGraph, token: usize) -> bool {
    RELATIVE_PRONOUNS.contains(&graph.token(token).lemma_lower().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DepEdge, Token};

    // cats , dogs and the old birds , my pets , sleep
    fn pets() -> DependencyGraph {
        let words = [
            "cats", ",", "dogs", "and", "the", "old", "birds", ",", "my", "pets", ",", "sleep",
        ];
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let pos = if w.chars().all(|c| c.is_ascii_punctuation()) { "PUNCT" } else { "X" };
                Token::new(i, w, w, pos)
            })
            .collect();
        let edges = vec![
            DepEdge::new(11, 0, "nsubj"),
            DepEdge::new(2, 1, "punct"),
            DepEdge::new(0, 2, "conj"),
            DepEdge::new(6, 3, "cc"),
            DepEdge::new(6, 4, "det"),
            DepEdge::new(6, 5, "amod"),
            DepEdge::new(0, 6, "conj"),
            DepEdge::new(9, 7, "punct"),
            DepEdge::new(9, 8, "nmod:poss"),
            DepEdge::new(6, 9, "appos"),
            DepEdge::new(9, 10, "punct"),
        ];
        DependencyGraph::new(tokens, edges).unwrap()
    }

    #[test]
    fn test_conjuncts_and_spans() {
        let g = pets();
        let all = NodeSet::full(g.len());
        assert_eq!(conjuncts(&g, &all, 0), vec![0, 2, 6]);
        assert_eq!(argument_span(&g, &all, 0), vec![0]);
        assert_eq!(argument_span(&g, &all, 2), vec![2]);
        assert_eq!(argument_span(&g, &all, 6), vec![4, 5, 6]);
        assert_eq!(argument_span(&g, &all, 9), vec![8, 9]);
    }

    #[test]
    fn test_spans_respect_retained_nodes() {
        let g = pets();
        let mut nodes = NodeSet::full(g.len());
        nodes.remove(5);
        nodes.remove(2);
        assert_eq!(argument_span(&g, &nodes, 6), vec![4, 6]);
        assert_eq!(conjuncts(&g, &nodes, 0), vec![0, 6]);
        assert_eq!(dependents(&g, &nodes, 11, SUBJECT_RELATIONS), vec![0]);
    }
}
