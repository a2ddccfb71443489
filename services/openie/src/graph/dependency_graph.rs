//! Immutable dependency graph built once per sentence

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::nodeset::NodeSet;
use crate::graph::token::Token;

/// A labelled governor → dependent edge.
///
/// `extra` marks secondary edges (coordination sharing, control) that sit on
/// top of the basic tree. They never take part in rooting or subtree
/// traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEdge {
    pub governor: usize,
    pub dependent: usize,
    pub relation: String,
    #[serde(default)]
    pub extra: bool,
}

impl DepEdge {
    pub fn new(governor: usize, dependent: usize, relation: &str) -> Self {
        Self {
            governor,
            dependent,
            relation: relation.to_string(),
            extra: false,
        }
    }

    pub fn secondary(governor: usize, dependent: usize, relation: &str) -> Self {
        Self {
            extra: true,
            ..Self::new(governor, dependent, relation)
        }
    }

    /// Label with any `:subtype` suffix stripped
    pub fn base_relation(&self) -> &str {
        base_relation(&self.relation)
    }
}

pub fn base_relation(relation: &str) -> &str {
    relation.split(':').next().unwrap_or(relation)
}

/// Parser output that violates the graph invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedGraph {
    #[error("sentence has no tokens")]
    Empty,
    #[error("token at position {position} carries index {index}")]
    TokenIndex { position: usize, index: usize },
    #[error("edge {governor} -> {dependent} ({relation}) references a token outside 0..{len}")]
    OutOfRange {
        governor: usize,
        dependent: usize,
        relation: String,
        len: usize,
    },
    #[error("edge {relation} on token {token} points to itself")]
    SelfLoop { token: usize, relation: String },
    #[error("token {token} has two governors: {first} and {second}")]
    MultipleGovernors {
        token: usize,
        first: usize,
        second: usize,
    },
    #[error("every token has a governor, so the tree edges contain a cycle")]
    NoRoot,
    #[error("sentence has {} roots: {roots:?}", roots.len())]
    MultipleRoots { roots: Vec<usize> },
    #[error("tokens {nodes:?} cannot reach root {root} through tree edges")]
    Unreachable { root: usize, nodes: Vec<usize> },
    #[error("{what} annotation covers {found} tokens, sentence has {expected}")]
    AnnotationLength {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("operator scope references token {index} outside 0..{len}")]
    OperatorOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    tokens: Vec<Token>,
    edges: Vec<DepEdge>,
    root: usize,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    secondary_in: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Validate parser output and index it for traversal
    pub fn new(tokens: Vec<Token>, edges: Vec<DepEdge>) -> Result<Self, MalformedGraph> {
        let len = tokens.len();
        if len == 0 {
            return Err(MalformedGraph::Empty);
        }
        for (position, token) in tokens.iter().enumerate() {
            if token.index != position {
                return Err(MalformedGraph::TokenIndex {
                    position,
                    index: token.index,
                });
            }
        }

        let mut parent: Vec<Option<usize>> = vec![None; len];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
        let mut secondary_in: Vec<Vec<usize>> = vec![Vec::new(); len];

        for (edge_idx, edge) in edges.iter().enumerate() {
            if edge.governor >= len || edge.dependent >= len {
                return Err(MalformedGraph::OutOfRange {
                    governor: edge.governor,
                    dependent: edge.dependent,
                    relation: edge.relation.clone(),
                    len,
                });
            }
            if edge.governor == edge.dependent {
                return Err(MalformedGraph::SelfLoop {
                    token: edge.dependent,
                    relation: edge.relation.clone(),
                });
            }
            if edge.extra {
                secondary_in[edge.dependent].push(edge_idx);
                continue;
            }
            if let Some(existing) = parent[edge.dependent] {
                return Err(MalformedGraph::MultipleGovernors {
                    token: edge.dependent,
                    first: edges[existing].governor,
                    second: edge.governor,
                });
            }
            parent[edge.dependent] = Some(edge_idx);
            children[edge.governor].push(edge_idx);
        }

        for kids in children.iter_mut() {
            kids.sort_by_key(|e| edges[*e].dependent);
        }

        let roots: Vec<usize> = (0..len).filter(|i| parent[*i].is_none()).collect();
        let root = match roots.as_slice() {
            [] => return Err(MalformedGraph::NoRoot),
            [root] => *root,
            _ => return Err(MalformedGraph::MultipleRoots { roots }),
        };

        let graph = Self {
            tokens,
            edges,
            root,
            parent,
            children,
            secondary_in,
        };

        let reachable = graph.subtree(root);
        if reachable.len() != len {
            let nodes = NodeSet::full(len).difference(&reachable).to_vec();
            return Err(MalformedGraph::Unreachable { root, nodes });
        }

        debug!(
            tokens = len,
            edges = graph.edges.len(),
            root,
            "dependency graph constructed"
        );
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    pub fn edges(&self) -> &[DepEdge] {
        &self.edges
    }

    /// Tree edge into `node`, `None` for the root
    pub fn parent_edge(&self, node: usize) -> Option<&DepEdge> {
        self.parent[node].map(|e| &self.edges[e])
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent_edge(node).map(|e| e.governor)
    }

    /// Incoming tree relation label
    pub fn relation(&self, node: usize) -> Option<&str> {
        self.parent_edge(node).map(|e| e.relation.as_str())
    }

    /// Outgoing tree edges in dependent order
    pub fn children(&self, node: usize) -> impl Iterator<Item = &DepEdge> + '_ {
        self.children[node].iter().map(move |e| &self.edges[*e])
    }

    /// Dependents of `node` whose relation (or base relation) is one of `labels`
    pub fn children_labeled<'a>(
        &'a self,
        node: usize,
        labels: &'a [&'a str],
    ) -> impl Iterator<Item = usize> + 'a {
        self.children(node)
            .filter(move |e| labels.contains(&e.relation.as_str()) || labels.contains(&e.base_relation()))
            .map(|e| e.dependent)
    }

    /// Governors reached through secondary edges
    pub fn secondary_governors(&self, node: usize) -> impl Iterator<Item = &DepEdge> + '_ {
        self.secondary_in[node].iter().map(move |e| &self.edges[*e])
    }

    /// All tokens dominated by `node` through tree edges, `node` included
    pub fn subtree(&self, node: usize) -> NodeSet {
        self.subtree_within(node, &NodeSet::full(self.len()))
    }

    /// Tokens dominated by `node` whose whole path from `node` lies in `allowed`
    pub fn subtree_within(&self, node: usize, allowed: &NodeSet) -> NodeSet {
        let mut visited = NodeSet::empty(self.len());
        if !allowed.contains(node) {
            return visited;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            for edge in self.children(current) {
                if allowed.contains(edge.dependent) && !visited.contains(edge.dependent) {
                    stack.push(edge.dependent);
                }
            }
        }
        visited
    }

    /// Every member of `nodes` reaches `top` through tree edges inside `nodes`
    pub fn is_connected_under(&self, top: usize, nodes: &NodeSet) -> bool {
        self.subtree_within(top, nodes) == *nodes
    }

    /// Whitespace-joined words of `nodes` in sentence order
    pub fn render(&self, nodes: impl IntoIterator<Item = usize>) -> String {
        let mut indices: Vec<usize> = nodes.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        indices
            .iter()
            .map(|i| self.tokens[*i].word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Surface text of the whole sentence
    pub fn text(&self) -> String {
        self.render(0..self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(i, w, w, "X"))
            .collect()
    }

    // some blue cats have tails
    fn cats() -> DependencyGraph {
        DependencyGraph::new(
            tokens(&["some", "blue", "cats", "have", "tails"]),
            vec![
                DepEdge::new(2, 0, "det"),
                DepEdge::new(2, 1, "amod"),
                DepEdge::new(3, 2, "nsubj"),
                DepEdge::new(3, 4, "obj"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_traversal() {
        let g = cats();
        assert_eq!(g.root(), 3);
        assert_eq!(g.parent(2), Some(3));
        assert_eq!(g.relation(0), Some("det"));
        assert_eq!(g.relation(3), None);
        let kids: Vec<usize> = g.children(3).map(|e| e.dependent).collect();
        assert_eq!(kids, vec![2, 4]);
        assert_eq!(g.subtree(2).to_vec(), vec![0, 1, 2]);
        assert_eq!(g.text(), "some blue cats have tails");
    }

    #[test]
    fn test_subtree_within_stops_at_removed_nodes() {
        let g = cats();
        let mut allowed = NodeSet::full(5);
        allowed.remove(2);
        assert_eq!(g.subtree_within(3, &allowed).to_vec(), vec![3, 4]);
        assert!(!g.is_connected_under(3, &allowed));
    }

    #[test]
    fn test_rejects_multiple_roots() {
        let err = DependencyGraph::new(
            tokens(&["a", "b", "c"]),
            vec![DepEdge::new(1, 0, "det")],
        )
        .unwrap_err();
        assert_eq!(err, MalformedGraph::MultipleRoots { roots: vec![1, 2] });
    }

    #[test]
    fn test_rejects_cycle() {
        let err = DependencyGraph::new(
            tokens(&["a", "b", "c"]),
            vec![DepEdge::new(1, 2, "dep"), DepEdge::new(2, 1, "dep")],
        )
        .unwrap_err();
        assert_eq!(err, MalformedGraph::Unreachable { root: 0, nodes: vec![1, 2] });

        let err = DependencyGraph::new(
            tokens(&["a", "b"]),
            vec![DepEdge::new(0, 1, "dep"), DepEdge::new(1, 0, "dep")],
        )
        .unwrap_err();
        assert_eq!(err, MalformedGraph::NoRoot);
    }

    #[test]
    fn test_rejects_bad_edges() {
        assert_eq!(DependencyGraph::new(vec![], vec![]).unwrap_err(), MalformedGraph::Empty);
        assert!(matches!(
            DependencyGraph::new(tokens(&["a"]), vec![DepEdge::new(0, 3, "dep")]),
            Err(MalformedGraph::OutOfRange { .. })
        ));
        assert!(matches!(
            DependencyGraph::new(tokens(&["a"]), vec![DepEdge::new(0, 0, "dep")]),
            Err(MalformedGraph::SelfLoop { .. })
        ));
        assert!(matches!(
            DependencyGraph::new(
                tokens(&["a", "b", "c"]),
                vec![DepEdge::new(0, 2, "dep"), DepEdge::new(1, 2, "dep"), DepEdge::new(0, 1, "dep")]
            ),
            Err(MalformedGraph::MultipleGovernors { token: 2, .. })
        ));
    }

    #[test]
    fn test_secondary_edges_do_not_break_rooting() {
        // cats and dogs have tails, with "dogs" also a secondary subject of "have"
        let g = DependencyGraph::new(
            tokens(&["cats", "and", "dogs", "have", "tails"]),
            vec![
                DepEdge::new(3, 0, "nsubj"),
                DepEdge::new(2, 1, "cc"),
                DepEdge::new(0, 2, "conj"),
                DepEdge::new(3, 4, "obj"),
                DepEdge::secondary(3, 2, "nsubj"),
                DepEdge::secondary(2, 0, "dep"),
            ],
        )
        .unwrap();
        assert_eq!(g.root(), 3);
        assert_eq!(g.secondary_governors(2).count(), 1);
        assert_eq!(g.subtree(0).to_vec(), vec![0, 1, 2]);
    }
}
