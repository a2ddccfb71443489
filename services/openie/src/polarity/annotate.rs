//! Per-token polarity from operator scopes

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::graph::{DependencyGraph, MalformedGraph, NodeSet};
use crate::polarity::table::{Monotonicity, OperatorKind, OperatorSpec, PolarityTable};

const SUBJECT_RELATIONS: &[&str] = &["nsubj", "csubj", "expl", "nsubjpass", "csubjpass"];
const COMPLEMENT_RELATIONS: &[&str] = &["obj", "dobj", "xcomp", "ccomp"];

/// Caller-supplied operator scope, the raw alternative to precomputed polarity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorScope {
    pub operator: usize,
    #[serde(default)]
    pub first: Vec<usize>,
    #[serde(default)]
    pub second: Vec<usize>,
}

/// Operator whose removal is only truth-preserving together with its scope
#[derive(Debug, Clone, PartialEq)]
pub struct ProtectedOperator {
    pub operator: usize,
    pub scope: NodeSet,
}

/// Resolved scope of one operator occurrence
#[derive(Debug, Clone)]
struct ResolvedScope {
    operator: usize,
    tokens: Vec<usize>,
    spec: OperatorSpec,
    first: NodeSet,
    second: Option<NodeSet>,
}

/// Polarity of every token plus the operators that pin their scopes
#[derive(Debug, Clone)]
pub struct PolarityAnnotation {
    polarity: Vec<Monotonicity>,
    protected: Vec<ProtectedOperator>,
}

impl PolarityAnnotation {
    /// Every token upward, nothing protected
    pub fn upward(len: usize) -> Self {
        Self {
            polarity: vec![Monotonicity::Upward; len],
            protected: Vec::new(),
        }
    }

    pub fn polarity(&self, token: usize) -> Monotonicity {
        self.polarity[token]
    }

    pub fn polarities(&self) -> &[Monotonicity] {
        &self.polarity
    }

    pub fn protected(&self) -> &[ProtectedOperator] {
        &self.protected
    }

    /// Removing `removed` from `retained` would strand part of a protected
    /// operator's remaining scope
    pub fn blocks_deletion(&self, removed: &NodeSet, retained: &NodeSet) -> bool {
        self.protected.iter().any(|p| {
            removed.contains(p.operator) && !p.scope.intersection(retained).is_subset(removed)
        })
    }
}

impl PolarityTable {
    /// Infer operator scopes from the graph and compose token polarities
    pub fn annotate(&self, graph: &DependencyGraph) -> PolarityAnnotation {
        let scopes = self.infer_scopes(graph);
        build_annotation(graph.len(), &scopes)
    }

    /// Keep precomputed polarity, taking protected operators from the table
    pub fn annotate_precomputed(
        &self,
        graph: &DependencyGraph,
        polarity: &[Monotonicity],
    ) -> Result<PolarityAnnotation, MalformedGraph> {
        if polarity.len() != graph.len() {
            return Err(MalformedGraph::AnnotationLength {
                what: "polarity",
                expected: graph.len(),
                found: polarity.len(),
            });
        }
        let scopes = self.infer_scopes(graph);
        let mut annotation = build_annotation(graph.len(), &scopes);
        annotation.polarity = polarity.to_vec();
        Ok(annotation)
    }

    /// Use caller-declared scopes; operator signatures still come from the table
    pub fn annotate_scopes(
        &self,
        graph: &DependencyGraph,
        declared: &[OperatorScope],
    ) -> Result<PolarityAnnotation, MalformedGraph> {
        let len = graph.len();
        let mut scopes = Vec::with_capacity(declared.len());
        for scope in declared {
            let out_of_range = std::iter::once(&scope.operator)
                .chain(&scope.first)
                .chain(&scope.second)
                .find(|i| **i >= len);
            if let Some(index) = out_of_range {
                return Err(MalformedGraph::OperatorOutOfRange { index: *index, len });
            }
            let spec = self.signature(&graph.token(scope.operator).lemma_lower());
            scopes.push(ResolvedScope {
                operator: scope.operator,
                tokens: vec![scope.operator],
                spec,
                first: NodeSet::from_indices(len, scope.first.iter().copied()),
                second: if scope.second.is_empty() {
                    None
                } else {
                    Some(NodeSet::from_indices(len, scope.second.iter().copied()))
                },
            });
        }
        Ok(build_annotation(len, &scopes))
    }

    fn infer_scopes(&self, graph: &DependencyGraph) -> Vec<ResolvedScope> {
        let mut scopes = Vec::new();
        let mut consumed = NodeSet::empty(graph.len());

        // walk backwards so phrase matches claim their tokens before the single words
        for index in (0..graph.len()).rev() {
            if consumed.contains(index) {
                continue;
            }
            let Some(found) = self.match_at(graph.tokens(), index) else {
                continue;
            };
            let phrase = NodeSet::from_indices(graph.len(), found.tokens.iter().copied());
            let head = phrase_head(graph, &found.tokens, &phrase);
            if let Some(scope) = resolve(graph, head, &found.tokens, found.spec) {
                trace!(
                    operator = head,
                    kind = ?scope.spec.kind,
                    first = scope.first.len(),
                    "operator scope resolved"
                );
                consumed.union_with(&phrase);
                scopes.push(scope);
            }
        }
        scopes
    }
}

fn build_annotation(len: usize, scopes: &[ResolvedScope]) -> PolarityAnnotation {
    let mut polarity = vec![Monotonicity::Upward; len];
    let mut protected = Vec::new();

    for scope in scopes {
        for i in scope.first.iter() {
            polarity[i] = polarity[i].compose(scope.spec.first);
        }
        if let (Some(second), Some(m)) = (&scope.second, scope.spec.second) {
            for i in second.iter() {
                polarity[i] = polarity[i].compose(m);
            }
        }
        if scope.spec.is_protected() {
            let mut covered = scope.first.clone();
            if let Some(second) = &scope.second {
                covered.union_with(second);
            }
            for t in &scope.tokens {
                covered.insert(*t);
            }
            protected.push(ProtectedOperator {
                operator: scope.operator,
                scope: covered,
            });
        }
    }

    PolarityAnnotation {
        polarity,
        protected,
    }
}

/// The phrase token attached outside the phrase
fn phrase_head(graph: &DependencyGraph, tokens: &[usize], phrase: &NodeSet) -> usize {
    tokens
        .iter()
        .copied()
        .find(|t| graph.parent(*t).map_or(true, |p| !phrase.contains(p)))
        .unwrap_or(tokens[tokens.len() - 1])
}

fn resolve(
    graph: &DependencyGraph,
    head: usize,
    tokens: &[usize],
    spec: OperatorSpec,
) -> Option<ResolvedScope> {
    let len = graph.len();
    let base = graph.parent_edge(head).map(|e| e.base_relation().to_string());
    let base = base.as_deref().unwrap_or("root");
    let operator_nodes = graph.subtree(head);

    let (first, second) = match spec.kind {
        OperatorKind::Quantifier => {
            if !matches!(base, "det" | "nummod" | "advmod" | "amod" | "nsubj" | "obj" | "dobj") {
                return None;
            }
            let noun = if matches!(base, "nsubj" | "obj" | "dobj") {
                head
            } else {
                quantified_noun(graph, head)?
            };
            let mut restrictor = graph.subtree(noun).difference(&operator_nodes);
            restrictor.remove(head);
            (restrictor, clause_body(graph, noun))
        }
        OperatorKind::QuantifierPronoun => {
            let mut restrictor = graph.subtree(head);
            for t in tokens {
                restrictor.remove(*t);
            }
            (restrictor, clause_body(graph, head))
        }
        OperatorKind::Negation | OperatorKind::Modal => {
            if !matches!(base, "advmod" | "neg" | "aux") {
                return None;
            }
            let predicate = graph.parent(head)?;
            let mut scope = graph.subtree(predicate);
            for subject in graph.children_labeled(predicate, SUBJECT_RELATIONS) {
                scope = scope.difference(&graph.subtree(subject));
            }
            scope = scope.difference(&operator_nodes);
            (scope, None)
        }
        OperatorKind::Implicative => {
            if !graph.token(head).is_verb() {
                return None;
            }
            let mut scope = NodeSet::empty(len);
            for complement in graph.children_labeled(head, COMPLEMENT_RELATIONS) {
                scope.union_with(&graph.subtree(complement));
            }
            (scope, None)
        }
        OperatorKind::Preposition => {
            if !matches!(base, "case" | "mark") {
                return None;
            }
            let nominal = graph.parent(head)?;
            (graph.subtree(nominal).difference(&operator_nodes), None)
        }
        OperatorKind::Unrecognized => return None,
    };

    Some(ResolvedScope {
        operator: head,
        tokens: tokens.to_vec(),
        spec,
        first,
        second,
    })
}

/// Noun a determiner-like operator quantifies, looking through numerals
fn quantified_noun(graph: &DependencyGraph, operator: usize) -> Option<usize> {
    let governor = graph.parent(operator)?;
    if graph.token(governor).is_numeral() {
        if let Some(edge) = graph.parent_edge(governor) {
            if edge.base_relation() == "nummod" {
                return Some(edge.governor);
            }
        }
    }
    Some(governor)
}

/// Predicate material outside the subject when `noun` is a subject
fn clause_body(graph: &DependencyGraph, noun: usize) -> Option<NodeSet> {
    let edge = graph.parent_edge(noun)?;
    if !SUBJECT_RELATIONS.contains(&edge.base_relation()) {
        return None;
    }
    Some(graph.subtree(edge.governor).difference(&graph.subtree(noun)))
}
