//! Splitting a fragment into independent clauses

use tracing::trace;

use crate::graph::{DepEdge, DependencyGraph, NodeSet};
use crate::search::SentenceFragment;
use crate::segment::arguments::{
    argument_span, conjuncts, dependents, is_relative_pronoun, OBJECT_RELATIONS,
    SUBJECT_RELATIONS,
};

const RELATIVE_ADVERBS: &[&str] = &["where", "when", "why"];

/// Auxiliary-like material a coordinated nominal predicate may borrow
const COPULA_RELATIONS: &[&str] = &["cop", "aux", "auxpass"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Main,
    Coordinated,
    Adverbial,
    Paratactic,
    Relative,
}

impl ClauseKind {
    fn from_edge(edge: &DepEdge, on_head: bool) -> Option<Self> {
        match edge.relation.as_str() {
            "acl:relcl" | "rcmod" => return Some(ClauseKind::Relative),
            _ => {}
        }
        match edge.base_relation() {
            "conj" if on_head => Some(ClauseKind::Coordinated),
            "advcl" => Some(ClauseKind::Adverbial),
            "parataxis" => Some(ClauseKind::Paratactic),
            _ => None,
        }
    }

    fn inherits_subject(&self) -> bool {
        !matches!(self, ClauseKind::Main)
    }
}

/// One clause of a fragment.
///
/// `nodes` is the clause's own material: nested clauses, their markers and
/// conjunctions are excluded. Subjects and borrowed copulas may point at
/// tokens of an enclosing clause.
#[derive(Debug, Clone)]
pub struct Clause {
    pub head: usize,
    pub kind: ClauseKind,
    pub parent: Option<usize>,
    pub nodes: NodeSet,
    /// One span per coordinated subject
    pub subjects: Vec<Vec<usize>>,
    /// Copula and auxiliaries taken over from the enclosing clause
    pub borrowed: Vec<usize>,
    /// Relative pronoun → antecedent span
    pub substitutions: Vec<(usize, Vec<usize>)>,
}

impl Clause {
    /// Span of an argument, following relative pronoun substitutions
    pub fn span(&self, graph: &DependencyGraph, head: usize) -> Vec<usize> {
        match self.substitutions.iter().find(|(token, _)| *token == head) {
            Some((_, antecedent)) => antecedent.clone(),
            None => argument_span(graph, &self.nodes, head),
        }
    }

    /// Spans of `head` and each of its conjuncts
    pub fn conjunct_spans(&self, graph: &DependencyGraph, head: usize) -> Vec<Vec<usize>> {
        conjuncts(graph, &self.nodes, head)
            .into_iter()
            .map(|c| self.span(graph, c))
            .collect()
    }

    pub fn has_subject(&self) -> bool {
        !self.subjects.is_empty()
    }
}

/// Split `fragment` into its main clause and every nested clause.
///
/// Parents always precede their nested clauses in the returned order.
pub fn split_clauses(graph: &DependencyGraph, fragment: &SentenceFragment) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut visited = NodeSet::empty(graph.len());
    let root = graph.root();
    if !fragment.contains(root) {
        return clauses;
    }

    let mut pending = vec![(root, ClauseKind::Main, None)];
    while let Some((head, kind, parent)) = pending.pop() {
        if visited.contains(head) {
            continue;
        }
        let (nodes, nested) = collect_material(graph, fragment, head, kind, &mut visited);
        let index = clauses.len();
        let clause = resolve_clause(graph, &clauses, head, kind, parent, nodes);
        trace!(
            head,
            kind = ?kind,
            tokens = clause.nodes.len(),
            subjects = clause.subjects.len(),
            "clause split"
        );
        clauses.push(clause);

        // reversed so siblings pop in sentence order
        for (child, child_kind) in nested.into_iter().rev() {
            pending.push((child, child_kind, Some(index)));
        }
    }
    clauses
}

fn collect_material(
    graph: &DependencyGraph,
    fragment: &SentenceFragment,
    head: usize,
    kind: ClauseKind,
    visited: &mut NodeSet,
) -> (NodeSet, Vec<(usize, ClauseKind)>) {
    let mut nodes = NodeSet::empty(graph.len());
    let mut nested = Vec::new();
    let mut stack = vec![head];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        nodes.insert(current);
        for edge in fragment.children(graph, current) {
            let child = edge.dependent;
            if visited.contains(child) {
                continue;
            }
            if let Some(child_kind) = ClauseKind::from_edge(edge, current == head) {
                nested.push((child, child_kind));
                continue;
            }
            if current == head && kind != ClauseKind::Main && is_clause_marker(graph, edge, kind) {
                continue;
            }
            stack.push(child);
        }
    }
    (nodes, nested)
}

fn is_clause_marker(graph: &DependencyGraph, edge: &DepEdge, kind: ClauseKind) -> bool {
    match edge.base_relation() {
        "mark" | "cc" | "punct" => true,
        "advmod" => {
            kind == ClauseKind::Relative
                && RELATIVE_ADVERBS.contains(&graph.token(edge.dependent).lemma_lower().as_str())
        }
        _ => false,
    }
}

fn resolve_clause(
    graph: &DependencyGraph,
    clauses: &[Clause],
    head: usize,
    kind: ClauseKind,
    parent: Option<usize>,
    nodes: NodeSet,
) -> Clause {
    let mut clause = Clause {
        head,
        kind,
        parent,
        nodes,
        subjects: Vec::new(),
        borrowed: Vec::new(),
        substitutions: Vec::new(),
    };
    let enclosing = parent.and_then(|p| clauses.get(p));

    if kind == ClauseKind::Relative {
        if let (Some(antecedent), Some(outer)) = (graph.parent(head), enclosing) {
            let antecedent_span = argument_span(graph, &outer.nodes, antecedent);
            let mut labels = SUBJECT_RELATIONS.to_vec();
            labels.extend_from_slice(OBJECT_RELATIONS);
            for pronoun in dependents(graph, &clause.nodes, head, &labels) {
                if is_relative_pronoun(graph, pronoun) {
                    clause.substitutions.push((pronoun, antecedent_span.clone()));
                }
            }
            if dependents(graph, &clause.nodes, head, SUBJECT_RELATIONS).is_empty() {
                clause.subjects.push(antecedent_span);
            }
        }
    }

    if let Some(subject) = dependents(graph, &clause.nodes, head, SUBJECT_RELATIONS).first() {
        clause.subjects = clause.conjunct_spans(graph, *subject);
    } else if clause.subjects.is_empty() && kind.inherits_subject() {
        if let Some(outer) = enclosing {
            clause.subjects = outer.subjects.clone();
        }
    }

    if kind == ClauseKind::Coordinated && !graph.token(head).is_verb() {
        if let Some(outer) = enclosing {
            let own = dependents(graph, &clause.nodes, head, &["cop"]);
            if own.is_empty() {
                let mut borrowed = dependents(graph, &outer.nodes, outer.head, COPULA_RELATIONS);
                borrowed.extend(outer.borrowed.iter().copied());
                borrowed.sort_unstable();
                borrowed.dedup();
                clause.borrowed = borrowed;
            }
        }
    }

    clause
}
