//! Ordered clause rules producing candidate triples

use tracing::trace;

use crate::graph::{DependencyGraph, NodeSet};
use crate::search::SentenceFragment;
use crate::segment::arguments::{argument_span, dependents};
use crate::segment::candidate::CandidateTriple;
use crate::segment::clauses::{split_clauses, Clause};
use crate::segment::dates::DateFilter;
use crate::segment::rules::ClauseRule;

const AUXILIARY_RELATIONS: &[&str] = &["aux", "auxpass", "neg"];
const NEGATION_ADVERBS: &[&str] = &["not", "n't", "never"];
const PARTICLE_RELATIONS: &[&str] = &["compound:prt", "prt"];
const PREMODIFIER_RELATIONS: &[&str] = &["amod", "compound", "nummod"];
const PREP_ARGUMENT_RELATIONS: &[&str] = &["obl", "nmod"];
const NON_ARGUMENT_SUBTYPES: &[&str] = &["tmod", "npmod", "poss"];
const OBJECT_LABELS: &[&str] = &["obj", "dobj"];
const SUBJECT_LIKE: &[&str] = &["nsubj", "nsubjpass", "csubj", "csubjpass", "expl"];

/// A relation/object pair before it is paired with the clause subjects
struct Frame {
    relation: Vec<usize>,
    object: Vec<usize>,
}

/// Turns entailed fragments into candidate triples
#[derive(Debug, Clone)]
pub struct Segmenter {
    dates: DateFilter,
}

impl Segmenter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            dates: DateFilter::new()?,
        })
    }

    /// Candidate triples of every clause in `fragment`.
    ///
    /// Primary rules are tried in priority order and the first one that
    /// yields a well-formed triple claims the clause. A direct object does
    /// not claim the verb's prepositional arguments: those are still read
    /// off under their own rule. Appositives are read off independently.
    pub fn segment(&self, graph: &DependencyGraph, fragment: &SentenceFragment) -> Vec<CandidateTriple> {
        let mut out = Vec::new();
        for clause in split_clauses(graph, fragment) {
            if clause.has_subject() {
                let mut matched = None;
                for rule in ClauseRule::PRIMARY {
                    let candidates = self.candidates(rule, graph, &clause, fragment);
                    if !candidates.is_empty() {
                        trace!(head = clause.head, rule = %rule, count = candidates.len(), "clause matched");
                        out.extend(candidates);
                        matched = Some(rule);
                        break;
                    }
                }
                if matched == Some(ClauseRule::VerbObject) {
                    out.extend(self.candidates(ClauseRule::VerbPrepObject, graph, &clause, fragment));
                }
            }
            out.extend(
                appositives(graph, &clause, fragment.weight())
                    .into_iter()
                    .filter(|c| c.is_well_formed(graph)),
            );
        }
        out
    }

    /// Well-formed triples of one rule, one per subject and frame
    fn candidates(
        &self,
        rule: ClauseRule,
        graph: &DependencyGraph,
        clause: &Clause,
        fragment: &SentenceFragment,
    ) -> Vec<CandidateTriple> {
        let mut out = Vec::new();
        for frame in self.frames(rule, graph, clause) {
            for subject in &clause.subjects {
                let candidate = CandidateTriple::new(
                    subject.clone(),
                    frame.relation.clone(),
                    frame.object.clone(),
                    rule,
                    fragment.weight(),
                );
                if candidate.is_well_formed(graph) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    fn frames(&self, rule: ClauseRule, graph: &DependencyGraph, clause: &Clause) -> Vec<Frame> {
        match rule {
            ClauseRule::CopulaPrepObject => self.copula_prep_object(graph, clause),
            ClauseRule::Copula => copula(graph, clause),
            ClauseRule::VerbObject => verb_object(graph, clause),
            ClauseRule::VerbPrepObject => self.verb_prep_object(graph, clause),
            ClauseRule::Appositive => Vec::new(),
        }
    }

    fn copula_prep_object(&self, graph: &DependencyGraph, clause: &Clause) -> Vec<Frame> {
        if !has_copula(graph, clause) {
            return Vec::new();
        }
        let head = clause.head;
        let mut frames = Vec::new();
        for (nominal, case) in prepositional_arguments(graph, clause, head) {
            if !case.iter().any(|c| graph.token(*c).lemma_lower() == "of") {
                continue;
            }
            let mut relation = auxiliaries(graph, clause, head);
            relation.extend(dependents(graph, &clause.nodes, head, &["cop"]));
            relation.extend(premodifiers(graph, clause, head));
            relation.push(head);
            relation.extend(case.iter().copied());
            for object in self.prepositional_objects(graph, clause, nominal, &case) {
                frames.push(Frame {
                    relation: relation.clone(),
                    object,
                });
            }
        }
        frames
    }

    fn verb_prep_object(&self, graph: &DependencyGraph, clause: &Clause) -> Vec<Frame> {
        let head = clause.head;
        if !graph.token(head).is_verb() {
            return Vec::new();
        }
        let base_relation = verb_relation(graph, clause, head);
        let mut frames = Vec::new();

        for (nominal, case) in prepositional_arguments(graph, clause, head) {
            let mut relation = base_relation.clone();
            relation.extend(case.iter().copied());
            for object in self.prepositional_objects(graph, clause, nominal, &case) {
                frames.push(Frame {
                    relation: relation.clone(),
                    object,
                });
            }
        }
        frames
    }

    /// Conjunct spans of a prepositional argument, minus the case marker,
    /// skipping date-only spans
    fn prepositional_objects(
        &self,
        graph: &DependencyGraph,
        clause: &Clause,
        nominal: usize,
        case: &[usize],
    ) -> Vec<Vec<usize>> {
        clause
            .conjunct_spans(graph, nominal)
            .into_iter()
            .map(|span| span.into_iter().filter(|t| !case.contains(t)).collect::<Vec<_>>())
            .filter(|span| !self.dates.is_date_only(graph, span))
            .collect()
    }
}

fn copula(graph: &DependencyGraph, clause: &Clause) -> Vec<Frame> {
    if !has_copula(graph, clause) {
        return Vec::new();
    }
    let head = clause.head;
    let mut relation = auxiliaries(graph, clause, head);
    relation.extend(dependents(graph, &clause.nodes, head, &["cop"]));
    relation.extend(case_markers(graph, &clause.nodes, head));

    let mut excluded = NodeSet::from_indices(graph.len(), relation.iter().copied());
    for subject in dependents(graph, &clause.nodes, head, SUBJECT_LIKE) {
        excluded.union_with(&graph.subtree(subject));
    }
    for subject in &clause.subjects {
        for token in subject {
            excluded.insert(*token);
        }
    }
    let object: Vec<usize> = argument_span(graph, &clause.nodes, head)
        .into_iter()
        .filter(|t| !excluded.contains(*t))
        .collect();

    vec![Frame { relation, object }]
}

fn verb_object(graph: &DependencyGraph, clause: &Clause) -> Vec<Frame> {
    let head = clause.head;
    if !graph.token(head).is_verb() {
        return Vec::new();
    }
    let objects = dependents(graph, &clause.nodes, head, OBJECT_LABELS);
    if objects.is_empty() {
        return Vec::new();
    }
    let relation = verb_relation(graph, clause, head);
    objects
        .into_iter()
        .flat_map(|object| clause.conjunct_spans(graph, object))
        .map(|object| Frame {
            relation: relation.clone(),
            object,
        })
        .collect()
}

fn appositives(graph: &DependencyGraph, clause: &Clause, weight: f64) -> Vec<CandidateTriple> {
    let mut out = Vec::new();
    for node in clause.nodes.iter() {
        let Some(edge) = graph.parent_edge(node) else {
            continue;
        };
        if edge.base_relation() != "appos" || !clause.nodes.contains(edge.governor) {
            continue;
        }
        if graph.token(node).is_verb() {
            continue;
        }
        let subject = argument_span(graph, &clause.nodes, edge.governor);
        let object = argument_span(graph, &clause.nodes, node);
        out.push(
            CandidateTriple::new(subject, Vec::new(), object, ClauseRule::Appositive, weight)
                .implied("is"),
        );
    }
    out
}

/// Own copula, or one borrowed from the enclosing clause
fn has_copula(graph: &DependencyGraph, clause: &Clause) -> bool {
    !dependents(graph, &clause.nodes, clause.head, &["cop"]).is_empty()
        || clause
            .borrowed
            .iter()
            .any(|t| graph.parent_edge(*t).map_or(false, |e| e.base_relation() == "cop"))
}

/// Auxiliaries, negation and any borrowed copula, in no particular order
fn auxiliaries(graph: &DependencyGraph, clause: &Clause, head: usize) -> Vec<usize> {
    let mut tokens = dependents(graph, &clause.nodes, head, AUXILIARY_RELATIONS);
    tokens.extend(
        dependents(graph, &clause.nodes, head, &["advmod"])
            .into_iter()
            .filter(|t| NEGATION_ADVERBS.contains(&graph.token(*t).lemma_lower().as_str())),
    );
    tokens.extend(clause.borrowed.iter().copied());
    tokens
}

/// Auxiliaries + verb + particles + bare adverbs before the verb
fn verb_relation(graph: &DependencyGraph, clause: &Clause, head: usize) -> Vec<usize> {
    let mut relation = auxiliaries(graph, clause, head);
    relation.push(head);
    relation.extend(dependents(graph, &clause.nodes, head, PARTICLE_RELATIONS));
    for adverb in dependents(graph, &clause.nodes, head, &["advmod"]) {
        let bare = graph.children(adverb).all(|e| !clause.nodes.contains(e.dependent));
        if adverb < head && bare {
            relation.push(adverb);
        }
    }
    relation
}

/// Determiner-free modifiers in front of a nominal predicate
fn premodifiers(graph: &DependencyGraph, clause: &Clause, head: usize) -> Vec<usize> {
    let mut tokens = Vec::new();
    for modifier in dependents(graph, &clause.nodes, head, PREMODIFIER_RELATIONS) {
        if modifier < head {
            tokens.extend(
                graph
                    .subtree_within(modifier, &clause.nodes)
                    .iter()
                    .filter(|t| !graph.token(*t).is_punctuation()),
            );
        }
    }
    tokens
}

/// Case markers of `nominal`, with any fixed multiword continuation
fn case_markers(graph: &DependencyGraph, nodes: &NodeSet, nominal: usize) -> Vec<usize> {
    let mut tokens = Vec::new();
    for case in dependents(graph, nodes, nominal, &["case"]) {
        tokens.push(case);
        tokens.extend(dependents(graph, nodes, case, &["fixed", "mwe"]));
    }
    tokens.sort_unstable();
    tokens
}

/// Prepositional arguments of `head` with their case markers: UD obl / nmod
/// (minus temporal and possessive subtypes) carrying a case marker, and
/// basic-dependency prep -> pobj chains
fn prepositional_arguments(graph: &DependencyGraph, clause: &Clause, head: usize) -> Vec<(usize, Vec<usize>)> {
    let mut arguments: Vec<(usize, Vec<usize>)> = graph
        .children(head)
        .filter(|e| clause.nodes.contains(e.dependent))
        .filter(|e| PREP_ARGUMENT_RELATIONS.contains(&e.base_relation()))
        .filter(|e| {
            e.relation
                .split_once(':')
                .map_or(true, |(_, subtype)| !NON_ARGUMENT_SUBTYPES.contains(&subtype))
        })
        .map(|e| (e.dependent, case_markers(graph, &clause.nodes, e.dependent)))
        .filter(|(_, case)| !case.is_empty())
        .collect();

    for preposition in dependents(graph, &clause.nodes, head, &["prep"]) {
        if let Some(nominal) = dependents(graph, &clause.nodes, preposition, &["pobj", "pcomp"]).first() {
            arguments.push((*nominal, vec![preposition]));
        }
    }
    arguments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DepEdge, Token};

    fn graph(words: &[(&str, &str)], edges: &[(usize, usize, &str)]) -> DependencyGraph {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, (w, pos))| Token::new(i, w, &w.to_lowercase(), pos))
            .collect();
        let edges = edges.iter().map(|(g, d, r)| DepEdge::new(*g, *d, r)).collect();
        DependencyGraph::new(tokens, edges).unwrap()
    }

    fn texts(g: &DependencyGraph, candidates: &[CandidateTriple]) -> Vec<(String, String, String)> {
        candidates
            .iter()
            .map(|c| {
                let relation = match &c.implied_relation {
                    Some(implied) => implied.clone(),
                    None => g.render(c.relation.iter().copied()),
                };
                (g.render(c.subject.iter().copied()), relation, g.render(c.object.iter().copied()))
            })
            .collect()
    }

    fn triple(s: &str, r: &str, o: &str) -> (String, String, String) {
        (s.to_string(), r.to_string(), o.to_string())
    }

    #[test]
    fn test_verb_object() {
        // cats do not have tails
        let g = graph(
            &[("cats", "NNS"), ("do", "VBP"), ("not", "RB"), ("have", "VB"), ("tails", "NNS")],
            &[(3, 0, "nsubj"), (3, 1, "aux"), (3, 2, "advmod"), (3, 4, "obj")],
        );
        let segmenter = Segmenter::new().unwrap();
        let found = segmenter.segment(&g, &SentenceFragment::full(&g));
        assert_eq!(texts(&g, &found), vec![triple("cats", "do not have", "tails")]);
        assert_eq!(found[0].rule, ClauseRule::VerbObject);
        assert_eq!(found[0].fragment_weight, 1.0);
    }

    #[test]
    fn test_copula_with_of_modifier_wins_over_plain_copula() {
        // Obama is the president of the US
        let g = graph(
            &[("Obama", "NNP"), ("is", "VBZ"), ("the", "DT"), ("president", "NN"), ("of", "IN"), ("the", "DT"), ("US", "NNP")],
            &[(3, 0, "nsubj"), (3, 1, "cop"), (3, 2, "det"), (6, 4, "case"), (6, 5, "det"), (3, 6, "nmod")],
        );
        let segmenter = Segmenter::new().unwrap();
        let found = segmenter.segment(&g, &SentenceFragment::full(&g));
        assert_eq!(texts(&g, &found), vec![triple("Obama", "is president of", "the US")]);
        assert_eq!(found[0].rule, ClauseRule::CopulaPrepObject);
    }

    #[test]
    fn test_copula_with_basic_prep_pobj() {
        // Obama is the president of the US, basic dependencies
        let g = graph(
            &[("Obama", "NNP"), ("is", "VBZ"), ("the", "DT"), ("president", "NN"), ("of", "IN"), ("the", "DT"), ("US", "NNP")],
            &[(3, 0, "nsubj"), (3, 1, "cop"), (3, 2, "det"), (3, 4, "prep"), (4, 6, "pobj"), (6, 5, "det")],
        );
        let segmenter = Segmenter::new().unwrap();
        let found = segmenter.segment(&g, &SentenceFragment::full(&g));
        assert_eq!(texts(&g, &found), vec![triple("Obama", "is president of", "the US")]);
        assert_eq!(found[0].rule, ClauseRule::CopulaPrepObject);
    }

    #[test]
    fn test_direct_object_keeps_prepositional_arguments() {
        // He taught law at the University from 1992 to 2004
        let g = graph(
            &[
                ("He", "PRP"), ("taught", "VBD"), ("law", "NN"), ("at", "IN"), ("the", "DT"),
                ("University", "NNP"), ("from", "IN"), ("1992", "CD"), ("to", "TO"), ("2004", "CD"),
            ],
            &[
                (1, 0, "nsubj"), (1, 2, "obj"), (5, 3, "case"), (5, 4, "det"), (1, 5, "obl"),
                (7, 6, "case"), (1, 7, "obl"), (9, 8, "case"), (1, 9, "obl"),
            ],
        );
        let segmenter = Segmenter::new().unwrap();
        let found = segmenter.segment(&g, &SentenceFragment::full(&g));
        let mut extracted = texts(&g, &found);
        extracted.sort();
        assert_eq!(
            extracted,
            vec![triple("He", "taught", "law"), triple("He", "taught at", "the University")]
        );
        let prepositional = found.iter().find(|c| c.object == vec![4, 5]).unwrap();
        assert_eq!(prepositional.rule, ClauseRule::VerbPrepObject);
    }

    #[test]
    fn test_plain_copula() {
        // cats are very cute
        let g = graph(
            &[("cats", "NNS"), ("are", "VBP"), ("very", "RB"), ("cute", "JJ")],
            &[(3, 0, "nsubj"), (3, 1, "cop"), (3, 2, "advmod")],
        );
        let segmenter = Segmenter::new().unwrap();
        let found = segmenter.segment(&g, &SentenceFragment::full(&g));
        assert_eq!(texts(&g, &found), vec![triple("cats", "are", "very cute")]);
    }

    #[test]
    fn test_prepositional_arguments_skip_dates() {
        // Smith taught in Chicago until 2004
        let g = graph(
            &[("Smith", "NNP"), ("taught", "VBD"), ("in", "IN"), ("Chicago", "NNP"), ("until", "IN"), ("2004", "CD")],
            &[(1, 0, "nsubj"), (3, 2, "case"), (1, 3, "obl"), (5, 4, "case"), (1, 5, "obl")],
        );
        let segmenter = Segmenter::new().unwrap();
        let found = segmenter.segment(&g, &SentenceFragment::full(&g));
        assert_eq!(texts(&g, &found), vec![triple("Smith", "taught in", "Chicago")]);
        assert_eq!(found[0].rule, ClauseRule::VerbPrepObject);
    }

    #[test]
    fn test_coordinated_subjects_and_objects() {
        // cats and dogs eat fish and meat
        let g = graph(
            &[("cats", "NNS"), ("and", "CC"), ("dogs", "NNS"), ("eat", "VBP"), ("fish", "NN"), ("and", "CC"), ("meat", "NN")],
            &[(3, 0, "nsubj"), (2, 1, "cc"), (0, 2, "conj"), (3, 4, "obj"), (6, 5, "cc"), (4, 6, "conj")],
        );
        let segmenter = Segmenter::new().unwrap();
        let mut found = texts(&g, &segmenter.segment(&g, &SentenceFragment::full(&g)));
        found.sort();
        assert_eq!(
            found,
            vec![
                triple("cats", "eat", "fish"),
                triple("cats", "eat", "meat"),
                triple("dogs", "eat", "fish"),
                triple("dogs", "eat", "meat"),
            ]
        );
    }

    #[test]
    fn test_appositive_implies_copula() {
        // Obama , the president , spoke
        let g = graph(
            &[("Obama", "NNP"), (",", ","), ("the", "DT"), ("president", "NN"), (",", ","), ("spoke", "VBD")],
            &[(5, 0, "nsubj"), (3, 1, "punct"), (3, 2, "det"), (0, 3, "appos"), (3, 4, "punct")],
        );
        let segmenter = Segmenter::new().unwrap();
        let found = segmenter.segment(&g, &SentenceFragment::full(&g));
        assert_eq!(texts(&g, &found), vec![triple("Obama", "is", "the president")]);
        assert_eq!(found[0].rule, ClauseRule::Appositive);
        assert!(found[0].relation.is_empty());
    }

    #[test]
    fn test_noun_phrase_yields_nothing() {
        // the big dog
        let g = graph(
            &[("the", "DT"), ("big", "JJ"), ("dog", "NN")],
            &[(2, 0, "det"), (2, 1, "amod")],
        );
        let segmenter = Segmenter::new().unwrap();
        assert!(segmenter.segment(&g, &SentenceFragment::full(&g)).is_empty());
    }
}
