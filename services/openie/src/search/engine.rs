//! Best-first search over subtree deletions
//!
//! States are retained token sets. A transition deletes one retained node
//! together with everything it still dominates. States are expanded largest
//! first, so by the time a state is popped every path into it has been seen
//! and its kept weight is final.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::graph::{DependencyGraph, NodeSet};
use crate::polarity::{Monotonicity, PolarityAnnotation};
use crate::search::fragment::{Deletion, SentenceFragment};
use crate::search::weights::DeletionWeights;

/// Which polarity class licenses a deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDirection {
    /// Premise → shorter conclusions; deletes upward material
    #[default]
    Forward,
    /// Generalizations under downward operators
    Reverse,
}

impl SearchDirection {
    pub fn permits(&self, polarity: Monotonicity) -> bool {
        match self {
            SearchDirection::Forward => polarity == Monotonicity::Upward,
            SearchDirection::Reverse => polarity == Monotonicity::Downward,
        }
    }
}

/// Per-sentence search limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBudget {
    pub max_states: usize,
    pub max_tokens: usize,
    pub time_limit_ms: Option<u64>,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_states: 10_000,
            max_tokens: 100,
            time_limit_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLimit {
    States,
    Tokens,
    Time,
}

impl BudgetLimit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetLimit::States => "states",
            BudgetLimit::Tokens => "tokens",
            BudgetLimit::Time => "time",
        }
    }
}

/// The search stopped early; fragments found so far are still returned
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("search budget exceeded ({}) after {states} states", limit.as_str())]
pub struct SearchBudgetExceeded {
    pub limit: BudgetLimit,
    pub states: usize,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Initial sentence first, then every visited state in discovery order
    pub fragments: Vec<SentenceFragment>,
    pub budget_exceeded: Option<SearchBudgetExceeded>,
    pub cancelled: bool,
    pub expanded: usize,
}

impl SearchOutcome {
    pub fn is_complete(&self) -> bool {
        self.budget_exceeded.is_none() && !self.cancelled
    }
}

struct State {
    retained: NodeSet,
    weight: f64,
    parent: Option<usize>,
    deletion: Option<Deletion>,
}

pub struct EntailmentSearch<'a> {
    graph: &'a DependencyGraph,
    polarity: &'a PolarityAnnotation,
    weights: &'a DeletionWeights,
    budget: SearchBudget,
    direction: SearchDirection,
}

impl<'a> EntailmentSearch<'a> {
    pub fn new(
        graph: &'a DependencyGraph,
        polarity: &'a PolarityAnnotation,
        weights: &'a DeletionWeights,
    ) -> Self {
        Self {
            graph,
            polarity,
            weights,
            budget: SearchBudget::default(),
            direction: SearchDirection::default(),
        }
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_direction(mut self, direction: SearchDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn run(&self) -> SearchOutcome {
        self.run_while(|_| true)
    }

    /// Search until exhausted, over budget, or `keep_going(expanded)` is false
    pub fn run_while<F>(&self, mut keep_going: F) -> SearchOutcome
    where
        F: FnMut(usize) -> bool,
    {
        let len = self.graph.len();
        let started = Instant::now();
        let time_limit = self.budget.time_limit_ms.map(Duration::from_millis);

        if len > self.budget.max_tokens {
            let exceeded = SearchBudgetExceeded {
                limit: BudgetLimit::Tokens,
                states: 1,
            };
            warn!(tokens = len, max_tokens = self.budget.max_tokens, "{}", exceeded);
            return SearchOutcome {
                fragments: vec![SentenceFragment::full(self.graph)],
                budget_exceeded: Some(exceeded),
                cancelled: false,
                expanded: 0,
            };
        }

        let mut states = vec![State {
            retained: NodeSet::full(len),
            weight: 1.0,
            parent: None,
            deletion: None,
        }];
        let mut seen: HashMap<NodeSet, usize> = HashMap::new();
        seen.insert(states[0].retained.clone(), 0);

        let mut frontier = BinaryHeap::new();
        frontier.push((len, Reverse(0usize)));

        let mut expanded = 0;
        let mut cancelled = false;
        let mut exceeded: Option<BudgetLimit> = None;

        'search: while let Some((_, Reverse(id))) = frontier.pop() {
            if !keep_going(expanded) {
                cancelled = true;
                break;
            }
            if let Some(limit) = time_limit {
                if started.elapsed() >= limit {
                    exceeded = Some(BudgetLimit::Time);
                    break;
                }
            }
            expanded += 1;

            let retained = states[id].retained.clone();
            let weight = states[id].weight;

            for deletion in self.candidate_deletions(&retained) {
                let removed = NodeSet::from_indices(len, deletion.removed.iter().copied());
                let next = retained.difference(&removed);
                let next_weight = weight * deletion.weight;

                if let Some(&existing) = seen.get(&next) {
                    let state = &mut states[existing];
                    if next_weight > state.weight {
                        state.weight = next_weight;
                        state.parent = Some(id);
                        state.deletion = Some(deletion);
                    }
                    continue;
                }

                if states.len() >= self.budget.max_states {
                    exceeded = Some(BudgetLimit::States);
                    break 'search;
                }

                let next_id = states.len();
                seen.insert(next.clone(), next_id);
                frontier.push((next.len(), Reverse(next_id)));
                states.push(State {
                    retained: next,
                    weight: next_weight,
                    parent: Some(id),
                    deletion: Some(deletion),
                });
            }
        }

        let budget_exceeded = exceeded.map(|limit| {
            let exceeded = SearchBudgetExceeded {
                limit,
                states: states.len(),
            };
            warn!(
                tokens = len,
                expanded,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "{}",
                exceeded
            );
            exceeded
        });

        let fragments: Vec<SentenceFragment> = (0..states.len())
            .map(|id| {
                SentenceFragment::new(
                    states[id].retained.clone(),
                    provenance(&states, id),
                    states[id].weight,
                )
            })
            .collect();

        debug!(
            tokens = len,
            fragments = fragments.len(),
            expanded,
            cancelled,
            "entailment search finished"
        );

        SearchOutcome {
            fragments,
            budget_exceeded,
            cancelled,
            expanded,
        }
    }

    /// Every deletion licensed from `retained`
    pub fn candidate_deletions(&self, retained: &NodeSet) -> Vec<Deletion> {
        let mut out = Vec::new();
        for node in retained.iter() {
            let Some(edge) = self.graph.parent_edge(node) else {
                continue;
            };
            if !retained.contains(edge.governor) {
                continue;
            }
            let Some(weight) = self.weights.weight(&edge.relation) else {
                continue;
            };
            if !self.direction.permits(self.polarity.polarity(node)) {
                continue;
            }
            let removed = self.graph.subtree_within(node, retained);
            if self.polarity.blocks_deletion(&removed, retained) {
                continue;
            }
            out.push(Deletion {
                node,
                relation: edge.relation.clone(),
                removed: removed.to_vec(),
                weight,
            });
        }
        out
    }
}

fn provenance(states: &[State], id: usize) -> Vec<Deletion> {
    let mut trail = Vec::new();
    let mut current = Some(id);
    while let Some(i) = current {
        if let Some(deletion) = &states[i].deletion {
            trail.push(deletion.clone());
        }
        current = states[i].parent;
    }
    trail.reverse();
    trail
}
