//! Sentence → entailed fragments → triples
//!
//! Shared resources (operator table, deletion and rule weights, compiled
//! patterns) are built once and borrowed by every worker.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::graph::{DependencyGraph, MalformedGraph, ParsedSentence};
use crate::polarity::{PolarityAnnotation, PolarityTable};
use crate::search::{
    DeletionWeights, EntailmentSearch, SearchBudget, SearchBudgetExceeded, SearchDirection,
    SearchOutcome,
};
use crate::segment::{RuleWeights, Segmenter};
use crate::triples::{RelationTriple, TripleAssembler};

/// Immutable tables shared across sentences and threads
#[derive(Debug, Clone)]
pub struct Resources {
    pub polarity: PolarityTable,
    pub deletion_weights: DeletionWeights,
    pub rule_weights: RuleWeights,
    pub segmenter: Segmenter,
}

impl Resources {
    pub fn standard() -> Result<Self> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let deletion_weights = DeletionWeights::standard()
            .with_overrides(&config.deletion_weights)
            .context("Invalid [deletion_weights]")?;
        config
            .rule_weights
            .validate()
            .context("Invalid [rule_weights]")?;
        let segmenter = Segmenter::new().context("Failed to compile span patterns")?;
        Ok(Self {
            polarity: PolarityTable::standard(),
            deletion_weights,
            rule_weights: config.rule_weights.clone(),
            segmenter,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionParams {
    pub budget: SearchBudget,
    pub direction: SearchDirection,
    pub min_confidence: Option<f64>,
}

impl ExtractionParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            budget: config.search.budget(),
            direction: config.search.direction,
            min_confidence: config.output.min_confidence,
        }
    }
}

/// An entailed fragment as surface text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFragment {
    pub text: String,
    pub weight: f64,
    /// Relation labels of the deleted subtrees, in deletion order
    pub deletions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SentenceExtraction {
    pub sentence_id: String,
    pub triples: Vec<RelationTriple>,
    pub fragments: Vec<RenderedFragment>,
    pub budget_exceeded: Option<SearchBudgetExceeded>,
    pub cancelled: bool,
}

/// Totals over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub sentences: usize,
    pub malformed: usize,
    pub triples: usize,
    pub over_budget: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[(String, Result<SentenceExtraction, MalformedGraph>)]) -> Self {
        let mut summary = Self {
            sentences: results.len(),
            ..Self::default()
        };
        for (_, result) in results {
            match result {
                Ok(extraction) => {
                    summary.triples += extraction.triples.len();
                    if extraction.budget_exceeded.is_some() {
                        summary.over_budget += 1;
                    }
                }
                Err(_) => summary.malformed += 1,
            }
        }
        summary
    }
}

/// Polarity from whichever source the sentence carries: precomputed values,
/// declared operator scopes, or inference from the graph
pub fn annotate(
    sentence: &ParsedSentence,
    graph: &DependencyGraph,
    table: &PolarityTable,
) -> Result<PolarityAnnotation, MalformedGraph> {
    if let Some(polarity) = &sentence.polarity {
        return table.annotate_precomputed(graph, polarity);
    }
    if !sentence.operators.is_empty() {
        return table.annotate_scopes(graph, &sentence.operators);
    }
    Ok(table.annotate(graph))
}

pub struct Extractor<'r> {
    resources: &'r Resources,
    params: ExtractionParams,
}

impl<'r> Extractor<'r> {
    pub fn new(resources: &'r Resources, params: ExtractionParams) -> Self {
        Self { resources, params }
    }

    pub fn params(&self) -> &ExtractionParams {
        &self.params
    }

    /// Run the entailment search on an already validated graph
    pub fn entailed_fragments<F>(
        &self,
        graph: &DependencyGraph,
        polarity: &PolarityAnnotation,
        keep_going: F,
    ) -> SearchOutcome
    where
        F: FnMut(usize) -> bool,
    {
        EntailmentSearch::new(graph, polarity, &self.resources.deletion_weights)
            .with_budget(self.params.budget.clone())
            .with_direction(self.params.direction)
            .run_while(keep_going)
    }

    /// Triples read off every fragment of a finished search
    pub fn triples(&self, graph: &DependencyGraph, outcome: &SearchOutcome) -> Vec<RelationTriple> {
        let candidates: Vec<_> = outcome
            .fragments
            .iter()
            .flat_map(|fragment| self.resources.segmenter.segment(graph, fragment))
            .collect();
        TripleAssembler::new(self.resources.rule_weights.clone())
            .with_min_confidence(self.params.min_confidence)
            .assemble(graph, &candidates)
    }

    pub fn extract(&self, sentence: &ParsedSentence) -> Result<SentenceExtraction, MalformedGraph> {
        self.extract_while(sentence, |_| true)
    }

    /// Extract with a continuation predicate checked between search expansions
    pub fn extract_while<F>(
        &self,
        sentence: &ParsedSentence,
        keep_going: F,
    ) -> Result<SentenceExtraction, MalformedGraph>
    where
        F: FnMut(usize) -> bool,
    {
        let sentence_id = sentence.sentence_id();
        let graph = sentence.to_graph()?;
        let polarity = annotate(sentence, &graph, &self.resources.polarity)?;

        let outcome = self.entailed_fragments(&graph, &polarity, keep_going);
        let triples = self.triples(&graph, &outcome);

        let fragments = outcome
            .fragments
            .iter()
            .map(|f| RenderedFragment {
                text: f.render(&graph),
                weight: f.weight(),
                deletions: f.provenance().iter().map(|d| d.relation.clone()).collect(),
            })
            .collect();

        debug!(
            sentence_id = %sentence_id,
            tokens = graph.len(),
            fragments = outcome.fragments.len(),
            triples = triples.len(),
            "sentence extracted"
        );

        Ok(SentenceExtraction {
            sentence_id,
            triples,
            fragments,
            budget_exceeded: outcome.budget_exceeded,
            cancelled: outcome.cancelled,
        })
    }

    /// Extract every sentence in parallel, keeping input order. A malformed
    /// sentence is reported in its slot and the rest of the batch continues.
    pub fn extract_batch(
        &self,
        sentences: &[ParsedSentence],
    ) -> Vec<(String, Result<SentenceExtraction, MalformedGraph>)> {
        self.extract_batch_with(sentences, |_| {})
    }

    /// `extract_batch` calling `on_sentence` with each sentence id as soon as
    /// that sentence is done, from whichever worker finished it
    pub fn extract_batch_with<P>(
        &self,
        sentences: &[ParsedSentence],
        on_sentence: P,
    ) -> Vec<(String, Result<SentenceExtraction, MalformedGraph>)>
    where
        P: Fn(&str) + Sync,
    {
        let results: Vec<_> = sentences
            .par_iter()
            .map(|sentence| {
                let id = sentence.sentence_id();
                let result = self.extract(sentence);
                on_sentence(&id);
                (id, result)
            })
            .collect();

        for (id, result) in &results {
            if let Err(e) = result {
                warn!(sentence_id = %id, "malformed sentence: {}", e);
            }
        }
        let summary = BatchSummary::from_results(&results);
        info!(
            sentences = summary.sentences,
            malformed = summary.malformed,
            over_budget = summary.over_budget,
            triples = summary.triples,
            "batch extracted"
        );
        results
    }
}
