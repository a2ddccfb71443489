//! Open information extraction driven by natural-logic entailment.
//!
//! A parsed sentence flows through:
//! 1. graph: validated dependency graph
//! 2. polarity: per-token monotonicity from quantifiers, negation, modals
//! 3. search: shorter fragments entailed by the sentence
//! 4. segment: clauses and subject/relation/object spans per fragment
//! 5. triples: confidence scoring, deduplication, output

pub mod config;
pub mod corpus;
pub mod extractor;
pub mod graph;
pub mod polarity;
pub mod search;
pub mod segment;
pub mod triples;

pub use extractor::{ExtractionParams, Extractor, Resources, SentenceExtraction};
