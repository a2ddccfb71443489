//! Natural-logic entailment search
//!
//! Pipeline:
//! 1. weights: relation label → deletion weight (data, configurable)
//! 2. engine: best-first search over subtree deletions licensed by polarity
//! 3. fragment: the resulting entailed sentences with provenance

pub mod engine;
pub mod fragment;
pub mod weights;

pub use engine::*;
pub use fragment::*;
pub use weights::*;
