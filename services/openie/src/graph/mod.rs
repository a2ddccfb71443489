//! Dependency graph model and front-end adapters
//!
//! The graph is validated once at construction; everything downstream reads
//! it immutably. Parser output arrives either as JSON (`ParsedSentence`) or
//! as CoNLL-U text.

pub mod token;
pub mod nodeset;
pub mod dependency_graph;
pub mod input;
pub mod conllu;

pub use token::*;
pub use nodeset::*;
pub use dependency_graph::*;
pub use input::*;
pub use conllu::*;
