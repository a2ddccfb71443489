//! Natural-logic polarity
//!
//! A closed operator table (quantifiers, negation, modals, implicatives)
//! assigns monotonicity signatures; annotation resolves each operator's
//! scope in the dependency graph and composes a polarity for every token.

pub mod table;
pub mod annotate;

pub use table::*;
pub use annotate::*;
