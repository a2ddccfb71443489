//! Clause segmentation
//!
//! Pipeline:
//! 1. clauses: split a fragment at coordination, adverbial, paratactic and
//!    relative clause boundaries
//! 2. arguments: subject and object spans, with coordination expanded
//! 3. patterns: ordered rules (copula + of, copula, verb + object,
//!    verb + preposition) plus appositives
//! 4. dates: numeric and calendar spans rejected as prepositional objects

pub mod arguments;
pub mod candidate;
pub mod clauses;
pub mod dates;
pub mod patterns;
pub mod rules;

pub use candidate::*;
pub use clauses::*;
pub use dates::*;
pub use patterns::*;
pub use rules::*;
