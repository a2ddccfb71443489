//! Triple scoring and assembly
//!
//! Pipeline:
//! 1. confidence: fragment weight × rule weight
//! 2. assemble: render spans, deduplicate, threshold
//! 3. outputs: TSV / JSONL writers

pub mod assemble;
pub mod confidence;
pub mod outputs;

pub use assemble::*;
pub use confidence::*;
pub use outputs::*;
