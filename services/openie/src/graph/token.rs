//! Token type shared by every stage

use serde::{Deserialize, Serialize};

/// A parsed word: surface form, lemma and part-of-speech tag.
///
/// Tags may come from either the Universal (`VERB`, `NOUN`) or the Penn
/// Treebank (`VBZ`, `NNS`) tagset; the predicates below accept both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub word: String,
    pub lemma: String,
    pub pos: String,
}

impl Token {
    pub fn new(index: usize, word: &str, lemma: &str, pos: &str) -> Self {
        Self {
            index,
            word: word.to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
        }
    }

    /// Lowercased lemma, falling back to the word when the lemma is missing
    pub fn lemma_lower(&self) -> String {
        if self.lemma.is_empty() || self.lemma == "_" {
            self.word.to_lowercase()
        } else {
            self.lemma.to_lowercase()
        }
    }

    pub fn is_verb(&self) -> bool {
        self.pos == "VERB" || self.pos.starts_with("VB")
    }

    pub fn is_numeral(&self) -> bool {
        self.pos == "NUM" || self.pos == "CD"
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(
            self.pos.as_str(),
            "PUNCT" | "," | "." | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" | "NFP"
        ) || (!self.word.is_empty() && self.word.chars().all(|c| c.is_ascii_punctuation()))
    }
}
