//! Parser output as consumed from the linguistic front end

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::graph::dependency_graph::{DepEdge, DependencyGraph, MalformedGraph};
use crate::graph::token::Token;
use crate::polarity::{Monotonicity, OperatorScope};

/// Token fields as delivered by a tagger/lemmatizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub word: String,
    #[serde(default)]
    pub lemma: String,
    #[serde(default)]
    pub pos: String,
}

/// One parsed sentence: tokens, 0-based edges and optional polarity input.
///
/// Polarity may be supplied directly (`polarity`), as raw operator scopes
/// (`operators`), or left out entirely to be inferred from the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSentence {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub tokens: Vec<TokenRecord>,
    pub edges: Vec<DepEdge>,
    #[serde(default)]
    pub polarity: Option<Vec<Monotonicity>>,
    #[serde(default)]
    pub operators: Vec<OperatorScope>,
}

impl ParsedSentence {
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Validate and build the dependency graph
    pub fn to_graph(&self) -> Result<DependencyGraph, MalformedGraph> {
        let tokens = self
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(i, &t.word, &t.lemma, &t.pos))
            .collect();
        DependencyGraph::new(tokens, self.edges.clone())
    }

    /// Supplied text, or the words joined by spaces
    pub fn surface_text(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self
                .tokens
                .iter()
                .map(|t| t.word.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Caller id, or a short SHA-256 of the surface text
    pub fn sentence_id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        let mut hasher = Sha256::new();
        hasher.update(self.surface_text().as_bytes());
        format!("{:x}", hasher.finalize())[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATS: &str = r#"{
        "tokens": [
            {"word": "some", "lemma": "some", "pos": "DT"},
            {"word": "cats", "lemma": "cat", "pos": "NNS"},
            {"word": "have", "lemma": "have", "pos": "VBP"},
            {"word": "tails", "lemma": "tail", "pos": "NNS"}
        ],
        "edges": [
            {"governor": 1, "dependent": 0, "relation": "det"},
            {"governor": 2, "dependent": 1, "relation": "nsubj"},
            {"governor": 2, "dependent": 3, "relation": "obj"}
        ]
    }"#;

    #[test]
    fn test_parse_json_and_build_graph() {
        let sentence = ParsedSentence::from_json(CATS).unwrap();
        assert!(sentence.polarity.is_none());
        assert!(sentence.operators.is_empty());

        let graph = sentence.to_graph().unwrap();
        assert_eq!(graph.root(), 2);
        assert_eq!(graph.token(1).lemma, "cat");
    }

    #[test]
    fn test_sentence_id_is_stable() {
        let sentence = ParsedSentence::from_json(CATS).unwrap();
        let id = sentence.sentence_id();
        assert_eq!(id.len(), 16);
        assert_eq!(id, sentence.clone().sentence_id());
        assert_eq!(sentence.surface_text(), "some cats have tails");

        let named = ParsedSentence {
            id: Some("s1".to_string()),
            ..sentence
        };
        assert_eq!(named.sentence_id(), "s1");
    }

    #[test]
    fn test_polarity_field_round_trips_names() {
        let sentence: ParsedSentence = serde_json::from_str(
            r#"{"tokens": [{"word": "cats"}], "edges": [], "polarity": ["downward"]}"#,
        )
        .unwrap();
        assert_eq!(sentence.polarity, Some(vec![Monotonicity::Downward]));
    }
}
