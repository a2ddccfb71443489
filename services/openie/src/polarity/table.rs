//! Closed catalogue of natural-logic operators and their monotonicity

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::Token;

/// Monotonicity of a context, composed over every operator scoping a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Monotonicity {
    #[default]
    Upward,
    Downward,
    NonMonotone,
}

impl Monotonicity {
    /// Upward is the identity, Downward flips, NonMonotone absorbs
    pub fn compose(self, inner: Monotonicity) -> Monotonicity {
        use Monotonicity::*;
        match (self, inner) {
            (NonMonotone, _) | (_, NonMonotone) => NonMonotone,
            (Upward, m) | (m, Upward) => m,
            (Downward, Downward) => Upward,
        }
    }

    pub fn flip(self) -> Monotonicity {
        Monotonicity::Downward.compose(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Monotonicity::Upward => "up",
            Monotonicity::Downward => "down",
            Monotonicity::NonMonotone => "flat",
        }
    }
}

/// How an operator finds its arguments in the dependency graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Determiner-like quantifier over the noun it attaches to
    Quantifier,
    /// Quantified pronoun, the token is its own restrictor head
    QuantifierPronoun,
    /// Negation or downward adverb over its predicate
    Negation,
    Modal,
    /// Verb that is downward on its complements
    Implicative,
    /// Preposition downward on the nominal it marks
    Preposition,
    /// Supplied by the caller but absent from the table
    Unrecognized,
}

/// Monotonicity signature: restrictor (first) and body (second) arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSpec {
    pub kind: OperatorKind,
    pub first: Monotonicity,
    pub second: Option<Monotonicity>,
}

impl OperatorSpec {
    /// Signature used for operators the table does not know
    pub fn unrecognized() -> Self {
        Self {
            kind: OperatorKind::Unrecognized,
            first: Monotonicity::NonMonotone,
            second: Some(Monotonicity::NonMonotone),
        }
    }

    /// Removing the operator itself changes what the sentence entails
    pub fn is_protected(&self) -> bool {
        self.first != Monotonicity::Upward
            || self.second.map_or(false, |m| m != Monotonicity::Upward)
    }
}

use Monotonicity::{Downward as D, NonMonotone as N, Upward as U};
use OperatorKind::*;

const OPERATORS: &[(&str, OperatorKind, Monotonicity, Option<Monotonicity>)] = &[
    // existential and definite determiners
    ("some", Quantifier, U, Some(U)),
    ("a", Quantifier, U, Some(U)),
    ("an", Quantifier, U, Some(U)),
    ("the", Quantifier, U, Some(U)),
    ("several", Quantifier, U, Some(U)),
    ("at least", Quantifier, U, Some(U)),
    ("more than", Quantifier, U, Some(U)),
    // universals
    ("all", Quantifier, D, Some(U)),
    ("every", Quantifier, D, Some(U)),
    ("each", Quantifier, D, Some(U)),
    ("any", Quantifier, D, Some(U)),
    // proportional
    ("most", Quantifier, N, Some(U)),
    ("many", Quantifier, N, Some(U)),
    ("exactly", Quantifier, N, Some(N)),
    ("only", Quantifier, U, Some(D)),
    // negative
    ("no", Quantifier, D, Some(D)),
    ("neither", Quantifier, D, Some(D)),
    ("few", Quantifier, D, Some(D)),
    ("at most", Quantifier, D, Some(D)),
    ("fewer than", Quantifier, D, Some(D)),
    ("less than", Quantifier, D, Some(D)),
    // pronouns
    ("everyone", QuantifierPronoun, D, Some(U)),
    ("everybody", QuantifierPronoun, D, Some(U)),
    ("everything", QuantifierPronoun, D, Some(U)),
    ("anyone", QuantifierPronoun, D, Some(U)),
    ("anything", QuantifierPronoun, D, Some(U)),
    ("someone", QuantifierPronoun, U, Some(U)),
    ("somebody", QuantifierPronoun, U, Some(U)),
    ("something", QuantifierPronoun, U, Some(U)),
    ("nobody", QuantifierPronoun, D, Some(D)),
    ("nothing", QuantifierPronoun, D, Some(D)),
    ("no one", QuantifierPronoun, D, Some(D)),
    // negation and downward adverbs
    ("not", Negation, D, None),
    ("n't", Negation, D, None),
    ("never", Negation, D, None),
    ("hardly", Negation, D, None),
    ("rarely", Negation, D, None),
    ("seldom", Negation, D, None),
    ("barely", Negation, D, None),
    ("scarcely", Negation, D, None),
    // modals
    ("can", Modal, U, None),
    ("could", Modal, U, None),
    ("may", Modal, U, None),
    ("might", Modal, U, None),
    ("must", Modal, U, None),
    ("shall", Modal, U, None),
    ("should", Modal, U, None),
    ("will", Modal, U, None),
    ("would", Modal, U, None),
    // implicatives
    ("fail", Implicative, D, None),
    ("refuse", Implicative, D, None),
    ("deny", Implicative, D, None),
    ("doubt", Implicative, D, None),
    ("prevent", Implicative, D, None),
    ("forbid", Implicative, D, None),
    ("avoid", Implicative, D, None),
    // prepositions
    ("without", Preposition, D, None),
];

/// A table match: the signature and the sentence tokens forming the operator
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorMatch {
    pub spec: OperatorSpec,
    pub tokens: Vec<usize>,
}

/// Read-only operator lexicon, built once and shared by reference
#[derive(Debug, Clone)]
pub struct PolarityTable {
    single: HashMap<String, OperatorSpec>,
    phrases: Vec<(Vec<String>, OperatorSpec)>,
}

impl Default for PolarityTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PolarityTable {
    pub fn standard() -> Self {
        let mut single = HashMap::new();
        let mut phrases = Vec::new();
        for (phrase, kind, first, second) in OPERATORS {
            let spec = OperatorSpec {
                kind: *kind,
                first: *first,
                second: *second,
            };
            let words: Vec<String> = phrase.split_whitespace().map(str::to_string).collect();
            if words.len() == 1 {
                single.insert(words[0].clone(), spec);
            } else {
                phrases.push((words, spec));
            }
        }
        // longest phrases first so "no one" wins over "no"
        phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { single, phrases }
    }

    pub fn len(&self) -> usize {
        self.single.len() + self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact lookup of a single lemma or a space-separated phrase
    pub fn lookup(&self, lemma: &str) -> Option<&OperatorSpec> {
        let lower = lemma.to_lowercase();
        if let Some(spec) = self.single.get(&lower) {
            return Some(spec);
        }
        let words: Vec<&str> = lower.split_whitespace().collect();
        self.phrases
            .iter()
            .find(|(phrase, _)| phrase.iter().map(String::as_str).eq(words.iter().copied()))
            .map(|(_, spec)| spec)
    }

    /// Signature for a caller-declared operator, non-monotone when unknown
    pub fn signature(&self, lemma: &str) -> OperatorSpec {
        self.lookup(lemma).copied().unwrap_or_else(OperatorSpec::unrecognized)
    }

    /// Operator ending at `index`, preferring the longest phrase
    pub fn match_at(&self, tokens: &[Token], index: usize) -> Option<OperatorMatch> {
        for (phrase, spec) in &self.phrases {
            let k = phrase.len();
            if index + 1 < k {
                continue;
            }
            let start = index + 1 - k;
            let hit = phrase
                .iter()
                .enumerate()
                .all(|(j, w)| token_matches(&tokens[start + j], w));
            if hit {
                return Some(OperatorMatch {
                    spec: *spec,
                    tokens: (start..=index).collect(),
                });
            }
        }

        let token = &tokens[index];
        let spec = self
            .single
            .get(&token.lemma_lower())
            .or_else(|| self.single.get(&token.word.to_lowercase()))?;
        Some(OperatorMatch {
            spec: *spec,
            tokens: vec![index],
        })
    }
}

fn token_matches(token: &Token, word: &str) -> bool {
    token.lemma_lower() == word || token.word.to_lowercase() == word
}
