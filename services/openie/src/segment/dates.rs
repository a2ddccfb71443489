//! Numeric and calendar-only spans ("2004", "January 20 , 2009")

use regex::Regex;

use crate::graph::DependencyGraph;

/// Recognises argument spans made only of dates and numbers.
///
/// Prepositional objects like these ("taught to 2004") are almost always
/// temporal adjuncts misread as arguments.
#[derive(Debug, Clone)]
pub struct DateFilter {
    calendar: Regex,
    number: Regex,
}

impl DateFilter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            calendar: Regex::new(
                r"(?i)^(jan(uary)?|feb(ruary)?|mar(ch)?|apr(il)?|may|june?|july?|aug(ust)?|sep(t(ember)?)?|oct(ober)?|nov(ember)?|dec(ember)?|monday|tuesday|wednesday|thursday|friday|saturday|sunday|today|yesterday|tomorrow|ad|bc|bce|ce)\.?$",
            )?,
            number: Regex::new(r"(?i)^('?\d+(st|nd|rd|th|s)?|\d+([.,/:\-]\d+)+)$")?,
        })
    }

    /// Every non-punctuation token is a number, ordinal, month or weekday
    pub fn is_date_only(&self, graph: &DependencyGraph, span: &[usize]) -> bool {
        let mut anchored = false;
        for &index in span {
            let token = graph.token(index);
            if token.is_punctuation() {
                continue;
            }
            let word = token.word.as_str();
            if token.is_numeral() || self.number.is_match(word) || self.calendar.is_match(word) {
                anchored = true;
                continue;
            }
            if matches!(token.lemma_lower().as_str(), "the" | "of" | "early" | "late" | "mid") {
                continue;
            }
            return false;
        }
        anchored
    }
}
