//! CoNLL-U reader producing `ParsedSentence`s

use crate::graph::dependency_graph::DepEdge;
use crate::graph::input::{ParsedSentence, TokenRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConlluError {
    #[error("line {line}: expected 10 columns, found {found}")]
    Columns { line: usize, found: usize },
    #[error("line {line}: invalid {field} '{value}'")]
    Field {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: token id {id} out of sequence, expected {expected}")]
    Sequence { line: usize, id: usize, expected: usize },
}

#[derive(Default)]
struct Block {
    sentence: ParsedSentence,
    started: bool,
}

impl Block {
    fn finish(&mut self, out: &mut Vec<ParsedSentence>) {
        if self.started {
            out.push(std::mem::take(&mut self.sentence));
        }
        self.started = false;
    }
}

/// Parse every sentence block in `text`.
///
/// Multiword ranges (`3-4`) and empty nodes (`8.1`) are skipped. Enhanced
/// dependencies from the DEPS column become secondary edges when their
/// governor differs from the basic head.
pub fn parse_conllu(text: &str) -> Result<Vec<ParsedSentence>, ConlluError> {
    let mut out = Vec::new();
    let mut block = Block::default();

    for (offset, raw) in text.lines().enumerate() {
        let line_no = offset + 1;
        let line = raw.trim_end();

        if line.trim().is_empty() {
            block.finish(&mut out);
            continue;
        }

        if let Some(comment) = line.trim_start().strip_prefix('#') {
            if let Some((key, value)) = comment.split_once('=') {
                match key.trim() {
                    "sent_id" => block.sentence.id = Some(value.trim().to_string()),
                    "text" => block.sentence.text = Some(value.trim().to_string()),
                    _ => {}
                }
            }
            block.started = true;
            continue;
        }

        let columns: Vec<&str> = if line.contains('\t') {
            line.split('\t').collect()
        } else {
            line.split_whitespace().collect()
        };
        if columns.len() != 10 {
            return Err(ConlluError::Columns {
                line: line_no,
                found: columns.len(),
            });
        }

        let id_field = columns[0];
        if id_field.contains('-') || id_field.contains('.') {
            continue;
        }
        let id = parse_index(id_field, line_no, "id")?;
        let expected = block.sentence.tokens.len() + 1;
        if id != expected {
            return Err(ConlluError::Sequence {
                line: line_no,
                id,
                expected,
            });
        }

        let pos = if columns[3] != "_" { columns[3] } else { columns[4] };
        block.sentence.tokens.push(TokenRecord {
            word: columns[1].to_string(),
            lemma: columns[2].to_string(),
            pos: pos.to_string(),
        });
        block.started = true;

        let head = parse_index(columns[6], line_no, "head")?;
        let deprel = columns[7];
        if head > 0 {
            block
                .sentence
                .edges
                .push(DepEdge::new(head - 1, id - 1, deprel));
        }

        if columns[8] != "_" {
            for entry in columns[8].split('|') {
                let Some((gov, rel)) = entry.split_once(':') else {
                    return Err(ConlluError::Field {
                        line: line_no,
                        field: "deps",
                        value: entry.to_string(),
                    });
                };
                if gov.contains('.') {
                    continue;
                }
                let gov = parse_index(gov, line_no, "deps")?;
                if gov == 0 || gov == head {
                    continue;
                }
                block
                    .sentence
                    .edges
                    .push(DepEdge::secondary(gov - 1, id - 1, rel));
            }
        }
    }
    block.finish(&mut out);

    Ok(out)
}

fn parse_index(value: &str, line: usize, field: &'static str) -> Result<usize, ConlluError> {
    value.parse::<usize>().map_err(|_| ConlluError::Field {
        line,
        field,
        value: value.to_string(),
    })
}
