//! Output writing for extracted triples and fragments (TSV and JSONL)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

use crate::triples::assemble::RelationTriple;
use crate::triples::confidence::ConfidenceLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Jsonl,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "jsonl" | "json" => Ok(OutputFormat::Jsonl),
            other => Err(format!("unknown output format '{}', expected tsv or jsonl", other)),
        }
    }
}

#[derive(Debug, Serialize)]
struct TripleRecord<'a> {
    sentence_id: &'a str,
    subject: &'a str,
    relation: &'a str,
    object: &'a str,
    confidence: f64,
    level: ConfidenceLevel,
}

#[derive(Debug, Serialize)]
struct FragmentRecord<'a> {
    sentence_id: &'a str,
    text: &'a str,
    weight: f64,
}

/// Write one sentence's triples
pub fn write_triples<W: Write>(
    out: &mut W,
    sentence_id: &str,
    triples: &[RelationTriple],
    format: OutputFormat,
    with_confidence: bool,
) -> Result<()> {
    for triple in triples {
        match format {
            OutputFormat::Tsv => writeln!(out, "{}", triple.to_tsv(with_confidence))?,
            OutputFormat::Jsonl => {
                let record = TripleRecord {
                    sentence_id,
                    subject: &triple.subject,
                    relation: &triple.relation,
                    object: &triple.object,
                    confidence: triple.confidence,
                    level: triple.level(),
                };
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            }
        }
    }
    Ok(())
}

/// Write one sentence's entailed fragments as (surface text, weight)
pub fn write_fragments<W: Write>(
    out: &mut W,
    sentence_id: &str,
    fragments: &[(String, f64)],
    format: OutputFormat,
) -> Result<()> {
    for (text, weight) in fragments {
        match format {
            OutputFormat::Tsv => writeln!(out, "{:.3}\t{}", weight, text)?,
            OutputFormat::Jsonl => {
                let record = FragmentRecord {
                    sentence_id,
                    text,
                    weight: *weight,
                };
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            }
        }
    }
    Ok(())
}
