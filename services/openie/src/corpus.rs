//! Loading parsed sentences from files and directories

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::graph::{parse_conllu, ParsedSentence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Conllu,
    Json,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "conllu" | "conll" => Some(InputKind::Conllu),
            "json" | "jsonl" => Some(InputKind::Json),
            _ => None,
        }
    }
}

/// Input files under `path`: the file itself, or every recognised file in
/// the directory tree, sorted
pub fn input_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("Input {:?} does not exist", path);
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| InputKind::from_path(e.path()).is_some())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one file by extension; `.json` and `.jsonl` hold one sentence per line
pub fn read_sentences(path: &Path) -> Result<Vec<ParsedSentence>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input from {:?}", path))?;
    match InputKind::from_path(path) {
        Some(InputKind::Conllu) => {
            parse_conllu(&content).with_context(|| format!("Failed to parse CoNLL-U in {:?}", path))
        }
        Some(InputKind::Json) => {
            let mut sentences = Vec::new();
            for (line_no, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let sentence = ParsedSentence::from_json(line).with_context(|| {
                    format!("Failed to parse sentence on line {} of {:?}", line_no + 1, path)
                })?;
                sentences.push(sentence);
            }
            Ok(sentences)
        }
        None => anyhow::bail!("Unrecognised input extension for {:?}", path),
    }
}

/// Every sentence under `path`, in file order
pub fn load_sentences(path: &Path) -> Result<Vec<ParsedSentence>> {
    let mut sentences = Vec::new();
    for file in input_files(path)? {
        let parsed = read_sentences(&file)?;
        tracing::debug!("Read {} sentences from {:?}", parsed.len(), file);
        sentences.extend(parsed);
    }
    Ok(sentences)
}
