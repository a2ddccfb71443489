//! Natural-logic open information extraction CLI
//!
//! Usage:
//!   openie extract --input corpus/ --with-confidence
//!   openie extract --input parsed.conllu --format jsonl --min-confidence 0.5
//!   openie entail --input parsed.jsonl --max-states 2000
//!   openie validate --input corpus/

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::path::PathBuf;

use openie::config::Config;
use openie::corpus::load_sentences;
use openie::extractor::annotate;
use openie::graph::{MalformedGraph, ParsedSentence};
use openie::polarity::PolarityTable;
use openie::triples::{write_fragments, write_triples, OutputFormat};
use openie::{ExtractionParams, Extractor, Resources, SentenceExtraction};

#[derive(Parser)]
#[command(name = "openie")]
#[command(about = "Extract subject-relation-object triples from parsed sentences")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract relation triples
    Extract {
        /// CoNLL-U / JSONL file or a directory of them
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        min_confidence: Option<f64>,
        #[arg(long)]
        max_states: Option<usize>,
        #[arg(long)]
        with_confidence: bool,
        #[arg(long)]
        format: Option<OutputFormat>,
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Print the entailed fragments of each sentence with their weights
    Entail {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        max_states: Option<usize>,
        #[arg(long)]
        format: Option<OutputFormat>,
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Report sentences whose parse cannot form a dependency graph
    Validate {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            config,
            min_confidence,
            max_states,
            with_confidence,
            format,
            threads,
        } => {
            let mut config = Config::load_or_default(config.as_ref())?;
            if let Some(min) = min_confidence {
                config.output.min_confidence = Some(min);
            }
            if let Some(states) = max_states {
                config.search.max_states = states;
            }
            if let Some(n) = threads {
                config.threads = Some(n);
            }
            config.validate()?;
            let format = format.unwrap_or(config.output.format);
            let with_confidence = with_confidence || config.output.with_confidence;

            let sentences = load_sentences(&input)?;
            tracing::info!("Loaded {} sentences from {:?}", sentences.len(), input);

            let results = run_batch(&config, &sentences)?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for (id, result) in &results {
                if let Ok(extraction) = result {
                    write_triples(&mut out, id, &extraction.triples, format, with_confidence)?;
                }
            }
            out.flush()?;
            report(&results);
        }
        Commands::Entail {
            input,
            config,
            max_states,
            format,
            threads,
        } => {
            let mut config = Config::load_or_default(config.as_ref())?;
            if let Some(states) = max_states {
                config.search.max_states = states;
            }
            if let Some(n) = threads {
                config.threads = Some(n);
            }
            config.validate()?;
            let format = format.unwrap_or(config.output.format);

            let sentences = load_sentences(&input)?;
            tracing::info!("Loaded {} sentences from {:?}", sentences.len(), input);

            let results = run_batch(&config, &sentences)?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for (id, result) in &results {
                if let Ok(extraction) = result {
                    let fragments: Vec<(String, f64)> = extraction
                        .fragments
                        .iter()
                        .map(|f| (f.text.clone(), f.weight))
                        .collect();
                    write_fragments(&mut out, id, &fragments, format)?;
                }
            }
            out.flush()?;
            report(&results);
        }
        Commands::Validate { input } => {
            let sentences = load_sentences(&input)?;
            let table = PolarityTable::standard();
            let mut malformed = 0;
            for sentence in &sentences {
                let checked = sentence
                    .to_graph()
                    .and_then(|graph| annotate(sentence, &graph, &table).map(|_| ()));
                if let Err(e) = checked {
                    malformed += 1;
                    println!("{}\t{}", sentence.sentence_id(), e);
                }
            }
            tracing::info!(
                "Validated {} sentences, {} malformed",
                sentences.len(),
                malformed
            );
            if malformed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

type BatchResult = Vec<(String, std::result::Result<SentenceExtraction, MalformedGraph>)>;

/// Extract every sentence on a dedicated pool, ticking a progress bar
fn run_batch(config: &Config, sentences: &[ParsedSentence]) -> Result<BatchResult> {
    let resources = Resources::from_config(config)?;
    let extractor = Extractor::new(&resources, ExtractionParams::from_config(config));

    let progress = ProgressBar::new(sentences.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} sentences")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let threads = config.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|v| v.get())
            .unwrap_or(4)
    });
    let pool = ThreadPoolBuilder::new().num_threads(threads.max(1)).build()?;

    let results = pool.install(|| extractor.extract_batch_with(sentences, |_| progress.inc(1)));
    progress.finish_and_clear();
    Ok(results)
}

fn report(results: &BatchResult) {
    for (id, result) in results {
        if let Ok(SentenceExtraction {
            budget_exceeded: Some(exceeded),
            ..
        }) = result
        {
            tracing::debug!("{}: {}", id, exceeded);
        }
    }
}
