//! evalmark command-line interface.
//!
//! Evaluates answer sheets against model answers stored in a JSON file, and
//! exposes the scoring, keyword and feedback stages on their own.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use evalmark::feedback::feedback;
use evalmark::keywords::{extract_keywords_with, missing_keywords_with};
use evalmark::{
    EvaluationConfig, EvaluationInput, EvaluationResponse, Evaluator, FastEmbedder, InMemoryStore, SemanticScorer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "evalmark")]
#[command(about = "Grade answer sheets against model answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to a discovered evalmark.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one answer sheet
    Evaluate {
        /// Scanned answer sheet
        document: PathBuf,

        /// JSON file holding the model answers
        #[arg(short, long)]
        answers: PathBuf,

        /// Id of the model answer to grade against
        #[arg(long)]
        answer_id: i64,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Score a student text against a model text without OCR
    Score { student: String, model: String },

    /// List key terms of a model text, or those a student text misses
    Keywords {
        model: String,

        #[arg(short, long)]
        student: Option<String>,
    },

    /// Print the feedback sentence for a score
    Feedback { score: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evalmark=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Evaluate {
            document,
            answers,
            answer_id,
            format,
        } => evaluate(config, document, &answers, answer_id, format).await,
        Commands::Score { student, model } => score(config, student, model).await,
        Commands::Keywords { model, student } => {
            let keywords = match student {
                Some(student) => missing_keywords_with(&student, &model, &config.keywords),
                None => extract_keywords_with(&model, &config.keywords),
            };
            for keyword in keywords {
                println!("{}", keyword);
            }
            Ok(())
        }
        Commands::Feedback { score } => {
            println!("{}", feedback(score));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EvaluationConfig> {
    if let Some(path) = path {
        return EvaluationConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match EvaluationConfig::discover()? {
        Some(config) => Ok(config),
        None => {
            tracing::debug!("No evalmark.toml found, using defaults");
            Ok(EvaluationConfig::default())
        }
    }
}

async fn evaluate(
    config: EvaluationConfig,
    document: PathBuf,
    answers: &Path,
    answer_id: i64,
    format: OutputFormat,
) -> Result<()> {
    let store = InMemoryStore::from_json_file(answers)
        .with_context(|| format!("Failed to load model answers from {}", answers.display()))?;

    let evaluator = tokio::task::spawn_blocking(move || Evaluator::from_config(config)).await??;

    let input = EvaluationInput {
        document_path: document.to_string_lossy().into_owned(),
        model_answer_id: answer_id,
    };
    let outcome = evaluator.evaluate_input(&input, &store, &store).await?;
    let response = EvaluationResponse::from(&outcome);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => {
            println!("Score:    {:.2}", response.score);
            println!("Feedback: {}", response.feedback);
            println!("Engine:   {}", response.ocr_engine);
            println!("Language: {}", response.language);
            if response.missing_keywords.is_empty() {
                println!("Missing:  -");
            } else {
                println!("Missing:  {}", response.missing_keywords.join(", "));
            }
            println!();
            println!("{}", response.text);
        }
    }

    Ok(())
}

async fn score(config: EvaluationConfig, student: String, model: String) -> Result<()> {
    let value = tokio::task::spawn_blocking(move || -> evalmark::Result<f64> {
        let embedder = FastEmbedder::from_config(&config.embedding)?;
        SemanticScorer::new(Arc::new(embedder)).score(&student, &model)
    })
    .await??;

    println!("{:.2}\t{}", value, feedback(value));
    Ok(())
}
