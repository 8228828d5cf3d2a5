//! TasteFind CLI - hybrid recipe and culinary-news search.
//!
//! # Usage
//!
//! ```bash
//! # Build lexical and embedding artifacts from metadata/*.json
//! tf index
//! tf index food drinks --encoder hashing
//!
//! # Search a category
//! tf search "ayam bakar madu" -c food
//! tf search "harga cabai" -c berita -n 5 --json
//!
//! # Measure both rankers on one query
//! tf evaluate-query "soto" -c food --top-k 20
//! ```

mod config;
mod output;
mod search;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::EncoderKind;
use std::path::PathBuf;
use tastefind_core::corpus::Category;
use tastefind_core::evaluation::Ranker;
use tastefind_core::search::{SearchRequest, DEFAULT_MAX_FEATURES};
use tracing_subscriber::EnvFilter;

/// TasteFind hybrid search CLI.
///
/// Ranks recipes and news articles with TF-IDF and sentence embeddings,
/// filtered by a relevance cascade that knows about cooking methods.
#[derive(Parser)]
#[command(name = "tf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Artifacts directory (default: $TASTEFIND_ARTIFACTS or ./artifacts)
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,

    /// Ranking configuration TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Semantic encoder backend
    #[arg(long, global = true, value_enum, default_value = "bert")]
    encoder: EncoderKind,

    /// BERT model directory (default: $TASTEFIND_MODEL_DIR or ./models)
    #[arg(long, global = true)]
    models: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Search one category
    Search {
        /// Search query
        query: String,

        /// Category: food, drinks, healthy, news, all (or Indonesian names)
        #[arg(short, long, default_value = "all")]
        category: Category,

        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Evaluate each ranker on one query against content-derived ground truth
    EvaluateQuery {
        /// Query text
        query: String,

        /// Category to evaluate against
        #[arg(short, long, default_value = "all")]
        category: Category,

        /// Ranked-list length requested from each ranker
        #[arg(short = 'k', long, default_value = "20")]
        top_k: usize,

        /// Rankers to evaluate (lexical/tfidf, semantic/sbert)
        #[arg(short, long, value_delimiter = ',', default_value = "lexical,semantic")]
        rankers: Vec<Ranker>,
    },

    /// Build term-vector and embedding artifacts from metadata
    Index {
        /// Categories to index (default: every category with metadata)
        categories: Vec<Category>,

        /// Vocabulary size cap for the term-vector index
        #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
        max_features: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let artifacts = config::artifacts_dir(cli.artifacts.as_ref());
    let encoder = config::encoder_handle(cli.encoder, cli.models.as_ref());

    let rendered = match cli.command {
        Command::Search {
            query,
            category,
            limit,
        } => {
            let ranking = config::load_ranking_config(cli.config.as_ref())?;
            let request = SearchRequest::new(query, category, limit);
            let response = search::execute_search(&artifacts, &request, ranking, encoder)?;
            if cli.json {
                output::format_json(&response)
            } else {
                output::format_human(&response)
            }
        }
        Command::EvaluateQuery {
            query,
            category,
            top_k,
            rankers,
        } => {
            let ranking = config::load_ranking_config(cli.config.as_ref())?;
            let eval = search::execute_evaluate_query(
                &artifacts, category, &query, &rankers, top_k, ranking, encoder,
            )?;
            if cli.json {
                output::format_json(&eval)
            } else {
                output::format_evaluation_human(&eval)
            }
        }
        Command::Index {
            categories,
            max_features,
        } => {
            let written = search::execute_index(&artifacts, &categories, max_features, &encoder)?;
            if cli.json {
                output::format_json(&written)
            } else {
                output::format_index_human(&written)
            }
        }
    };

    println!("{}", rendered);
    Ok(())
}
