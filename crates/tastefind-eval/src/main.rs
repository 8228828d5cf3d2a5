//! TasteFind Evaluation Tool
//!
//! Aggregate ranking-quality evaluation. For each category the most frequent
//! corpus tokens are used as synthetic queries, ground truth is derived from
//! document bodies, and the lexical and semantic rankers are each scored
//! with precision, recall, F1 and average precision.
//!
//! Reports are cached as `<cache-dir>/report-<slug>.json` and reused on the
//! next run unless `--force` is given.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate every category
//! cargo run -p tastefind-eval --release
//!
//! # One category, JSON output
//! cargo run -p tastefind-eval --release -- food --json
//!
//! # Recompute with the hashing encoder and a larger sample
//! cargo run -p tastefind-eval --release -- news --force --encoder hashing --sample-size 50
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tastefind_core::config::RankingConfig;
use tastefind_core::corpus::Category;
use tastefind_core::embedding::{EncoderHandle, HashingEncoder};
use tastefind_core::evaluation::{EvaluationEngine, EvaluationReport, ReportCache};
use tastefind_core::search::HybridSearchEngine;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable for the artifacts directory
const ARTIFACTS_DIR_ENV: &str = "TASTEFIND_ARTIFACTS";

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncoderKind {
    Bert,
    Hashing,
}

#[derive(Parser, Debug)]
#[command(name = "tastefind-eval")]
#[command(about = "Evaluate TasteFind ranking quality")]
struct Args {
    /// Categories to evaluate (default: all five)
    categories: Vec<Category>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Cache directory for evaluation reports
    #[arg(long, default_value = "target/eval-cache")]
    cache_dir: PathBuf,

    /// Ignore cached reports and recompute
    #[arg(long)]
    force: bool,

    /// Artifacts directory (default: $TASTEFIND_ARTIFACTS or ./artifacts)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Ranking configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Semantic encoder backend
    #[arg(long, value_enum, default_value = "bert")]
    encoder: EncoderKind,

    /// BERT model directory
    #[arg(long, default_value = "models")]
    models: PathBuf,

    /// Number of synthetic queries per category
    #[arg(long)]
    sample_size: Option<usize>,

    /// Ranked-list length evaluated per query
    #[arg(long)]
    top_k: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn artifacts_dir(&self) -> PathBuf {
        if let Some(dir) = &self.artifacts {
            return dir.clone();
        }
        match std::env::var(ARTIFACTS_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => PathBuf::from("artifacts"),
        }
    }

    fn ranking_config(&self) -> Result<RankingConfig> {
        let mut config = match &self.config {
            Some(path) => RankingConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => RankingConfig::default(),
        };
        if let Some(sample_size) = self.sample_size {
            config.evaluation.sample_size = sample_size;
        }
        if let Some(top_k) = self.top_k {
            config.evaluation.top_k = top_k;
        }
        Ok(config)
    }

    fn encoder(&self) -> EncoderHandle {
        match self.encoder {
            EncoderKind::Hashing => EncoderHandle::ready(Arc::new(HashingEncoder::default())),
            EncoderKind::Bert => EncoderHandle::bert(self.models.clone()),
        }
    }
}

// =============================================================================
// Report Cache
// =============================================================================

fn cache_path(cache_dir: &Path, category: Category) -> PathBuf {
    cache_dir.join(format!("report-{}.json", category.slug()))
}

/// Reads a cached report. Unreadable or stale files are ignored.
fn read_cached(path: &Path) -> Option<EvaluationReport> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Ignoring unreadable cache {}: {}", path.display(), e);
            None
        }
    }
}

fn write_cached(path: &Path, report: &EvaluationReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Cached report to {}", path.display());
    Ok(())
}

// =============================================================================
// Evaluation
// =============================================================================

fn compute_report(
    args: &Args,
    category: Category,
    encoder: &Arc<EncoderHandle>,
) -> Result<EvaluationReport> {
    let artifacts = args.artifacts_dir();
    let engine = HybridSearchEngine::load(
        args.ranking_config()?,
        Arc::clone(encoder),
        &artifacts,
        &[category],
    )
    .with_context(|| {
        format!(
            "Failed to load '{}' from {}",
            category,
            artifacts.display()
        )
    })?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(category.to_string());

    let report = EvaluationEngine::new(&engine).evaluate_with_progress(
        category,
        |done, total, _query| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        },
    )?;
    pb.finish_and_clear();

    info!("Evaluated {} queries for '{}'", report.query_count, category);
    Ok(report)
}

/// Returns the report for `category`, from cache when allowed.
fn report_for(
    args: &Args,
    category: Category,
    encoder: &Arc<EncoderHandle>,
) -> Result<Arc<EvaluationReport>> {
    let path = cache_path(&args.cache_dir, category);
    let cache = match (args.force, read_cached(&path)) {
        (false, Some(report)) => {
            eprintln!("Using cached report {}", path.display());
            ReportCache::with_report(report)
        }
        _ => ReportCache::new(),
    };

    let fresh = cache.get().is_none();
    let report = cache.get_or_compute(|| compute_report(args, category, encoder))?;
    if fresh {
        write_cached(&path, &report)?;
    }
    Ok(report)
}

fn print_report(report: &EvaluationReport) {
    println!("\n{}", "=".repeat(70));
    println!("TASTEFIND RANKING EVALUATION: {}", report.category);
    println!("{}", "=".repeat(70));
    println!(
        "\n{} sampled queries, top {} per ranker",
        report.query_count, report.top_k
    );
    if !report.queries.is_empty() {
        println!("Queries: {}", report.queries.join(", "));
    }

    println!("\n{}", "-".repeat(70));
    println!(
        "{:<10} {:>9} {:>9} {:>9} {:>9} {:>12}",
        "Ranker", "Prec", "Recall", "F1", "MAP", "Runtime ms"
    );
    for (ranker, m) in &report.metrics {
        println!(
            "{:<10} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>12.2}",
            ranker.name(),
            m.precision,
            m.recall,
            m.f1,
            m.average_precision,
            m.runtime_ms
        );
    }
    println!("{}\n", "=".repeat(70));
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let categories = if args.categories.is_empty() {
        Category::all().to_vec()
    } else {
        args.categories.clone()
    };
    let encoder = Arc::new(args.encoder());

    let mut reports = Vec::with_capacity(categories.len());
    for category in categories {
        eprintln!("Evaluating {}...", category);
        reports.push(report_for(&args, category, &encoder)?);
    }

    if args.json {
        let reports: Vec<&EvaluationReport> = reports.iter().map(|r| r.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    Ok(())
}
