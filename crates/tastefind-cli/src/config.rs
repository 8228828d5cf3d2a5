//! Configuration and path resolution for the CLI.
//!
//! Handles finding the artifacts directory, the encoder model files and the
//! ranking configuration across different environments:
//! - Explicit: command-line flags
//! - Custom: environment variables
//! - Development: workspace-relative directories
//! - Installed: platform config directory

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tastefind_core::config::RankingConfig;
use tastefind_core::embedding::{EncoderHandle, HashingEncoder, QueryEncoder};
use tracing::{info, warn};

/// Environment variable for the artifacts directory
const ARTIFACTS_DIR_ENV: &str = "TASTEFIND_ARTIFACTS";

/// Environment variable for the model directory
const MODEL_DIR_ENV: &str = "TASTEFIND_MODEL_DIR";

/// Artifacts directory used when nothing else is configured
const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// File whose presence marks a usable model directory
const MODEL_CONFIG_FILENAME: &str = "config.json";

/// Ranking configuration file looked up in the platform config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Semantic encoder backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EncoderKind {
    /// Sentence-transformer BERT model loaded from disk
    Bert,
    /// Feature-hashing encoder, no model files
    Hashing,
}

/// Resolves the artifacts directory.
///
/// Search order:
/// 1. `--artifacts` flag
/// 2. `$TASTEFIND_ARTIFACTS` environment variable
/// 3. `./artifacts`
pub fn artifacts_dir(custom: Option<&PathBuf>) -> PathBuf {
    if let Some(dir) = custom {
        return dir.clone();
    }
    match std::env::var(ARTIFACTS_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_ARTIFACTS_DIR),
    }
}

/// Finds the directory holding the BERT `config.json`, tokenizer and weights.
///
/// Search order:
/// 1. `--models` flag
/// 2. `$TASTEFIND_MODEL_DIR` environment variable
/// 3. Workspace `models/` directory (development)
/// 4. Executable-relative `models/` and `../models/` (distribution)
pub fn find_model_dir(custom: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = custom {
        if dir.join(MODEL_CONFIG_FILENAME).exists() {
            return Ok(dir.clone());
        }
        return Err(anyhow!(
            "No {} in model directory {}",
            MODEL_CONFIG_FILENAME,
            dir.display()
        ));
    }

    if let Ok(dir) = std::env::var(MODEL_DIR_ENV) {
        let path = PathBuf::from(dir);
        if path.join(MODEL_CONFIG_FILENAME).exists() {
            return Ok(path);
        }
    }

    // CARGO_MANIFEST_DIR points to crates/tastefind-cli
    let workspace_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.join("models"));
    if let Some(ref path) = workspace_path {
        if path.join(MODEL_CONFIG_FILENAME).exists() {
            return Ok(path.clone());
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            for candidate in [exe_dir.join("models"), exe_dir.join("../models")] {
                if candidate.join(MODEL_CONFIG_FILENAME).exists() {
                    return Ok(candidate);
                }
            }
        }
    }

    Err(anyhow!(
        "Model files not found.\n\
         Searched locations:\n\
         - ${} environment variable\n\
         - {}\n\
         - Relative to executable",
        MODEL_DIR_ENV,
        workspace_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<workspace>/models".to_string())
    ))
}

/// Platform config file, e.g. `~/.config/tastefind/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "tastefind", "tastefind")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Loads the ranking configuration.
///
/// An explicit `--config` file must exist. Without one, the platform config
/// file is used when present, otherwise the built-in defaults.
pub fn load_ranking_config(custom: Option<&PathBuf>) -> Result<RankingConfig> {
    let path = match custom {
        Some(path) => path.clone(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path,
            None => return Ok(RankingConfig::default()),
        },
    };
    info!("Loading ranking config: {}", path.display());
    RankingConfig::load(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Builds the encoder handle for `kind`.
///
/// For BERT the model is loaded lazily on the first semantic query. If the
/// model directory cannot be found the handle is marked unavailable and
/// search continues lexical-only.
pub fn encoder_handle(kind: EncoderKind, models: Option<&PathBuf>) -> EncoderHandle {
    match kind {
        EncoderKind::Hashing => EncoderHandle::ready(hashing_encoder()),
        EncoderKind::Bert => match find_model_dir(models) {
            Ok(dir) => {
                info!("Using BERT model from {}", dir.display());
                EncoderHandle::bert(dir)
            }
            Err(e) => {
                warn!("{}", e);
                EncoderHandle::unavailable(e.to_string())
            }
        },
    }
}

fn hashing_encoder() -> Arc<dyn QueryEncoder> {
    Arc::new(HashingEncoder::default())
}

/// Checks that the artifacts directory exists before loading anything.
pub fn ensure_artifacts_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(anyhow!(
            "Artifacts directory not found: {}\n\
             Pass --artifacts or set ${}.",
            dir.display(),
            ARTIFACTS_DIR_ENV
        ))
    }
}
