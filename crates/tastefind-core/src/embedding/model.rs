//! BERT sentence encoder running on Candle.
//!
//! Loads a sentence-transformers style BERT checkpoint (for example
//! `all-MiniLM-L6-v2`) from a directory containing `config.json`,
//! `tokenizer.json` and `model.safetensors`. Sentence vectors are the mean of
//! the last hidden states, L2-normalized.

use super::tokenizer::TokenizerHandle;
use super::traits::QueryEncoder;
use crate::error::EmbeddingError;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

const MAX_SEQUENCE_LENGTH: usize = 256;

/// Fields of `config.json` the encoder needs besides what Candle parses.
#[derive(Deserialize)]
struct ModelShape {
    hidden_size: usize,
    #[serde(default)]
    max_position_embeddings: Option<usize>,
}

/// BERT encoder with mean pooling.
pub struct BertEncoder {
    model: BertModel,
    tokenizer: TokenizerHandle,
    device: Device,
    dimension: usize,
    name: String,
}

impl BertEncoder {
    /// Loads the model files from `model_dir`.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::ModelLoad` if any file is missing or invalid.
    #[instrument(skip_all, fields(model_dir = %model_dir.display()))]
    pub fn load(model_dir: &Path) -> Result<Self, EmbeddingError> {
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path).map_err(|e| {
            EmbeddingError::ModelLoad(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&raw_config)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Invalid config.json: {}", e)))?;
        let shape: ModelShape = serde_json::from_str(&raw_config)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Invalid config.json: {}", e)))?;

        let max_length = shape
            .max_position_embeddings
            .unwrap_or(MAX_SEQUENCE_LENGTH)
            .min(MAX_SEQUENCE_LENGTH);
        let tokenizer = TokenizerHandle::from_file(&model_dir.join("tokenizer.json"), max_length)?;

        let weights_path = model_dir.join("model.safetensors");
        let weights = std::fs::read(&weights_path).map_err(|e| {
            EmbeddingError::ModelLoad(format!("Failed to read {}: {}", weights_path.display(), e))
        })?;
        info!(
            "Model bytes: {:.2}MB, {} hidden dimensions",
            weights.len() as f64 / 1_000_000.0,
            shape.hidden_size
        );

        let device = select_device();
        let vb = VarBuilder::from_buffered_safetensors(weights, DTYPE, &device).map_err(|e| {
            EmbeddingError::ModelLoad(format!("Failed to create VarBuilder: {}", e))
        })?;
        let model = BertModel::load(vb, &config)
            .map_err(|e| EmbeddingError::ModelLoad(format!("Failed to create BertModel: {}", e)))?;

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bert".to_string());

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension: shape.hidden_size,
            name,
        })
    }

    /// Runs the model and mean-pools the last hidden states.
    fn embed_ids(&self, ids: Vec<u32>) -> Result<Vec<f32>, EmbeddingError> {
        let n_tokens = ids.len();
        let input = Tensor::from_vec(ids, (1, n_tokens), &self.device).map_err(inference)?;
        let token_types = input.zeros_like().map_err(inference)?;
        let mask = input.ones_like().map_err(inference)?;

        // [1, n_tokens, hidden] -> [1, hidden]
        let hidden = self
            .model
            .forward(&input, &token_types, Some(&mask))
            .map_err(inference)?;
        let pooled = hidden
            .sum(1)
            .map_err(inference)?
            .affine(1.0 / n_tokens as f64, 0.0)
            .map_err(inference)?;

        let norm = pooled
            .sqr()
            .map_err(inference)?
            .sum_keepdim(1)
            .map_err(inference)?
            .sqrt()
            .map_err(inference)?;
        pooled
            .broadcast_div(&norm)
            .map_err(inference)?
            .squeeze(0)
            .map_err(inference)?
            .to_vec1::<f32>()
            .map_err(inference)
    }
}

impl QueryEncoder for BertEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let ids = self.tokenizer.tokenize(text)?;
        self.embed_ids(ids)
    }
}

/// Picks CUDA, then Metal, then CPU.
fn select_device() -> Device {
    if let Ok(device) = Device::new_cuda(0) {
        info!("Using CUDA GPU");
        return device;
    }
    if let Ok(device) = Device::new_metal(0) {
        info!("Using Metal GPU");
        return device;
    }
    info!("Using CPU");
    Device::Cpu
}

fn inference(e: candle_core::Error) -> EmbeddingError {
    EmbeddingError::InferenceFailed(e.to_string())
}
