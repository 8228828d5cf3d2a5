//! Single-initialization handle around the process-wide encoder.

use super::traits::QueryEncoder;
use crate::error::EmbeddingError;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, warn};

type Loader = Box<dyn Fn() -> Result<Arc<dyn QueryEncoder>, EmbeddingError> + Send + Sync>;

/// Owns the semantic encoder and loads it at most once.
///
/// The first caller of [`get`](Self::get) runs the loader while concurrent
/// callers block on the same cell; everyone afterwards receives the cached
/// encoder or the cached failure. A failed load is never retried.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tastefind_core::embedding::{EncoderHandle, HashingEncoder, QueryEncoder};
///
/// let handle = EncoderHandle::lazy(|| Ok(Arc::new(HashingEncoder::new(64)) as Arc<dyn QueryEncoder>));
/// assert!(!handle.is_initialized());
/// assert_eq!(handle.get().unwrap().dimension(), 64);
/// assert!(handle.is_initialized());
/// ```
pub struct EncoderHandle {
    loader: Option<Loader>,
    cell: OnceCell<Result<Arc<dyn QueryEncoder>, EmbeddingError>>,
}

impl EncoderHandle {
    /// Defers construction to the first use.
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn QueryEncoder>, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Box::new(loader)),
            cell: OnceCell::new(),
        }
    }

    /// Wraps an encoder that is already constructed.
    pub fn ready(encoder: Arc<dyn QueryEncoder>) -> Self {
        Self {
            loader: None,
            cell: OnceCell::with_value(Ok(encoder)),
        }
    }

    /// A handle whose encoder can never be used. Search runs lexical-only.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            loader: None,
            cell: OnceCell::with_value(Err(EmbeddingError::Unavailable(reason.into()))),
        }
    }

    /// Loads the BERT encoder from `model_dir` on first use.
    #[cfg(feature = "bert")]
    pub fn bert(model_dir: impl Into<std::path::PathBuf>) -> Self {
        let model_dir = model_dir.into();
        Self::lazy(move || {
            super::BertEncoder::load(&model_dir).map(|e| Arc::new(e) as Arc<dyn QueryEncoder>)
        })
    }

    /// Returns the encoder, running the loader if this is the first call.
    pub fn get(&self) -> Result<Arc<dyn QueryEncoder>, EmbeddingError> {
        self.cell
            .get_or_init(|| {
                let result = match &self.loader {
                    Some(loader) => loader(),
                    None => Err(EmbeddingError::Unavailable(
                        "no encoder configured".to_string(),
                    )),
                };
                match &result {
                    Ok(encoder) => info!(
                        "Semantic encoder '{}' ready ({} dimensions)",
                        encoder.name(),
                        encoder.dimension()
                    ),
                    Err(e) => warn!("Semantic encoder unavailable, ranking lexical-only: {}", e),
                }
                result
            })
            .clone()
    }

    /// Whether initialization has already run (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl std::fmt::Debug for EncoderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("EncoderHandle").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEncoder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_loader_runs_once_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = Arc::new(EncoderHandle::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(HashingEncoder::new(16)) as Arc<dyn QueryEncoder>)
        }));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || handle.get().map(|e| e.dimension()))
            })
            .collect();
        for t in threads {
            assert_eq!(t.join().unwrap().unwrap(), 16);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = EncoderHandle::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(EmbeddingError::ModelLoad("missing weights".to_string()))
        });

        assert!(matches!(handle.get(), Err(EmbeddingError::ModelLoad(_))));
        assert!(matches!(handle.get(), Err(EmbeddingError::ModelLoad(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(format!("{:?}", handle), "EncoderHandle { state: \"failed\" }");
    }

    #[test]
    fn test_unavailable_and_ready() {
        assert!(matches!(
            EncoderHandle::unavailable("offline").get(),
            Err(EmbeddingError::Unavailable(_))
        ));
        let ready = EncoderHandle::ready(Arc::new(HashingEncoder::new(8)));
        assert!(ready.is_initialized());
        assert_eq!(ready.get().unwrap().name(), "hashing");
    }
}
