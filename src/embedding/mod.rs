//! Embedding generation and provider selection.
//!
//! Providers are tried in order: NVIDIA (when an API key is configured),
//! the HuggingFace inference API, and finally a zero-vector fallback that
//! keeps the application running without any embedding service.

mod fallback;
mod huggingface;
mod nvidia;

pub use fallback::FallbackEmbedder;
pub use huggingface::{HuggingFaceEmbedder, DEFAULT_HUGGINGFACE_MODEL};
pub use nvidia::NvidiaEmbedder;

use crate::config::{Credentials, EmbeddingSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Largest number of inputs sent to a provider in one request.
pub(crate) const BATCH_SIZE: usize = 50;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Which provider backs a [`SelectedEmbedder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    Nvidia,
    HuggingFace,
    Fallback,
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Nvidia => write!(f, "nvidia"),
            EmbeddingProvider::HuggingFace => write!(f, "huggingface"),
            EmbeddingProvider::Fallback => write!(f, "fallback"),
        }
    }
}

/// An embedder together with the provider that was chosen.
#[derive(Clone)]
pub struct SelectedEmbedder {
    pub provider: EmbeddingProvider,
    pub embedder: Arc<dyn Embedder>,
}

/// Pick the best available embedding provider. Never fails.
pub fn select_embedder(settings: &EmbeddingSettings, credentials: &Credentials) -> SelectedEmbedder {
    if let Some(api_key) = credentials.nvidia_api_key.as_deref() {
        match NvidiaEmbedder::new(settings, api_key) {
            Ok(embedder) => {
                info!("Using NVIDIA embeddings model {}", settings.model);
                return SelectedEmbedder {
                    provider: EmbeddingProvider::Nvidia,
                    embedder: Arc::new(embedder),
                };
            }
            Err(e) => {
                error!("Error loading NVIDIA embeddings: {}", e);
                warn!("Falling back to HuggingFace embeddings");
            }
        }
    }

    match HuggingFaceEmbedder::new(settings, credentials.huggingface_token.clone()) {
        Ok(embedder) => {
            info!("Using HuggingFace embeddings model {}", embedder.model());
            return SelectedEmbedder {
                provider: EmbeddingProvider::HuggingFace,
                embedder: Arc::new(embedder),
            };
        }
        Err(e) => {
            error!("Error loading HuggingFace embeddings: {}", e);
        }
    }

    warn!("Using fallback embeddings (zeros); search results will not be meaningful");
    SelectedEmbedder {
        provider: EmbeddingProvider::Fallback,
        embedder: Arc::new(FallbackEmbedder::new(settings.dimensions)),
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(nvidia: Option<&str>) -> Credentials {
        Credentials {
            groq_api_key: None,
            nvidia_api_key: nvidia.map(str::to_string),
            huggingface_token: None,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }

    #[test]
    fn test_nvidia_selected_with_key() {
        let selected = select_embedder(&EmbeddingSettings::default(), &credentials(Some("nvapi-test")));
        assert_eq!(selected.provider, EmbeddingProvider::Nvidia);
    }

    #[test]
    fn test_huggingface_without_key() {
        let selected = select_embedder(&EmbeddingSettings::default(), &credentials(None));
        assert_eq!(selected.provider, EmbeddingProvider::HuggingFace);
        assert_eq!(selected.embedder.dimensions(), 384);
    }

    #[test]
    fn test_broken_nvidia_falls_back_to_huggingface() {
        let settings = EmbeddingSettings {
            model: String::new(),
            ..EmbeddingSettings::default()
        };
        let selected = select_embedder(&settings, &credentials(Some("nvapi-test")));
        assert_eq!(selected.provider, EmbeddingProvider::HuggingFace);
    }

    #[tokio::test]
    async fn test_zero_fallback_when_nothing_loads() {
        let settings = EmbeddingSettings {
            huggingface_api_base: "not a url".to_string(),
            ..EmbeddingSettings::default()
        };
        let selected = select_embedder(&settings, &credentials(None));
        assert_eq!(selected.provider, EmbeddingProvider::Fallback);

        let embedding = selected.embedder.embed("anything").await.unwrap();
        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|v| *v == 0.0));
    }
}
