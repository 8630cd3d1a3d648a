//! NVIDIA embeddings through the OpenAI-compatible endpoint.

use super::{Embedder, BATCH_SIZE};
use crate::config::EmbeddingSettings;
use crate::error::{Result, YtsumError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// NVIDIA-hosted embedder.
pub struct NvidiaEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl NvidiaEmbedder {
    pub fn new(settings: &EmbeddingSettings, api_key: &str) -> Result<Self> {
        if settings.model.trim().is_empty() {
            return Err(YtsumError::Config("Embedding model is not set".to_string()));
        }

        let client = create_client(
            &settings.nvidia_api_base,
            api_key,
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            dimensions: settings.dimensions,
        })
    }
}

#[async_trait]
impl Embedder for NvidiaEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| YtsumError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .build()
                .map_err(|e| YtsumError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| YtsumError::Embedding(format!("NVIDIA embedding API error: {}", e)))?;

            let mut embeddings = response.data;
            embeddings.sort_by_key(|e| e.index);
            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_model_and_key() {
        let settings = EmbeddingSettings::default();
        assert!(NvidiaEmbedder::new(&settings, "nvapi-key").is_ok());
        assert!(NvidiaEmbedder::new(&settings, " ").is_err());

        let no_model = EmbeddingSettings {
            model: " ".to_string(),
            ..EmbeddingSettings::default()
        };
        assert!(NvidiaEmbedder::new(&no_model, "nvapi-key").is_err());
    }
}
