//! Embeddings from the HuggingFace inference API.

use super::{Embedder, BATCH_SIZE};
use crate::config::EmbeddingSettings;
use crate::error::{Result, YtsumError};
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Sentence-transformers model served by the inference API.
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// HuggingFace feature-extraction embedder.
pub struct HuggingFaceEmbedder {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
    dimensions: usize,
}

impl HuggingFaceEmbedder {
    pub fn new(settings: &EmbeddingSettings, token: Option<String>) -> Result<Self> {
        let base = settings.huggingface_api_base.trim_end_matches('/');
        let endpoint = Url::parse(&format!(
            "{}/pipeline/feature-extraction/{}",
            base, DEFAULT_HUGGINGFACE_MODEL
        ))
        .map_err(|e| YtsumError::Config(format!("Invalid HuggingFace API base '{}': {}", base, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            token,
            dimensions: settings.dimensions,
        })
    }

    pub fn model(&self) -> &str {
        DEFAULT_HUGGINGFACE_MODEL
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
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
            let body = FeatureExtractionRequest {
                inputs: chunk,
                options: RequestOptions {
                    wait_for_model: true,
                },
            };

            let mut request = self.http.post(self.endpoint.clone()).json(&body);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(YtsumError::Embedding(format!(
                    "HuggingFace API returned {}: {}",
                    status, detail
                )));
            }

            let embeddings: Vec<Vec<f32>> = response.json().await?;
            if embeddings.len() != chunk.len() {
                return Err(YtsumError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    embeddings.len()
                )));
            }
            all_embeddings.extend(embeddings);
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
