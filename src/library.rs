//! The video library: one entry point over storage, persistence and search.

use crate::config::{Credentials, Settings};
use crate::embedding::{cosine_similarity, select_embedder, Embedder, EmbeddingProvider};
use crate::error::{Result, YtsumError};
use crate::store::{ArtifactStore, ChatMessage, SqliteArtifactStore, Video};
use crate::summary::{PersistOutcome, StoredSummary, SummaryAssembler, SummaryPersister, VideoSummary};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A stored video matching a search query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub summary: String,
    pub score: f32,
}

/// Stored videos and everything attached to them.
pub struct Library {
    settings: Settings,
    store: Arc<dyn ArtifactStore>,
    persister: SummaryPersister,
    assembler: SummaryAssembler,
    embedder: Arc<dyn Embedder>,
    embedding_provider: EmbeddingProvider,
}

impl Library {
    /// Open the library described by `settings`, using credentials from the environment.
    pub fn new(settings: Settings) -> Result<Self> {
        let store = Arc::new(SqliteArtifactStore::new(&settings.database_path())?);
        let selected = select_embedder(&settings.embedding, &Credentials::from_env());

        Ok(Self::with_components(
            settings,
            store,
            selected.embedder,
            selected.provider,
        ))
    }

    /// Create a library with custom components.
    pub fn with_components(
        settings: Settings,
        store: Arc<dyn ArtifactStore>,
        embedder: Arc<dyn Embedder>,
        embedding_provider: EmbeddingProvider,
    ) -> Self {
        let persister = SummaryPersister::new(store.clone())
            .with_transcription_model(settings.models.transcription.clone());
        let assembler = SummaryAssembler::new(store.clone());

        Self {
            settings,
            store,
            persister,
            assembler,
            embedder,
            embedding_provider,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn ArtifactStore> {
        self.store.clone()
    }

    pub fn embedding_provider(&self) -> EmbeddingProvider {
        self.embedding_provider
    }

    /// Store a summary bundle; see [`SummaryPersister::store_summary`].
    pub async fn store_summary(&self, bundle: &VideoSummary) -> Result<PersistOutcome> {
        self.persister.store_summary(bundle).await
    }

    /// Everything stored for a video; see [`SummaryAssembler::get_stored_summary`].
    pub async fn get_stored_summary(&self, video_id: &str) -> Result<Option<StoredSummary>> {
        self.assembler.get_stored_summary(video_id).await
    }

    /// Record a chat turn about a video.
    pub async fn add_chat_message(
        &self,
        video_id: &str,
        session_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ChatMessage> {
        if session_id.trim().is_empty() {
            return Err(YtsumError::InvalidInput("session_id must not be empty".to_string()));
        }
        self.store
            .add_chat_message(video_id, session_id, message, response)
            .await
    }

    /// Recent chat turns of a session, newest first. Uses the configured
    /// default when `limit` is `None`.
    pub async fn get_chat_history(
        &self,
        video_id: &str,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>> {
        let limit = limit.unwrap_or(self.settings.chat.history_limit);
        self.store.get_chat_history(video_id, session_id, limit).await
    }

    pub async fn list_videos(&self) -> Result<Vec<Video>> {
        self.store.list_videos().await
    }

    /// Rank stored summaries by similarity to `query`.
    ///
    /// Returns at most `limit` hits (the configured `k` if `None`) scoring at
    /// least the configured similarity threshold, best first.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(YtsumError::InvalidInput("query must not be empty".to_string()));
        }
        let limit = limit.unwrap_or(self.settings.retrieval.k);
        let threshold = self.settings.retrieval.similarity_threshold;

        let mut candidates = Vec::new();
        for video in self.store.list_videos().await? {
            if let Some(summary) = self.store.get_summary(&video.id).await? {
                candidates.push((video, summary.text));
            }
        }
        if candidates.is_empty() {
            debug!("No stored summaries to search");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let texts: Vec<String> = candidates.iter().map(|(_, text)| text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .zip(embeddings)
            .map(|((video, summary), embedding)| SearchHit {
                score: cosine_similarity(&query_embedding, &embedding),
                video_id: video.id,
                title: video.title,
                author: video.author,
                summary,
            })
            .filter(|hit| hit.score >= threshold)
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        info!("Found {} matching videos", hits.len());
        Ok(hits)
    }
}
