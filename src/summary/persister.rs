//! Idempotent persistence of summary bundles.

use super::VideoSummary;
use crate::error::{Result, YtsumError};
use crate::store::{ArtifactStore, NewSummary, NewTranscript, NewVideo};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What a call to [`SummaryPersister::store_summary`] created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersistOutcome {
    pub video_created: bool,
    pub transcript_created: bool,
    pub summary_created: bool,
}

impl PersistOutcome {
    /// Whether the call changed nothing.
    pub fn is_noop(&self) -> bool {
        !(self.video_created || self.transcript_created || self.summary_created)
    }
}

/// Writes summary bundles into an [`ArtifactStore`].
///
/// The first successful write of a transcript or summary wins. Later bundles
/// for the same video never overwrite it, and an insert that loses a race
/// against another writer counts as a no-op.
pub struct SummaryPersister {
    store: Arc<dyn ArtifactStore>,
    transcription_model: Option<String>,
}

impl SummaryPersister {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            transcription_model: None,
        }
    }

    /// Record `model` as the source of transcripts stored by this persister.
    pub fn with_transcription_model(mut self, model: impl Into<String>) -> Self {
        self.transcription_model = Some(model.into());
        self
    }

    /// Store a bundle, creating only what does not exist yet.
    #[instrument(skip(self, bundle), fields(video_id = %bundle.media_info.video_id))]
    pub async fn store_summary(&self, bundle: &VideoSummary) -> Result<PersistOutcome> {
        let media = &bundle.media_info;
        if media.video_id.trim().is_empty() {
            return Err(YtsumError::InvalidInput("video_id must not be empty".to_string()));
        }

        let video_id = media.video_id.as_str();
        let mut outcome = PersistOutcome::default();

        debug!("Storing summary for video {}", video_id);

        if self.store.get_video(video_id).await?.is_none() {
            debug!("Video {} not stored yet, creating it", video_id);
            outcome.video_created =
                created_or_lost_race(self.store.create_video(&NewVideo::from(media)).await)?;
        }

        if let Some(text) = bundle.transcript() {
            if self.store.get_transcript(video_id).await?.is_none() {
                let transcript = NewTranscript {
                    video_id: video_id.to_string(),
                    text: text.to_string(),
                    file_path: media.transcript_path.clone(),
                    model: self.transcription_model.clone(),
                    segments: bundle.transcript_segments.clone(),
                    language: bundle.language.clone(),
                };
                outcome.transcript_created =
                    created_or_lost_race(self.store.create_transcript(&transcript).await)?;
            } else {
                debug!("Transcript for {} already stored, keeping it", video_id);
            }
        }

        if let Some(text) = bundle.summary_text() {
            if self.store.get_summary(video_id).await?.is_none() {
                let summary = NewSummary {
                    video_id: video_id.to_string(),
                    text: text.to_string(),
                    model: bundle.model.clone(),
                };
                outcome.summary_created =
                    created_or_lost_race(self.store.create_summary(&summary).await)?;
            } else {
                debug!("Summary for {} already stored, keeping it", video_id);
            }
        }

        info!(
            video_created = outcome.video_created,
            transcript_created = outcome.transcript_created,
            summary_created = outcome.summary_created,
            "Stored summary bundle for {}",
            video_id
        );
        Ok(outcome)
    }
}

/// `Ok(true)` if the insert happened, `Ok(false)` if another writer got there first.
fn created_or_lost_race<T>(result: Result<T>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(YtsumError::DuplicateKey { entity, key }) => {
            debug!("{} for {} was stored concurrently", entity, key);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
