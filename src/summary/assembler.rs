//! Read-side composition of a stored video into one record.

use super::{ChatEntry, StoredSummary};
use crate::error::Result;
use crate::store::ArtifactStore;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Builds [`StoredSummary`] records from an [`ArtifactStore`].
pub struct SummaryAssembler {
    store: Arc<dyn ArtifactStore>,
}

impl SummaryAssembler {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Everything stored for `video_id`, or `None` if the video is unknown.
    #[instrument(skip(self))]
    pub async fn get_stored_summary(&self, video_id: &str) -> Result<Option<StoredSummary>> {
        let Some(video) = self.store.get_video(video_id).await? else {
            error!("Video with ID {} not found in the database", video_id);
            return Ok(None);
        };

        let transcript = self.store.get_transcript(video_id).await?;
        if transcript.is_none() {
            warn!("Transcript not found for video ID {}", video_id);
        }
        let summary = self.store.get_summary(video_id).await?;
        let chat_history = self
            .store
            .get_video_chat_history(video_id)
            .await?
            .into_iter()
            .map(ChatEntry::from)
            .collect();

        let (transcript_path, transcript_text) = match transcript {
            Some(t) => (t.file_path, Some(t.text)),
            None => (None, None),
        };

        let stored = StoredSummary {
            video_id: video.id,
            title: video.title,
            author: video.author,
            url: video.url,
            audio_path: video.audio_path,
            video_path: video.video_path,
            transcript_path,
            transcript_text,
            summary: summary.map(|s| s.text),
            chat_history,
        };

        debug!("Assembled stored summary for {}", video_id);
        Ok(Some(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryArtifactStore, NewTranscript, NewVideo, SqliteArtifactStore};
    use crate::summary::{MediaInfo, SummaryPersister, VideoSummary};

    fn scenario_bundle() -> VideoSummary {
        VideoSummary {
            media_info: MediaInfo {
                video_id: "abc123".to_string(),
                title: "T".to_string(),
                author: "A".to_string(),
                url: "https://www.youtube.com/watch?v=abc123".to_string(),
                audio_path: None,
                video_path: None,
                transcript_path: None,
            },
            transcript_text: Some("hello world".to_string()),
            transcript_segments: None,
            language: None,
            summary: Some("short summary".to_string()),
            model: None,
        }
    }

    #[tokio::test]
    async fn test_scenario_on_empty_store() {
        let store: Arc<dyn ArtifactStore> = Arc::new(SqliteArtifactStore::in_memory().unwrap());
        SummaryPersister::new(store.clone())
            .store_summary(&scenario_bundle())
            .await
            .unwrap();

        let assembler = SummaryAssembler::new(store);
        let stored = assembler.get_stored_summary("abc123").await.unwrap().unwrap();
        assert_eq!(stored.video_id, "abc123");
        assert_eq!(stored.title, "T");
        assert_eq!(stored.transcript_text.as_deref(), Some("hello world"));
        assert_eq!(stored.summary.as_deref(), Some("short summary"));
        assert!(stored.chat_history.is_empty());

        assert!(assembler.get_stored_summary("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_absent_artifacts_are_explicit() {
        let store: Arc<dyn ArtifactStore> = Arc::new(MemoryArtifactStore::new());
        store
            .create_video(&NewVideo {
                id: "vid".to_string(),
                title: "Only metadata".to_string(),
                author: "A".to_string(),
                url: "https://youtu.be/vid".to_string(),
                audio_path: None,
                video_path: Some("data/downloads/vid.mp4".to_string()),
            })
            .await
            .unwrap();

        let stored = SummaryAssembler::new(store.clone())
            .get_stored_summary("vid")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.video_path.as_deref(), Some("data/downloads/vid.mp4"));
        assert!(stored.transcript_path.is_none());
        assert!(stored.transcript_text.is_none());
        assert!(stored.summary.is_none());

        let mut transcript = NewTranscript::new("vid", "words");
        transcript.file_path = Some("data/transcripts/vid.txt".to_string());
        store.create_transcript(&transcript).await.unwrap();

        let stored = SummaryAssembler::new(store)
            .get_stored_summary("vid")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.transcript_path.as_deref(), Some("data/transcripts/vid.txt"));
        assert!(stored.summary.is_none());
    }

    #[tokio::test]
    async fn test_includes_every_chat_session() {
        let store: Arc<dyn ArtifactStore> = Arc::new(SqliteArtifactStore::in_memory().unwrap());
        SummaryPersister::new(store.clone())
            .store_summary(&scenario_bundle())
            .await
            .unwrap();

        store.add_chat_message("abc123", "s1", "first", "one").await.unwrap();
        store.add_chat_message("abc123", "s2", "second", "two").await.unwrap();
        store.add_chat_message("abc123", "s1", "third", "three").await.unwrap();

        let stored = SummaryAssembler::new(store)
            .get_stored_summary("abc123")
            .await
            .unwrap()
            .unwrap();

        let messages: Vec<_> = stored.chat_history.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        for entry in &stored.chat_history {
            assert!(chrono::DateTime::parse_from_rfc3339(&entry.created_at).is_ok());
        }
        assert!(stored.chat_history[0].created_at < stored.chat_history[2].created_at);
    }
}
