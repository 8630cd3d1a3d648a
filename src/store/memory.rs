//! In-memory artifact store.
//!
//! Useful for testing and throwaway runs. Enforces the same key and
//! reference constraints as the SQLite store.

use super::{
    next_timestamp, now_micros, ArtifactStore, ChatMessage, NewSummary, NewTranscript, NewVideo,
    Summary, Transcript, Video,
};
use crate::error::{Result, YtsumError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    /// Videos in insertion order.
    videos: Vec<Video>,
    transcripts: HashMap<String, Transcript>,
    summaries: HashMap<String, Summary>,
    chat: Vec<ChatMessage>,
    next_id: i64,
}

impl State {
    fn has_video(&self, video_id: &str) -> bool {
        self.videos.iter().any(|v| v.id == video_id)
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory artifact store.
#[derive(Default)]
pub struct MemoryArtifactStore {
    state: RwLock<State>,
}

impl MemoryArtifactStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| YtsumError::StorageUnavailable(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| YtsumError::StorageUnavailable(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn video_exists(&self, video_id: &str) -> Result<bool> {
        Ok(self.read()?.has_video(video_id))
    }

    async fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let state = self.read()?;
        Ok(state.videos.iter().find(|v| v.id == video_id).cloned())
    }

    async fn create_video(&self, video: &NewVideo) -> Result<Video> {
        let mut state = self.write()?;
        if state.has_video(&video.id) {
            return Err(YtsumError::DuplicateKey {
                entity: "video",
                key: video.id.clone(),
            });
        }

        let created = Video {
            id: video.id.clone(),
            title: video.title.clone(),
            author: video.author.clone(),
            url: video.url.clone(),
            audio_path: video.audio_path.clone(),
            video_path: video.video_path.clone(),
            created_at: now_micros(),
        };
        state.videos.push(created.clone());
        Ok(created)
    }

    async fn create_transcript(&self, transcript: &NewTranscript) -> Result<Transcript> {
        let mut state = self.write()?;
        if !state.has_video(&transcript.video_id) {
            return Err(YtsumError::ForeignKeyViolation {
                entity: "transcript",
                video_id: transcript.video_id.clone(),
            });
        }
        if state.transcripts.contains_key(&transcript.video_id) {
            return Err(YtsumError::DuplicateKey {
                entity: "transcript",
                key: transcript.video_id.clone(),
            });
        }

        let created = Transcript {
            id: state.allocate_id(),
            video_id: transcript.video_id.clone(),
            text: transcript.text.clone(),
            file_path: transcript.file_path.clone(),
            model: transcript.model.clone(),
            segments: transcript.segments.clone(),
            language: transcript.language.clone(),
            created_at: now_micros(),
        };
        state
            .transcripts
            .insert(created.video_id.clone(), created.clone());
        Ok(created)
    }

    async fn get_transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        Ok(self.read()?.transcripts.get(video_id).cloned())
    }

    async fn create_summary(&self, summary: &NewSummary) -> Result<Summary> {
        let mut state = self.write()?;
        if !state.has_video(&summary.video_id) {
            return Err(YtsumError::ForeignKeyViolation {
                entity: "summary",
                video_id: summary.video_id.clone(),
            });
        }
        if state.summaries.contains_key(&summary.video_id) {
            return Err(YtsumError::DuplicateKey {
                entity: "summary",
                key: summary.video_id.clone(),
            });
        }

        let created = Summary {
            id: state.allocate_id(),
            video_id: summary.video_id.clone(),
            text: summary.text.clone(),
            model: summary.model.clone(),
            created_at: now_micros(),
        };
        state
            .summaries
            .insert(created.video_id.clone(), created.clone());
        Ok(created)
    }

    async fn get_summary(&self, video_id: &str) -> Result<Option<Summary>> {
        Ok(self.read()?.summaries.get(video_id).cloned())
    }

    async fn add_chat_message(
        &self,
        video_id: &str,
        session_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ChatMessage> {
        let mut state = self.write()?;
        if !state.has_video(video_id) {
            return Err(YtsumError::ForeignKeyViolation {
                entity: "chat message",
                video_id: video_id.to_string(),
            });
        }

        let latest = state
            .chat
            .iter()
            .filter(|m| m.video_id == video_id)
            .map(|m| m.created_at)
            .max();

        let entry = ChatMessage {
            id: state.allocate_id(),
            video_id: video_id.to_string(),
            session_id: session_id.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            created_at: next_timestamp(latest),
        };
        state.chat.push(entry.clone());
        Ok(entry)
    }

    async fn get_chat_history(
        &self,
        video_id: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>> {
        let state = self.read()?;
        Ok(state
            .chat
            .iter()
            .rev()
            .filter(|m| m.video_id == video_id && m.session_id == session_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_video_chat_history(&self, video_id: &str) -> Result<Vec<ChatMessage>> {
        let state = self.read()?;
        Ok(state
            .chat
            .iter()
            .filter(|m| m.video_id == video_id)
            .cloned()
            .collect())
    }

    async fn list_videos(&self) -> Result<Vec<Video>> {
        let state = self.read()?;
        Ok(state.videos.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;

    #[tokio::test]
    async fn test_video_roundtrip() {
        contract::video_roundtrip(&MemoryArtifactStore::new()).await;
    }

    #[tokio::test]
    async fn test_one_transcript_and_summary() {
        contract::one_transcript_and_summary(&MemoryArtifactStore::new()).await;
    }

    #[tokio::test]
    async fn test_unknown_video_rejected() {
        contract::unknown_video_rejected(&MemoryArtifactStore::new()).await;
    }

    #[tokio::test]
    async fn test_chat_history_ordering() {
        contract::chat_history_ordering(&MemoryArtifactStore::new()).await;
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        contract::list_newest_first(&MemoryArtifactStore::new()).await;
    }
}
