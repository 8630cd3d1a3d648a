//! Artifact store for videos, transcripts, summaries and chat history.
//!
//! Provides a trait-based interface over storage backends. Every write runs
//! in its own transaction and returns the record as committed.

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryArtifactStore;
pub use sqlite::SqliteArtifactStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A stored video, keyed by its platform identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub audio_path: Option<String>,
    pub video_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a video that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVideo {
    pub id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub audio_path: Option<String>,
    pub video_path: Option<String>,
}

/// A time-aligned piece of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    #[serde(alias = "start_seconds")]
    pub start: f64,
    /// End time in seconds.
    #[serde(alias = "end_seconds")]
    pub end: f64,
    pub text: String,
}

/// Transcript of a video. At most one exists per video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: i64,
    pub video_id: String,
    pub text: String,
    pub file_path: Option<String>,
    pub model: Option<String>,
    pub segments: Option<Vec<TranscriptSegment>>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// Format the segments with timestamps, one per line.
    pub fn format_with_timestamps(&self) -> Option<String> {
        let segments = self.segments.as_ref()?;
        Some(
            segments
                .iter()
                .map(|s| {
                    format!(
                        "[{} - {}] {}",
                        format_timestamp(s.start),
                        format_timestamp(s.end),
                        s.text
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTranscript {
    pub video_id: String,
    pub text: String,
    pub file_path: Option<String>,
    pub model: Option<String>,
    pub segments: Option<Vec<TranscriptSegment>>,
    pub language: Option<String>,
}

impl NewTranscript {
    /// A transcript with only text set.
    pub fn new(video_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            text: text.into(),
            file_path: None,
            model: None,
            segments: None,
            language: None,
        }
    }
}

/// Summary of a video. At most one exists per video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    pub video_id: String,
    pub text: String,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSummary {
    pub video_id: String,
    pub text: String,
    pub model: Option<String>,
}

impl NewSummary {
    pub fn new(video_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            text: text.into(),
            model: None,
        }
    }
}

/// One chat turn about a video. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub video_id: String,
    pub session_id: String,
    pub message: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Trait for artifact store implementations.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Check whether a video is stored.
    async fn video_exists(&self, video_id: &str) -> Result<bool>;

    /// Get a video by id.
    async fn get_video(&self, video_id: &str) -> Result<Option<Video>>;

    /// Store a new video. Fails with `DuplicateKey` if the id is taken.
    async fn create_video(&self, video: &NewVideo) -> Result<Video>;

    /// Store a transcript. Fails with `ForeignKeyViolation` for an unknown
    /// video and `DuplicateKey` if the video already has one.
    async fn create_transcript(&self, transcript: &NewTranscript) -> Result<Transcript>;

    /// Get the transcript of a video.
    async fn get_transcript(&self, video_id: &str) -> Result<Option<Transcript>>;

    /// Store a summary. Same failure modes as `create_transcript`.
    async fn create_summary(&self, summary: &NewSummary) -> Result<Summary>;

    /// Get the summary of a video.
    async fn get_summary(&self, video_id: &str) -> Result<Option<Summary>>;

    /// Append a chat turn.
    async fn add_chat_message(
        &self,
        video_id: &str,
        session_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ChatMessage>;

    /// Chat turns of one session, newest first, at most `limit`.
    async fn get_chat_history(
        &self,
        video_id: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>>;

    /// Chat turns of all sessions for a video, oldest first.
    async fn get_video_chat_history(&self, video_id: &str) -> Result<Vec<ChatMessage>>;

    /// All stored videos, newest first.
    async fn list_videos(&self) -> Result<Vec<Video>>;
}

/// Timestamp for a new chat turn, strictly after `latest` if given.
pub(crate) fn next_timestamp(latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = truncate_micros(Utc::now());
    match latest {
        Some(latest) if now <= latest => latest + Duration::microseconds(1),
        _ => now,
    }
}

/// Current time at the precision timestamps are stored with.
pub(crate) fn now_micros() -> DateTime<Utc> {
    truncate_micros(Utc::now())
}

fn truncate_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(dt.timestamp_micros()).unwrap_or(dt)
}

/// Render a timestamp in the sortable text form used for storage and output.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
