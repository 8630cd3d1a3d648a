//! Summary bundles: writing them once, reading them back as one record.

mod assembler;
mod persister;

pub use assembler::SummaryAssembler;
pub use persister::{PersistOutcome, SummaryPersister};

use crate::store::{format_datetime, ChatMessage, NewVideo, TranscriptSegment};
use serde::{Deserialize, Serialize};

/// Video metadata as produced by the download step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub video_path: Option<String>,
    /// Where the transcript file was written, if anywhere.
    #[serde(default)]
    pub transcript_path: Option<String>,
}

impl From<&MediaInfo> for NewVideo {
    fn from(media: &MediaInfo) -> Self {
        NewVideo {
            id: media.video_id.clone(),
            title: media.title.clone(),
            author: media.author.clone(),
            url: media.url.clone(),
            audio_path: media.audio_path.clone(),
            video_path: media.video_path.clone(),
        }
    }
}

/// Output of the transcription and summarization pipeline for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub media_info: MediaInfo,
    #[serde(default)]
    pub transcript_text: Option<String>,
    #[serde(default)]
    pub transcript_segments: Option<Vec<TranscriptSegment>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Model that generated the summary.
    #[serde(default)]
    pub model: Option<String>,
}

impl VideoSummary {
    /// Transcript text, if present and non-empty.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript_text.as_deref().filter(|t| !t.is_empty())
    }

    /// Summary text, if present and non-empty.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.is_empty())
    }
}

/// Everything stored about a video, ready for display.
///
/// Missing artifacts serialize as `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSummary {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub audio_path: Option<String>,
    pub video_path: Option<String>,
    pub transcript_path: Option<String>,
    pub transcript_text: Option<String>,
    pub summary: Option<String>,
    pub chat_history: Vec<ChatEntry>,
}

/// A chat turn as shown alongside a stored summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub message: String,
    pub response: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<ChatMessage> for ChatEntry {
    fn from(chat: ChatMessage) -> Self {
        Self {
            created_at: format_datetime(&chat.created_at),
            message: chat.message,
            response: chat.response,
        }
    }
}
