//! SQLite-based artifact store.
//!
//! A single connection guarded by a mutex. Foreign keys are enforced by
//! SQLite, so inserts for unknown videos fail without touching any table.

use super::{
    format_datetime, migrations, next_timestamp, now_micros, ArtifactStore, ChatMessage,
    NewSummary, NewTranscript, NewVideo, Summary, Transcript, Video,
};
use crate::error::{Result, YtsumError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, instrument};

const VIDEO_COLUMNS: &str = "id, title, author, url, audio_path, video_path, created_at";
const TRANSCRIPT_COLUMNS: &str =
    "id, video_id, text, file_path, model, segments, language, created_at";
const SUMMARY_COLUMNS: &str = "id, video_id, text, model, created_at";
const CHAT_COLUMNS: &str = "id, video_id, session_id, message, response, created_at";

/// SQLite-based artifact store.
pub struct SqliteArtifactStore {
    conn: Mutex<Connection>,
}

impl SqliteArtifactStore {
    /// Open (or create) the store at `path` and apply pending migrations.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                YtsumError::StorageUnavailable(format!(
                    "Cannot create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| match YtsumError::from(e) {
            YtsumError::Database(e) => YtsumError::StorageUnavailable(format!(
                "Cannot open database {}: {}",
                path.display(),
                e
            )),
            other => other,
        })?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        let store = Self::init(conn)?;

        info!("Opened artifact store at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| YtsumError::StorageUnavailable(format!("Failed to acquire lock: {}", e)))
    }
}

fn parse_datetime(value: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    parse_datetime(&value, idx)
}

fn row_to_video(row: &Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        url: row.get(3)?,
        audio_path: row.get(4)?,
        video_path: row.get(5)?,
        created_at: datetime_column(row, 6)?,
    })
}

fn row_to_transcript(row: &Row<'_>) -> rusqlite::Result<Transcript> {
    let segments_json: Option<String> = row.get(5)?;
    let segments = segments_json
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(Transcript {
        id: row.get(0)?,
        video_id: row.get(1)?,
        text: row.get(2)?,
        file_path: row.get(3)?,
        model: row.get(4)?,
        segments,
        language: row.get(6)?,
        created_at: datetime_column(row, 7)?,
    })
}

fn row_to_summary(row: &Row<'_>) -> rusqlite::Result<Summary> {
    Ok(Summary {
        id: row.get(0)?,
        video_id: row.get(1)?,
        text: row.get(2)?,
        model: row.get(3)?,
        created_at: datetime_column(row, 4)?,
    })
}

fn row_to_chat(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        video_id: row.get(1)?,
        session_id: row.get(2)?,
        message: row.get(3)?,
        response: row.get(4)?,
        created_at: datetime_column(row, 5)?,
    })
}

#[async_trait]
impl ArtifactStore for SqliteArtifactStore {
    async fn video_exists(&self, video_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM videos WHERE id = ?1)",
            params![video_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let conn = self.lock()?;
        let video = conn
            .query_row(
                &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1"),
                params![video_id],
                row_to_video,
            )
            .optional()?;
        Ok(video)
    }

    #[instrument(skip(self, video), fields(video_id = %video.id))]
    async fn create_video(&self, video: &NewVideo) -> Result<Video> {
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        tx.execute(
            &format!("INSERT INTO videos ({VIDEO_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                video.id,
                video.title,
                video.author,
                video.url,
                video.audio_path,
                video.video_path,
                format_datetime(&now_micros()),
            ],
        )
        .map_err(|e| YtsumError::from_insert(e, "video", &video.id))?;
        tx.commit()?;

        let created = conn.query_row(
            &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1"),
            params![video.id],
            row_to_video,
        )?;

        debug!("Created video {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self, transcript), fields(video_id = %transcript.video_id))]
    async fn create_transcript(&self, transcript: &NewTranscript) -> Result<Transcript> {
        let segments_json = transcript
            .segments
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO transcripts (video_id, text, file_path, model, segments, language, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                transcript.video_id,
                transcript.text,
                transcript.file_path,
                transcript.model,
                segments_json,
                transcript.language,
                format_datetime(&now_micros()),
            ],
        )
        .map_err(|e| YtsumError::from_insert(e, "transcript", &transcript.video_id))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let created = conn.query_row(
            &format!("SELECT {TRANSCRIPT_COLUMNS} FROM transcripts WHERE id = ?1"),
            params![id],
            row_to_transcript,
        )?;

        debug!("Created transcript {} ({} chars)", created.id, created.text.len());
        Ok(created)
    }

    async fn get_transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        let conn = self.lock()?;
        let transcript = conn
            .query_row(
                &format!("SELECT {TRANSCRIPT_COLUMNS} FROM transcripts WHERE video_id = ?1"),
                params![video_id],
                row_to_transcript,
            )
            .optional()?;
        Ok(transcript)
    }

    #[instrument(skip(self, summary), fields(video_id = %summary.video_id))]
    async fn create_summary(&self, summary: &NewSummary) -> Result<Summary> {
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO summaries (video_id, text, model, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                summary.video_id,
                summary.text,
                summary.model,
                format_datetime(&now_micros()),
            ],
        )
        .map_err(|e| YtsumError::from_insert(e, "summary", &summary.video_id))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let created = conn.query_row(
            &format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE id = ?1"),
            params![id],
            row_to_summary,
        )?;

        debug!("Created summary {}", created.id);
        Ok(created)
    }

    async fn get_summary(&self, video_id: &str) -> Result<Option<Summary>> {
        let conn = self.lock()?;
        let summary = conn
            .query_row(
                &format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE video_id = ?1"),
                params![video_id],
                row_to_summary,
            )
            .optional()?;
        Ok(summary)
    }

    #[instrument(skip(self, message, response))]
    async fn add_chat_message(
        &self,
        video_id: &str,
        session_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ChatMessage> {
        let mut conn = self.lock()?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let latest: Option<String> = tx.query_row(
            "SELECT MAX(created_at) FROM chat_history WHERE video_id = ?1",
            params![video_id],
            |row| row.get(0),
        )?;
        let latest = latest.map(|s| parse_datetime(&s, 0)).transpose()?;
        let created_at = next_timestamp(latest);

        tx.execute(
            r#"
            INSERT INTO chat_history (video_id, session_id, message, response, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                video_id,
                session_id,
                message,
                response,
                format_datetime(&created_at)
            ],
        )
        .map_err(|e| YtsumError::from_insert(e, "chat message", video_id))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let entry = conn.query_row(
            &format!("SELECT {CHAT_COLUMNS} FROM chat_history WHERE id = ?1"),
            params![id],
            row_to_chat,
        )?;

        debug!("Appended chat message {}", entry.id);
        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn get_chat_history(
        &self,
        video_id: &str,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {CHAT_COLUMNS} FROM chat_history
            WHERE video_id = ?1 AND session_id = ?2
            ORDER BY created_at DESC, id DESC
            LIMIT ?3
            "#
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![video_id, session_id, limit], row_to_chat)?;
        let history = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Found {} chat messages", history.len());
        Ok(history)
    }

    async fn get_video_chat_history(&self, video_id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {CHAT_COLUMNS} FROM chat_history WHERE video_id = ?1 ORDER BY created_at, id"
        ))?;

        let rows = stmt.query_map(params![video_id], row_to_chat)?;
        let history = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(history)
    }

    async fn list_videos(&self) -> Result<Vec<Video>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map([], row_to_video)?;
        let videos = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;

    #[tokio::test]
    async fn test_video_roundtrip() {
        let store = SqliteArtifactStore::in_memory().unwrap();
        contract::video_roundtrip(&store).await;
    }

    #[tokio::test]
    async fn test_one_transcript_and_summary() {
        let store = SqliteArtifactStore::in_memory().unwrap();
        contract::one_transcript_and_summary(&store).await;
    }

    #[tokio::test]
    async fn test_unknown_video_rejected() {
        let store = SqliteArtifactStore::in_memory().unwrap();
        contract::unknown_video_rejected(&store).await;

        // Nothing was written by the failed inserts.
        let conn = store.lock().unwrap();
        for table in ["transcripts", "summaries", "chat_history"] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0, "{table} should be empty");
        }
    }

    #[tokio::test]
    async fn test_chat_history_ordering() {
        let store = SqliteArtifactStore::in_memory().unwrap();
        contract::chat_history_ordering(&store).await;
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = SqliteArtifactStore::in_memory().unwrap();
        contract::list_newest_first(&store).await;
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ytsum.db");

        {
            let store = SqliteArtifactStore::new(&path).unwrap();
            store.create_video(&contract::new_video("abc123")).await.unwrap();
            store
                .create_summary(&NewSummary::new("abc123", "short summary"))
                .await
                .unwrap();
            store.add_chat_message("abc123", "s1", "q", "a").await.unwrap();
        }

        let store = SqliteArtifactStore::new(&path).unwrap();
        assert!(store.video_exists("abc123").await.unwrap());
        assert_eq!(
            store.get_summary("abc123").await.unwrap().unwrap().text,
            "short summary"
        );
        assert_eq!(store.get_chat_history("abc123", "s1", 10).await.unwrap().len(), 1);
    }

    #[test]
    fn test_unreachable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let plain_file = dir.path().join("plainfile");
        std::fs::write(&plain_file, b"not a directory").unwrap();

        let err = SqliteArtifactStore::new(&plain_file.join("ytsum.db")).err().unwrap();
        assert!(matches!(err, YtsumError::StorageUnavailable(_)), "got {err}");

        let err = SqliteArtifactStore::new(dir.path()).err().unwrap();
        assert!(matches!(err, YtsumError::StorageUnavailable(_)), "got {err}");
    }

    #[tokio::test]
    async fn test_returned_record_matches_stored_row() {
        let store = SqliteArtifactStore::in_memory().unwrap();
        store.create_video(&contract::new_video("vid")).await.unwrap();

        let entry = store.add_chat_message("vid", "s1", "q", "a").await.unwrap();
        let stored = store.get_chat_history("vid", "s1", 1).await.unwrap();
        assert_eq!(stored, vec![entry]);
    }
}
