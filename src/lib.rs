//! ytsum - YouTube Summary Library
//!
//! Durable storage and retrieval for YouTube video summaries, transcripts
//! and the chat turns recorded about them.
//!
//! # Overview
//!
//! The upstream pipeline (download, transcription, summarization) produces a
//! [`summary::VideoSummary`] bundle per video. ytsum:
//! - stores it idempotently: the first transcript and summary for a video win
//! - reads it back as one [`summary::StoredSummary`] record
//! - appends and lists chat history per video and session
//! - searches stored summaries by embedding similarity
//!
//! # Architecture
//!
//! - `config` - Settings and credentials
//! - `store` - Artifact store trait with SQLite and in-memory backends
//! - `summary` - Bundle persistence and read-side assembly
//! - `embedding` - Embedding providers and selection
//! - `library` - Facade used by the CLI and HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use ytsum::config::Settings;
//! use ytsum::library::Library;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let library = Library::new(Settings::load()?)?;
//!
//!     if let Some(stored) = library.get_stored_summary("dQw4w9WgXcQ").await? {
//!         println!("{}: {:?}", stored.title, stored.summary);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod library;
pub mod openai;
pub mod store;
pub mod summary;
pub mod youtube;

pub use error::{Result, YtsumError};
