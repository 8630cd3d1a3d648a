//! Configuration module for ytsum.
//!
//! Handles loading application settings and API credentials.

mod settings;

pub use settings::{
    ChatSettings, Credentials, DatabaseSettings, EmbeddingSettings, Environment,
    GeneralSettings, ModelSettings, RetrievalSettings, ServerSettings, Settings,
};
