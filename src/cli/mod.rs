//! CLI module for ytsum.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// ytsum - YouTube Summary Library
///
/// Store YouTube video summaries and transcripts, browse them, record chat
/// turns about them and search across them.
#[derive(Parser, Debug)]
#[command(name = "ytsum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create data directories and the database
    Init,

    /// Check configuration, credentials and storage
    Doctor,

    /// Store a summary bundle (JSON) produced by the pipeline
    Store {
        /// Path to the bundle file, or '-' for stdin
        input: String,
    },

    /// Show everything stored for a video
    Show {
        /// YouTube URL or video ID
        video: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,

        /// Also print the full transcript, with timestamps when available
        #[arg(short, long)]
        transcript: bool,
    },

    /// List stored videos
    List,

    /// Record a chat turn about a video
    Log {
        /// YouTube URL or video ID
        video: String,

        /// The user's message
        #[arg(short, long)]
        message: String,

        /// The assistant's response
        #[arg(short, long)]
        response: String,

        /// Chat session ID (a new one is generated if omitted)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show recent chat turns of a session, newest first
    History {
        /// YouTube URL or video ID
        video: String,

        /// Chat session ID
        session: String,

        /// Maximum number of turns (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search stored summaries
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log() {
        let cli = Cli::parse_from([
            "ytsum", "log", "abc123", "-m", "What is it about?", "-r", "Rust.", "-s", "s1",
        ]);
        match cli.command {
            Commands::Log {
                video,
                message,
                response,
                session,
            } => {
                assert_eq!(video, "abc123");
                assert_eq!(message, "What is it about?");
                assert_eq!(response, "Rust.");
                assert_eq!(session.as_deref(), Some("s1"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["ytsum", "-vv", "show", "abc123", "--json", "-c", "my.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("my.toml"));
        assert!(matches!(cli.command, Commands::Show { json: true, .. }));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
