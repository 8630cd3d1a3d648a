//! Store command - persist a summary bundle.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use crate::summary::VideoSummary;
use anyhow::{Context, Result};
use std::io::Read;

/// Read a bundle from `input` (a path, or `-` for stdin) and store it.
pub async fn run_store(input: &str, settings: Settings) -> Result<()> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read bundle from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };

    let bundle: VideoSummary =
        serde_json::from_str(&raw).context("Bundle is not a valid summary JSON document")?;

    let library = Library::new(settings)?;
    let outcome = library.store_summary(&bundle).await?;
    let video_id = &bundle.media_info.video_id;

    if outcome.is_noop() {
        Output::info(&format!("Nothing new to store for {}", video_id));
        return Ok(());
    }

    Output::success(&format!("Stored {} ({})", bundle.media_info.title, video_id));
    let mark = |created: bool| if created { "created" } else { "unchanged" };
    Output::kv("Video", mark(outcome.video_created));
    Output::kv("Transcript", mark(outcome.transcript_created));
    Output::kv("Summary", mark(outcome.summary_created));

    Ok(())
}
