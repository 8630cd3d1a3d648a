//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let library = Library::new(settings)?;
    let videos = library.list_videos().await?;

    if videos.is_empty() {
        Output::info("No videos stored yet. Use 'ytsum store <bundle.json>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Stored Videos ({})", videos.len()));
    println!();
    for video in &videos {
        Output::video_info(video);
    }

    Ok(())
}
