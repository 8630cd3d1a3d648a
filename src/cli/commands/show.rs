//! Show command - everything stored for one video.

use super::video_id_arg;
use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use crate::summary::StoredSummary;
use anyhow::Result;
use console::style;

/// Run the show command.
pub async fn run_show(video: &str, json: bool, transcript: bool, settings: Settings) -> Result<()> {
    let video_id = video_id_arg(video)?;
    let library = Library::new(settings)?;

    let Some(stored) = library.get_stored_summary(&video_id).await? else {
        anyhow::bail!("Video not found: {}", video_id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
    } else {
        print_stored(&stored);
    }

    if transcript {
        match library.store().get_transcript(&video_id).await? {
            Some(t) => {
                println!("\n{}", style("Full transcript").bold());
                println!("{}", t.format_with_timestamps().unwrap_or(t.text));
            }
            None => Output::warning(&format!("No transcript stored for {}", video_id)),
        }
    }

    Ok(())
}

fn print_stored(stored: &StoredSummary) {
    Output::header(&stored.title);
    Output::kv("ID", &stored.video_id);
    Output::kv("Author", &stored.author);
    Output::kv("URL", &stored.url);
    for (label, path) in [
        ("Audio", &stored.audio_path),
        ("Video", &stored.video_path),
        ("Transcript file", &stored.transcript_path),
    ] {
        if let Some(path) = path {
            Output::kv(label, path);
        }
    }

    println!("\n{}", style("Summary").bold());
    match &stored.summary {
        Some(summary) => println!("{}", summary),
        None => println!("{}", style("(none)").dim()),
    }

    println!("\n{}", style("Transcript").bold());
    match &stored.transcript_text {
        Some(text) => println!("{} characters", text.chars().count()),
        None => println!("{}", style("(none)").dim()),
    }

    if !stored.chat_history.is_empty() {
        println!("\n{}", style(format!("Chat ({} turns)", stored.chat_history.len())).bold());
        for entry in &stored.chat_history {
            println!("  {} {}", style(&entry.created_at).dim(), entry.message);
            println!("    {}", entry.response);
        }
    }
}
