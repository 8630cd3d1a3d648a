//! History command - recent chat turns of a session.

use super::video_id_arg;
use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use anyhow::Result;

/// Run the history command.
pub async fn run_history(
    video: &str,
    session: &str,
    limit: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let video_id = video_id_arg(video)?;
    let library = Library::new(settings)?;

    let turns = library.get_chat_history(&video_id, session, limit).await?;
    if turns.is_empty() {
        Output::info(&format!("No chat history for session {} of {}", session, video_id));
        return Ok(());
    }

    Output::header(&format!("Chat history ({} turns, newest first)", turns.len()));
    for turn in &turns {
        Output::chat_turn(turn);
    }

    Ok(())
}
