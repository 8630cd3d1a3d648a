//! Log command - record a chat turn about a video.

use super::video_id_arg;
use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use anyhow::Result;

/// Run the log command. A fresh session id is generated when none is given.
pub async fn run_log(
    video: &str,
    message: &str,
    response: &str,
    session: Option<String>,
    settings: Settings,
) -> Result<()> {
    let video_id = video_id_arg(video)?;
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let library = Library::new(settings)?;
    let turn = library
        .add_chat_message(&video_id, &session_id, message, response)
        .await?;

    Output::success(&format!("Recorded chat turn #{} for {}", turn.id, video_id));
    Output::kv("Session", &turn.session_id);

    Ok(())
}
