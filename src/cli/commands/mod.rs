//! CLI command implementations.

mod config;
mod doctor;
mod history;
mod init;
mod list;
mod log;
mod search;
mod serve;
mod show;
mod store;

pub use config::run_config;
pub use doctor::run_doctor;
pub use history::run_history;
pub use init::run_init;
pub use list::run_list;
pub use log::run_log;
pub use search::run_search;
pub use serve::{router, run_serve, AppState};
pub use show::run_show;
pub use store::run_store;

use crate::youtube::resolve_video_id;

/// Resolve a URL or ID argument, failing with a readable message.
pub(crate) fn video_id_arg(input: &str) -> anyhow::Result<String> {
    resolve_video_id(input)
        .ok_or_else(|| anyhow::anyhow!("Not a YouTube URL or video ID: '{}'", input))
}
