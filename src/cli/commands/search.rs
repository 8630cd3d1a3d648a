//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use crate::youtube::watch_url;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: Option<usize>, settings: Settings) -> Result<()> {
    let library = Library::new(settings)?;

    let spinner = Output::spinner(&format!(
        "Searching with {} embeddings...",
        library.embedding_provider()
    ));
    let results = library.search(query, limit).await;
    spinner.finish_and_clear();

    let hits = match results {
        Ok(hits) => hits,
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if hits.is_empty() {
        Output::warning("No stored summaries match your query.");
        return Ok(());
    }

    Output::success(&format!("Found {} results", hits.len()));
    for hit in &hits {
        Output::search_result(
            &hit.title,
            &hit.author,
            hit.score,
            &hit.summary,
            &watch_url(&hit.video_id),
        );
    }

    Ok(())
}
