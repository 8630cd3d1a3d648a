//! CLI output formatting utilities.

use crate::store::{format_datetime, ChatMessage, Video};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one line per stored video.
    pub fn video_info(video: &Video) {
        println!(
            "  {} {} ({}, {}, added {})",
            style("*").cyan(),
            style(&video.title).bold(),
            style(&video.id).dim(),
            video.author,
            format_datetime(&video.created_at)
        );
    }

    /// Print one chat turn.
    pub fn chat_turn(turn: &ChatMessage) {
        println!(
            "\n{} {}",
            style(format_datetime(&turn.created_at)).dim(),
            style(&turn.session_id).cyan()
        );
        println!("  {} {}", style("you:").bold(), turn.message);
        println!("  {} {}", style("bot:").green().bold(), turn.response);
    }

    /// Print search result.
    pub fn search_result(title: &str, author: &str, score: f32, summary: &str, url: &str) {
        println!(
            "\n{} {} by {} (score: {:.2})",
            style(">>").green(),
            style(title).bold(),
            author,
            score
        );
        println!("   {}", content_preview(summary, 200));
        println!("   {}", style(url).dim());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
pub(crate) fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_chars) {
        None => content,
        Some((idx, _)) => format!("{}...", &content[..idx]),
    }
}
