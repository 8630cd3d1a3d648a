//! Doctor command - verify configuration, credentials and storage.

use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::embedding::select_embedder;
use crate::store::{ArtifactStore, SqliteArtifactStore};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("ytsum Doctor");
    println!();

    let credentials = Credentials::from_env();
    let mut checks = Vec::new();

    let mut section = |title: &str, results: Vec<CheckResult>| {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    };

    section("API Configuration", check_credentials(&credentials));
    section("Directories", check_directories(settings));
    section("Database", vec![check_database(settings).await]);
    section("Embeddings", vec![check_embeddings(settings, &credentials)]);
    section("Configuration", vec![check_config_file()]);

    println!("{}", style("Models").bold());
    Output::kv("Provider", &settings.models.provider);
    Output::kv("Transcription", &settings.models.transcription);
    Output::kv("Summary", &settings.models.summary);
    Output::kv("Environment", &settings.general.environment.to_string());
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found. Please fix them before using ytsum.", errors));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! ytsum is ready to use.");
    }

    Ok(())
}

fn check_credentials(credentials: &Credentials) -> Vec<CheckResult> {
    let key = |name: &str, value: &Option<String>, hint: &str| match value {
        Some(v) => CheckResult::ok(name, &format!("configured ({})", mask_key(v))),
        None => CheckResult::warning(name, "not set", hint),
    };

    vec![
        key(
            "GROQ_API_KEY",
            &credentials.groq_api_key,
            "Needed upstream for transcription and summarization",
        ),
        key(
            "NVIDIA_API_KEY",
            &credentials.nvidia_api_key,
            "Optional; search falls back to HuggingFace embeddings",
        ),
        key(
            "HF_TOKEN",
            &credentials.huggingface_token,
            "Optional; anonymous HuggingFace requests are rate limited",
        ),
    ]
}

fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    settings
        .paths()
        .into_iter()
        .map(|(name, dir)| {
            if dir.is_dir() {
                CheckResult::ok(name, &dir.display().to_string())
            } else {
                CheckResult::warning(
                    name,
                    &format!("{} (missing)", dir.display()),
                    "Create with: ytsum init",
                )
            }
        })
        .collect()
}

async fn check_database(settings: &Settings) -> CheckResult {
    let db_path = settings.database_path();
    if !db_path.exists() {
        return CheckResult::warning(
            "Database",
            &format!("{} (not created yet)", db_path.display()),
            "Create with: ytsum init",
        );
    }

    let opened = match SqliteArtifactStore::new(&db_path) {
        Ok(store) => store.list_videos().await,
        Err(e) => Err(e),
    };
    match opened {
        Ok(videos) => {
            let size = std::fs::metadata(&db_path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            CheckResult::ok(
                "Database",
                &format!("{} ({}, {} videos)", db_path.display(), size, videos.len()),
            )
        }
        Err(e) => CheckResult::error(
            "Database",
            &format!("cannot open {}: {}", db_path.display(), e),
            "Check file permissions or restore from a backup",
        ),
    }
}

fn check_embeddings(settings: &Settings, credentials: &Credentials) -> CheckResult {
    let selected = select_embedder(&settings.embedding, credentials);
    let message = format!("{} ({} dimensions)", selected.provider, selected.embedder.dimensions());
    match selected.provider {
        crate::embedding::EmbeddingProvider::Fallback => CheckResult::warning(
            "Provider",
            &message,
            "Search results will be empty without a working embedding provider",
        ),
        _ => CheckResult::ok("Provider", &message),
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: ytsum init (or ytsum config edit)",
        )
    }
}

/// Show the first and last few characters of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("gsk_abcdefghijklmnop"), "gsk_...mnop");
    }

    #[test]
    fn test_missing_credentials_are_warnings() {
        let checks = check_credentials(&Credentials::default());
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| c.status == CheckStatus::Warning));
        assert_eq!(checks[0].name, "GROQ_API_KEY");
        assert_eq!(checks[0].message, "not set");
    }

    #[tokio::test]
    async fn test_database_check() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.database.path = dir.path().join("ytsum.db").display().to_string();

        assert_eq!(check_database(&settings).await.status, CheckStatus::Warning);

        SqliteArtifactStore::new(&settings.database_path()).unwrap();
        assert_eq!(check_database(&settings).await.status, CheckStatus::Ok);
    }
}
