//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::store::SqliteArtifactStore;
use console::style;

/// Create the data directories, the database and (if missing) the config file.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("ytsum Setup");
    println!();

    println!("{}", style("Step 1: Directories").bold().cyan());
    let missing: Vec<_> = settings
        .paths()
        .into_iter()
        .filter(|(_, dir)| !dir.exists())
        .collect();
    settings.initialize()?;
    for (name, dir) in settings.paths() {
        if missing.iter().any(|(m, _)| *m == name) {
            Output::success(&format!("Created {}: {}", name, dir.display()));
        } else {
            Output::info(&format!("{} exists: {}", name, dir.display()));
        }
    }

    println!();
    println!("{}", style("Step 2: Database").bold().cyan());
    let db_path = settings.database_path();
    SqliteArtifactStore::new(&db_path)?;
    Output::success(&format!("Database ready: {}", db_path.display()));

    println!();
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    }

    println!();
    println!("{}", style("Step 4: Credentials").bold().cyan());
    let credentials = Credentials::from_env();
    if credentials.groq_api_key.is_none() {
        Output::warning("GROQ_API_KEY is not set; upstream transcription and summarization will fail.");
    } else {
        Output::success("GROQ_API_KEY is configured.");
    }
    if credentials.nvidia_api_key.is_none() {
        Output::info("NVIDIA_API_KEY is not set; search will use HuggingFace embeddings.");
    }

    println!();
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("ytsum doctor").cyan());
    println!("  {} Store a summary bundle", style("ytsum store <bundle.json>").cyan());
    println!("  {} Browse stored videos", style("ytsum list").cyan());

    Ok(())
}
