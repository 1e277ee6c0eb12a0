//! VozDoc binary - composition root.
//!
//! Loads configuration, initializes tracing, opens the JSON stores and
//! runs the voice-driven pages over the console recognition backend:
//! dashboard first, then whichever workspace the user opens, and back.

use std::io;
use std::path::PathBuf;

use vozdoc_app::console;
use vozdoc_app::controllers::Page;
use vozdoc_app::export::{resolve_data_dir, WordFileExporter};
use vozdoc_core::config::VozdocConfig;
use vozdoc_storage::{DocumentStore, DraftStore};

/// Resolve the config file path (VOZDOC_CONFIG env, or ~/.vozdoc/config.toml).
fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("VOZDOC_CONFIG") {
        return PathBuf::from(path);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".vozdoc").join("config.toml");
    }
    PathBuf::from("config.toml")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_file = config_path();
    let config = VozdocConfig::load_or_default(&config_file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .init();

    tracing::info!("Starting VozDoc v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let data_dir = resolve_data_dir(&config.storage.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    tracing::info!(path = %data_dir.display(), "Data directory ready");

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        let drafts = DraftStore::open(&data_dir, config.storage.draft_limit);
        let Some(page) = console::run_dashboard(&mut input, &config, drafts)? else {
            break;
        };
        match page {
            Page::DocumentEditor => {
                let store = DocumentStore::open(&data_dir, config.storage.document_limit);
                let exporter = WordFileExporter::new(data_dir.join("exports"));
                console::run_document_editor(&mut input, &config, store, exporter)?;
            }
            Page::MailComposer => {
                let drafts = DraftStore::open(&data_dir, config.storage.draft_limit);
                console::run_mail_composer(&mut input, &config, drafts)?;
            }
        }
    }

    tracing::info!("VozDoc stopped");
    Ok(())
}
