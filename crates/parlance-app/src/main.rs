//! Parlance application binary - composition root.
//!
//! Ties together all Parlance crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open storage (JSON record stores + SQLite check-in database)
//! 3. Build the tool registry and session manager
//! 4. Run a console conversation loop against the keyword rule model
//!
//! The console loop stands in for a hosted voice pipeline: each line of
//! input plays the role of one speech-to-text transcript, and each reply is
//! the text that would be handed to text-to-speech.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use parlance_agent::{
    AgentSession, BrowseProducts, CaptureLead, GetLastOrder, GetOrderHistory, KeywordModel,
    LogCheckIn, PlaceOrder, SessionManager, ToolRegistry,
};
use parlance_core::ParlanceConfig;
use parlance_store::{
    default_catalog, Catalog, CheckInRepository, Database, LeadStore, OrderStore,
};

mod cli;

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = ParlanceConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG wins, then --log-level, then the config file.
    let log_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Parlance v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = args
        .resolve_data_dir()
        .map(|d| resolve_data_dir(&d))
        .unwrap_or_else(|| resolve_data_dir(&config.general.data_dir));
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    // A catalog.json in the data directory overrides the built-in demo
    // catalog.
    let catalog_path = data_dir.join("catalog.json");
    let catalog = if catalog_path.exists() {
        let catalog = Catalog::load(&catalog_path)?;
        tracing::info!(path = %catalog_path.display(), products = catalog.len(), "Catalog loaded");
        Arc::new(catalog)
    } else {
        Arc::new(default_catalog())
    };

    let orders = Arc::new(OrderStore::new(data_dir.join(&config.store.orders_file)));
    let leads = Arc::new(LeadStore::new(data_dir.join(&config.store.leads_file)));

    let db_path = data_dir.join(&config.store.checkins_db);
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");
    let checkins = Arc::new(CheckInRepository::new(db));

    // Tool registry and session manager.
    let sessions = Arc::new(SessionManager::new());
    let mut registry = ToolRegistry::new(sessions);
    registry.register(Arc::new(BrowseProducts::new(Arc::clone(&catalog))));
    registry.register(Arc::new(PlaceOrder::new(
        Arc::clone(&catalog),
        Arc::clone(&orders),
    )));
    registry.register(Arc::new(GetLastOrder::new(Arc::clone(&orders))));
    registry.register(Arc::new(GetOrderHistory::new(
        orders,
        config.agent.history_limit,
    )));
    registry.register(Arc::new(CaptureLead::new(leads)));
    registry.register(Arc::new(LogCheckIn::new(checkins)));
    let registry = Arc::new(registry);
    tracing::info!(tools = ?registry.tool_names(), "Tool registry ready");

    // The offline keyword model drives the console demo; a hosted model
    // plugs in through the same LanguageModel seam.
    tracing::info!(
        stt = %config.voice.stt_model,
        llm = %config.voice.llm_model,
        tts = %config.voice.tts_voice,
        "Voice pipeline configured (console mode, keyword model)"
    );
    let model = Arc::new(KeywordModel::new(Arc::clone(&catalog)));

    let mut session = AgentSession::new(
        Arc::clone(&registry),
        model,
        config.agent.greeting.clone(),
        config.agent.reply_chunk_chars,
    );

    println!("{}", session.greet());
    println!("(type 'quit' to end the session)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match session.handle_transcript(&line).await {
            Ok(reply) => println!("{}", reply),
            Err(e) => {
                tracing::warn!(error = %e, "Turn failed");
                println!("Sorry, something went wrong. Could you say that again?");
            }
        }
    }

    session.end();
    tracing::info!("Session closed");
    Ok(())
}
