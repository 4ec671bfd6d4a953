//! pirwatch - motion-session sensor node
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use pirwatch::headless::HeadlessEvent;
use pirwatch::RunOptions;
use pirwatch_app::config::{
    default_config_path, default_store_path, init_config_file, load_settings,
};
use pirwatch_core::prelude::*;

/// pirwatch - motion-session sensor node with rate-limited notifications
#[derive(Parser, Debug)]
#[command(name = "pirwatch")]
#[command(about = "Motion-session sensor node with rate-limited notifications", long_about = None)]
struct Args {
    /// Node settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Persisted sensor settings file (overrides storage.path)
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,

    /// Write a commented default settings file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install().map_err(|e| Error::runtime(e.to_string()))?;
    pirwatch_core::logging::init()?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);

    if args.init_config {
        init_config_file(&config_path).context("writing default settings")?;
        eprintln!("✅ Settings file ready at {}", config_path.display());
        return Ok(());
    }

    // An explicitly named file must exist; the default location is optional
    if args.config.is_some() && !config_path.exists() {
        eprintln!("❌ Config file not found: {}", config_path.display());
        return Err(Error::ConfigNotFound { path: config_path });
    }

    let settings = load_settings(&config_path);
    if let Err(e) = settings.validate() {
        eprintln!("❌ {}", e);
        HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
        return Err(e);
    }

    let store_path = args
        .store
        .or_else(|| settings.storage.path.clone())
        .unwrap_or_else(default_store_path);

    pirwatch::run_headless(RunOptions {
        settings,
        store_path,
        max_ticks: args.ticks,
    })
    .await
}
