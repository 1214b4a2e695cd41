//! # Canopy - browser desktop window manager
//!
//! Command-line driver for the window manager core. It loads the
//! configuration, opens the tenant's workspace, optionally replays a session
//! script and prints the resulting desktop state as JSON.

use anyhow::{Context, Result};
use canopy::config::{expand_home, CanopyConfig};
use canopy::script::{self, ScriptRunner};
use canopy::{Desktop, JsonFileStore, MemoryStore, Viewport, WorkspaceStore};
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Headless window manager core for a browser-hosted desktop")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/canopy/canopy.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Session script (JSON array of commands) to replay
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Tenant whose workspace is loaded and saved
    #[arg(short, long)]
    tenant: Option<String>,

    /// Directory holding per-tenant workspace files
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Viewport size as WIDTHxHEIGHT, e.g. 1440x900
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<(u32, u32)>,

    /// Skip minimize/restore animations
    #[arg(long)]
    reduced_motion: bool,
}

fn parse_viewport(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = width.trim().parse().map_err(|e| format!("invalid width: {}", e))?;
    let height = height.trim().parse().map_err(|e| format!("invalid height: {}", e))?;
    Ok((width, height))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("🚀 Starting Canopy");
    info!(
        "📄 Version: {} (built {}, commit {})",
        canopy::VERSION,
        env!("BUILD_DATE"),
        option_env!("GIT_COMMIT").unwrap_or("unknown")
    );

    // Load configuration
    let mut config = match CanopyConfig::load(&cli.config) {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            CanopyConfig::default()
        }
    };

    // Override config with CLI flags
    if let Some(tenant) = cli.tenant {
        config.workspace.tenant = tenant;
    }
    if let Some(dir) = cli.store_dir {
        config.workspace.store_dir = Some(dir);
    }
    if let Some((width, height)) = cli.viewport {
        config.viewport.width = width;
        config.viewport.height = height;
    }
    if cli.reduced_motion {
        config.animation.reduced_motion = true;
        info!("🐢 Reduced motion enabled via CLI flag");
    }
    config.validate().context("Invalid configuration after CLI overrides")?;

    let store: Box<dyn WorkspaceStore> = match &config.workspace.store_dir {
        Some(dir) => {
            let dir = expand_home(dir)?;
            let store = JsonFileStore::for_tenant(&dir, &config.workspace.tenant);
            info!("📂 Workspace file: {}", store.path().display());
            Box::new(store)
        }
        None => {
            warn!("No store directory configured, workspace will not be persisted");
            Box::new(MemoryStore::new())
        }
    };

    let viewport: Viewport = config.viewport.to_viewport();
    let mut desktop = Desktop::from_config(config, store);
    desktop.restore_layout();

    let mut runner = ScriptRunner::new(Instant::now());
    if let Some(path) = &cli.script {
        let commands = script::load(path)?;
        runner.run(&mut desktop, &commands);
        desktop.persist();
    }

    info!(
        "🪟 {} windows open on a {}x{} viewport",
        desktop.window_manager().len(),
        viewport.width,
        viewport.height
    );

    let state = desktop.state(runner.now());
    println!(
        "{}",
        serde_json::to_string_pretty(&state).context("Failed to serialize desktop state")?
    );

    desktop.shutdown();
    Ok(())
}
