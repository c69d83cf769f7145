use std::path::Path;

use clap::Parser;
use credgate::cli::{Cli, Commands, ConfigAction};
use credgate::config::GateConfig;
use credgate::gate::GateServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            cmd_start(&cli.config).await?;
        }
        Commands::Init => {
            cmd_init(&cli.config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(&cli.config)?,
        },
    }

    Ok(())
}

async fn cmd_start(config_path: &Path) -> anyhow::Result<()> {
    let config = GateConfig::load_from_path(config_path)?;
    println!("credgate starting...");
    println!("Config: {}", config_path.display());
    println!("Listen: {}", config.server.listen);
    println!("Origin: {}", config.origin.url);
    if config.lookup.auth.is_none() {
        println!("Warning: no lookup auth credential configured; all requests forward as no-match");
    }

    let server = GateServer::new(config);
    let addr = server.start().await?;
    println!("Gate running on {}", addr);
    println!("Point login clients at http://{} to enable leak detection", addr);

    // Keep running until interrupted
    tokio::signal::ctrl_c().await?;
    println!("\nShutting down...");
    Ok(())
}

fn cmd_init(config_path: &Path) -> anyhow::Result<()> {
    println!("Initializing credgate...");

    if !config_path.exists() {
        let default_config = include_str!("../templates/default.toml");
        std::fs::write(config_path, default_config)?;
        println!("  Created config: {}", config_path.display());
    } else {
        println!("  Config already exists: {}", config_path.display());
    }

    println!("\nDone! Next steps:");
    println!("  1. Edit {} (origin URL, field paths)", config_path.display());
    println!("  2. Export the lookup credential: CREDGATE_AUTH_TOKEN=...");
    println!("  3. Start the gate: credgate start");
    Ok(())
}

fn cmd_config_show(config_path: &Path) -> anyhow::Result<()> {
    let config = GateConfig::load_from_path(config_path)?;
    println!("Current configuration ({})", config_path.display());
    println!("═══════════════════════════════════════");
    println!("Listen:           {}", config.server.listen);
    println!("Origin:           {}", config.origin.url);
    println!("Username path:    {}", config.credentials.username_path);
    println!("Password path:    {}", config.credentials.password_path);
    println!(
        "Min lengths:      username {}, password {}",
        config.credentials.min_username_len, config.credentials.min_password_len
    );
    println!("Lookup URL:       {}", config.lookup.url);
    println!("Algorithm:        {:?}", config.lookup.algorithm);
    println!(
        "Auth credential:  {}",
        if config.lookup.auth.is_some() {
            "set (elided)"
        } else {
            "unset (lookups skipped)"
        }
    );
    println!("Report URL:       {}", config.report.url);
    println!("Detection header: {}", config.detection.header);
    Ok(())
}
