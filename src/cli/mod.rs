use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "credgate")]
#[command(about = "Inline credential-leak detection gate for login traffic")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "credgate.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gate server
    Start,
    /// Initialize credgate configuration
    Init,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the loaded configuration (auth credential elided)
    Show,
}
