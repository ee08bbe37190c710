//! rollcli - attendance client for the rollcall service
//!
//! Subcommands:
//! - `rollcli login` - Sign in to a portal and persist the session
//! - `rollcli attend` - Submit an attendance code with a still image
//! - `rollcli session` - Show the stored session
//! - `rollcli logout` - Clear the stored session
//! - `rollcli config` - Show the effective configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rollcall::Portal;
use rollconf::RollConfig;
use tracing_subscriber::EnvFilter;

mod camera;
mod commands;

#[derive(Parser)]
#[command(name = "rollcli")]
#[command(about = "Attendance client for the rollcall service")]
#[command(version)]
struct Cli {
    /// Config file to load instead of ./rollcall.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL, overriding config and environment
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to a portal and persist the session
    Login {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Portal to enter: admin, lecturer or student
        #[arg(short, long)]
        portal: Portal,

        /// Password; prompted interactively when absent
        #[arg(long, env = "ROLLCALL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Submit an attendance code with a still image
    Attend {
        /// Attendance code handed out in class
        #[arg(short, long)]
        code: String,

        /// Image file standing in for the camera frame
        #[arg(short, long)]
        image: PathBuf,
    },

    /// Show the stored session
    Session,

    /// Clear the stored session
    Logout,

    /// Show the effective configuration and where it came from
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = RollConfig::load_with_sources_from(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    // ROLLCALL_LOG wins over the configured filter
    let filter = EnvFilter::try_from_env("ROLLCALL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.diagnostics.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Login {
            user,
            portal,
            password,
        } => {
            commands::login(&config, &user, portal, password).await?;
        }
        Commands::Attend { code, image } => {
            commands::attend(&config, &code, image).await?;
        }
        Commands::Session => {
            commands::session(&config)?;
        }
        Commands::Logout => {
            commands::logout(&config)?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}
