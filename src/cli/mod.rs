pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::config::config;
use crate::error::ApiError;

#[derive(Parser)]
#[command(name = "personas")]
#[command(about = "Sistema de Gestión de Personas - command-line client")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Person records (dashboard)")]
    Personas {
        #[command(subcommand)]
        cmd: commands::personas::PersonaCommands,
    },

    #[command(about = "Gender and age breakdown of all personas")]
    Charts,

    #[command(about = "Audit trail viewer")]
    Audit {
        #[command(subcommand)]
        cmd: commands::audit::AuditCommands,
    },

    #[command(about = "Watch the session and report when it is invalidated")]
    Watch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let app = App::from_config(config(), matches!(cli.command, Commands::Watch))?;

    let result = dispatch(cli.command, &app, output_format.clone()).await;

    // JSON callers get the normalized error body instead of a bare message.
    if let (OutputFormat::Json, Err(e)) = (&output_format, &result) {
        if let Some(api_error) = e.downcast_ref::<ApiError>() {
            utils::output_api_error(&output_format, api_error)?;
        }
    }

    result
}

/// Whether `run` already wrote this error to stdout as a JSON body.
pub fn error_reported(json: bool, error: &anyhow::Error) -> bool {
    json && error.downcast_ref::<ApiError>().is_some()
}

pub async fn dispatch(command: Commands, app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, app, output_format).await,
        Commands::Personas { cmd } => commands::personas::handle(cmd, app, output_format).await,
        Commands::Charts => commands::charts::handle(app, output_format).await,
        Commands::Audit { cmd } => commands::audit::handle(cmd, app, output_format).await,
        Commands::Watch => commands::watch::handle(app, output_format).await,
    }
}
