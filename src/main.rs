mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use licitacoes_core::config::LicitacoesConfig;
use tracing::Level;
use tracing::level_filters::LevelFilter;

use crate::commands::EventoArgs;

#[derive(Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
        .into()
    }
}

#[derive(Parser)]
#[command(name = "licitacoes")]
#[command(about = "Consult and schedule public procurement events")]
struct Cli {
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the agenda grouped by date, with the next upcoming event on top
    List,
    /// Show every field of one event
    Show { id: String },
    /// Schedule a new event (prompts for missing required fields)
    New {
        #[command(flatten)]
        fields: EventoArgs,
    },
    /// Change an existing event
    Edit {
        id: String,

        #[command(flatten)]
        fields: EventoArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = LicitacoesConfig::load()?;
    let service = config.supabase()?;

    match cli.command {
        Commands::List => commands::list::run(&service, &config).await,
        Commands::Show { id } => commands::show::run(&service, &config, &id).await,
        Commands::New { fields } => commands::new::run(&service, &config, fields).await,
        Commands::Edit { id, fields } => {
            commands::edit::run(&service, &config, &id, fields).await
        }
    }
}
