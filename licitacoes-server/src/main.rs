mod form;
mod routes;
mod state;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use licitacoes_core::DataService;
use licitacoes_core::config::LicitacoesConfig;
use licitacoes_core::service::MemoryService;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "licitacoes-server")]
#[command(about = "Serve the licitações dashboard")]
struct Args {
    /// Address to listen on (overrides `listen` in config.toml)
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Keep events in memory instead of talking to the hosted backend
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = LicitacoesConfig::load()?;

    let service: Arc<dyn DataService> = if args.offline {
        tracing::warn!("running offline; events are kept in memory only");
        Arc::new(MemoryService::new())
    } else {
        Arc::new(config.supabase()?)
    };

    let addr = match args.listen {
        Some(addr) => addr,
        None => config
            .listen
            .parse()
            .with_context(|| format!("Invalid listen address '{}'", config.listen))?,
    };

    let app = routes::app(AppState::new(config, service)?);

    tracing::info!("licitacoes-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
