use anyhow::Result;
use chrono::Local;
use licitacoes_core::config::LicitacoesConfig;
use licitacoes_core::{Agenda, DataService, Evento, LicitacaoError};

use crate::render::render_detail;
use crate::utils::tui::create_spinner;

pub async fn run(service: &dyn DataService, config: &LicitacoesConfig, id: &str) -> Result<()> {
    let evento = fetch_one(service, config, id).await?;
    println!("{}", render_detail(&evento));
    Ok(())
}

/// Load the agenda and pick one record out of it.
pub async fn fetch_one(
    service: &dyn DataService,
    config: &LicitacoesConfig,
    id: &str,
) -> Result<Evento> {
    let spinner = create_spinner("Buscando licitação...");
    let agenda = Agenda::fetch(service, &config.collection, Local::now().date_naive()).await;
    spinner.finish_and_clear();

    agenda?
        .find(id)
        .cloned()
        .ok_or_else(|| LicitacaoError::NotFound(id.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use licitacoes_core::EventoPayload;
    use licitacoes_core::service::MemoryService;

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let service = MemoryService::with_eventos(
            "eventos",
            vec![Evento::new("a", EventoPayload::default())],
        );
        let config = LicitacoesConfig::default();

        assert_eq!(fetch_one(&service, &config, "a").await.unwrap().id, "a");

        let err = fetch_one(&service, &config, "b").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LicitacaoError>(),
            Some(LicitacaoError::NotFound(id)) if id == "b"
        ));
    }
}
