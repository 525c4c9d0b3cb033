use anyhow::Result;
use licitacoes_core::config::LicitacoesConfig;
use licitacoes_core::{DataService, EventoDraft, save};

use super::{EventoArgs, report};
use crate::commands::show::fetch_one;
use crate::utils::tui::create_spinner;

pub async fn run(
    service: &dyn DataService,
    config: &LicitacoesConfig,
    id: &str,
    fields: EventoArgs,
) -> Result<()> {
    let evento = fetch_one(service, config, id).await?;

    let mut draft = EventoDraft::from_evento(&evento);
    fields.apply(&mut draft);
    let attachment = fields.attachment()?;

    let spinner = create_spinner("Salvando...");
    let result = save(service, &config.save_target(), &draft, attachment.as_ref()).await;
    spinner.finish_and_clear();

    report(result)
}
