use anyhow::Result;
use chrono::Local;
use licitacoes_core::config::LicitacoesConfig;
use licitacoes_core::{Agenda, DataService};
use owo_colors::OwoColorize;

use crate::render::{Render, render_proxima};
use crate::utils::tui::create_spinner;

pub async fn run(service: &dyn DataService, config: &LicitacoesConfig) -> Result<()> {
    let spinner = create_spinner("Buscando licitações...");
    let agenda = Agenda::fetch(service, &config.collection, Local::now().date_naive()).await;
    spinner.finish_and_clear();
    let agenda = agenda?;

    if agenda.is_empty() {
        println!("{}", "Nenhuma licitação agendada".dimmed());
        return Ok(());
    }

    if let Some(banner) = render_proxima(&agenda) {
        println!("{}\n", banner);
    }

    for (i, group) in agenda.groups().iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", group.render());
    }

    Ok(())
}
