use anyhow::Result;
use chrono::NaiveDate;
use dialoguer::{Input, Select};
use licitacoes_core::config::LicitacoesConfig;
use licitacoes_core::draft::parse_valor;
use licitacoes_core::{DataService, EventoDraft, Modalidade, save};
use owo_colors::OwoColorize;

use super::{EventoArgs, report};
use crate::utils::tui::create_spinner;

pub async fn run(
    service: &dyn DataService,
    config: &LicitacoesConfig,
    fields: EventoArgs,
) -> Result<()> {
    let mut draft = EventoDraft::default();
    fields.apply(&mut draft);
    let attachment = fields.attachment()?;

    let missing = missing_required(&draft);
    let interactive = !missing.is_empty();
    if interactive {
        prompt_missing(&mut draft, &missing)?;
        println!();
    }

    let spinner = create_spinner("Salvando...");
    let result = save(service, &config.save_target(), &draft, attachment.as_ref()).await;
    spinner.finish_and_clear();

    report(result)
}

/// Required fields the flags left blank, in form order.
fn missing_required(draft: &EventoDraft) -> Vec<&'static str> {
    [
        ("modalidade", &draft.modalidade),
        ("data", &draft.data),
        ("hora", &draft.hora),
        ("orgao", &draft.orgao),
        ("objeto", &draft.objeto),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect()
}

fn prompt_missing(draft: &mut EventoDraft, missing: &[&str]) -> Result<()> {
    for field in missing {
        match *field {
            "modalidade" => draft.modalidade = prompt_modalidade()?,
            "data" => {
                draft.data = prompt_with_retry("  Data (AAAA-MM-DD)", |input| {
                    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
                        .map(|_| ())
                        .map_err(|_| format!("Data inválida: \"{input}\""))
                })?
            }
            "hora" => {
                draft.hora = prompt_with_retry("  Hora (HH:MM)", |input| {
                    chrono::NaiveTime::parse_from_str(input.trim(), "%H:%M")
                        .map(|_| ())
                        .map_err(|_| format!("Hora inválida: \"{input}\""))
                })?
            }
            "orgao" => draft.orgao = prompt_required("  Órgão")?,
            "objeto" => draft.objeto = prompt_required("  Objeto")?,
            _ => {}
        }
    }

    if draft.valor_estimado.is_empty() {
        draft.valor_estimado = prompt_optional_valor("  Valor estimado (skip)")?;
    }

    Ok(())
}

fn prompt_modalidade() -> Result<String> {
    let mut items: Vec<String> = Modalidade::OPTIONS.iter().map(|m| m.to_string()).collect();
    items.push("Outra...".to_string());

    let selection = Select::new()
        .with_prompt("  Modalidade")
        .items(&items)
        .default(0)
        .interact()?;

    if selection < Modalidade::OPTIONS.len() {
        Ok(items[selection].clone())
    } else {
        prompt_required("  Qual modalidade?")
    }
}

fn prompt_required(prompt: &str) -> Result<String> {
    prompt_with_retry(prompt, |input| {
        if input.trim().is_empty() {
            Err("Campo obrigatório".to_string())
        } else {
            Ok(())
        }
    })
}

fn prompt_optional_valor(prompt: &str) -> Result<String> {
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .default(String::new())
            .show_default(false)
            .interact_text()?;
        match parse_valor(&input) {
            Ok(_) => return Ok(input),
            Err(e) => eprintln!("  {}", e.red()),
        }
    }
}

/// Prompt until `check` accepts the input.
fn prompt_with_retry<F>(prompt: &str, check: F) -> Result<String>
where
    F: Fn(&str) -> Result<(), String>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match check(&input) {
            Ok(()) => return Ok(input.trim().to_string()),
            Err(e) => eprintln!("  {}", e.red()),
        }
    }
}
