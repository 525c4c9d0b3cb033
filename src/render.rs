//! TUI rendering traits for licitacoes types.
//!
//! Extension traits that add colored terminal rendering to licitacoes-core
//! types using owo_colors.

use licitacoes_core::format::{format_data, format_hora, format_valor};
use licitacoes_core::{Agenda, DateGroup, Evento};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

fn hora_label(evento: &Evento) -> String {
    match evento.payload.hora.as_deref().map(format_hora) {
        Some(h) if !h.is_empty() => format!("{:>5}", h),
        _ => "--:--".to_string(),
    }
}

impl Render for Evento {
    fn render(&self) -> String {
        let modalidade = self
            .payload
            .modalidade
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default();

        format!(
            "  {} {} {} {} {}",
            hora_label(self),
            self.payload.orgao.bold(),
            modalidade.dimmed(),
            format_valor(self.payload.valor_estimado).green(),
            format!("[{}]", self.id).dimmed()
        )
    }
}

impl Render for DateGroup {
    fn render(&self) -> String {
        let mut lines = vec![self.label.bold().to_string()];
        lines.extend(self.eventos.iter().map(|e| e.render()));
        lines.join("\n")
    }
}

/// "Próxima Licitação" banner, or None when nothing is upcoming.
pub fn render_proxima(agenda: &Agenda) -> Option<String> {
    let next = agenda.next()?;
    let data = next.data().map(format_data).unwrap_or_default();
    let hora = next
        .payload
        .hora
        .as_deref()
        .map(format_hora)
        .filter(|h| !h.is_empty())
        .unwrap_or("hora não definida");

    Some(format!(
        "{} {} - {} às {} | {}",
        "Próxima Licitação:".blue().bold(),
        next.payload
            .modalidade
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default(),
        data,
        hora,
        next.payload.orgao
    ))
}

/// Every field of a record, one per line.
pub fn render_detail(evento: &Evento) -> String {
    let p = &evento.payload;
    let rows = [
        ("id", evento.id.clone()),
        (
            "modalidade",
            p.modalidade.as_ref().map(|m| m.to_string()).unwrap_or_default(),
        ),
        ("data", p.data.map(format_data).unwrap_or_default()),
        ("hora", p.hora.as_deref().map(format_hora).unwrap_or_default().to_string()),
        ("órgão", p.orgao.clone()),
        ("objeto", p.objeto.clone()),
        ("valor estimado", format_valor(p.valor_estimado)),
        ("valor ideal", format_valor(p.valor_ideal)),
        ("observações", p.observacoes.clone().unwrap_or_default()),
        ("arquivo", p.arquivo_url.clone().unwrap_or_default()),
    ];

    rows.iter()
        .map(|(label, value)| format!("{:>15}  {}", label.dimmed(), value))
        .collect::<Vec<_>>()
        .join("\n")
}
