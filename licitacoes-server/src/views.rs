//! HTML pages rendered with tera.
//!
//! Templates are compiled into the binary. View structs carry display-ready
//! strings so templates never deal with nulls or number formatting.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use licitacoes_core::draft::ValidationErrors;
use licitacoes_core::format::{format_data, format_hora, format_valor};
use licitacoes_core::{Agenda, Evento, EventoDraft, Modalidade};

pub fn templates() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("dashboard.html", include_str!("../templates/dashboard.html")),
        ("not_found.html", include_str!("../templates/not_found.html")),
    ])?;
    Ok(tera)
}

#[derive(Serialize)]
struct EventoCard {
    id: String,
    orgao: String,
    objeto: String,
    modalidade: String,
    hora: String,
    valor_estimado: String,
}

impl EventoCard {
    fn from_evento(evento: &Evento) -> Self {
        let p = &evento.payload;
        EventoCard {
            id: evento.id.clone(),
            orgao: p.orgao.clone(),
            objeto: p.objeto.clone(),
            modalidade: p.modalidade.as_ref().map(|m| m.to_string()).unwrap_or_default(),
            hora: p
                .hora
                .as_deref()
                .map(format_hora)
                .filter(|h| !h.is_empty())
                .unwrap_or("Hora não definida")
                .to_string(),
            valor_estimado: format_valor(p.valor_estimado),
        }
    }
}

#[derive(Serialize)]
struct ProximaBanner {
    id: String,
    modalidade: String,
    data: String,
    hora: String,
    orgao: String,
}

#[derive(Serialize)]
struct GrupoView {
    label: String,
    eventos: Vec<EventoCard>,
}

/// The create/edit form as shown in the page.
#[derive(Serialize)]
pub struct FormView {
    title: &'static str,
    action: String,
    draft: EventoDraft,
    modalidades: Vec<String>,
    errors: HashMap<&'static str, String>,
    message: Option<String>,
}

impl FormView {
    pub fn nova() -> Self {
        Self::new(EventoDraft::default())
    }

    pub fn editar(evento: &Evento) -> Self {
        Self::new(EventoDraft::from_evento(evento))
    }

    /// Form for `draft`; it posts to the record's detail path when editing.
    pub fn new(draft: EventoDraft) -> Self {
        let (title, action) = match draft.existing_id() {
            Some(id) => ("Editar Licitação", format!("/detalhes/{id}")),
            None => ("Nova Licitação", "/nova".to_string()),
        };

        let mut modalidades: Vec<String> = Modalidade::OPTIONS.iter().map(|m| m.to_string()).collect();
        // Keep free-text values from older records selectable.
        if !draft.modalidade.is_empty() && !modalidades.contains(&draft.modalidade) {
            modalidades.push(draft.modalidade.clone());
        }

        FormView {
            title,
            action,
            draft,
            modalidades,
            errors: HashMap::new(),
            message: None,
        }
    }

    pub fn with_errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = errors.iter().map(|e| (e.field, e.reason.clone())).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Serialize)]
struct DashboardPage {
    proxima: Option<ProximaBanner>,
    grupos: Vec<GrupoView>,
    form: Option<FormView>,
    message: Option<String>,
}

pub fn render_dashboard(
    tera: &Tera,
    agenda: &Agenda,
    form: Option<FormView>,
    message: Option<String>,
) -> Result<String> {
    let proxima = agenda.next().map(|e| ProximaBanner {
        id: e.id.clone(),
        modalidade: e.payload.modalidade.as_ref().map(|m| m.to_string()).unwrap_or_default(),
        data: e.data().map(format_data).unwrap_or_default(),
        hora: e
            .payload
            .hora
            .as_deref()
            .map(format_hora)
            .filter(|h| !h.is_empty())
            .unwrap_or("hora não definida")
            .to_string(),
        orgao: e.payload.orgao.clone(),
    });

    let grupos = agenda
        .groups()
        .iter()
        .map(|g| GrupoView {
            label: g.label.clone(),
            eventos: g.eventos.iter().map(EventoCard::from_evento).collect(),
        })
        .collect();

    let page = DashboardPage {
        proxima,
        grupos,
        form,
        message,
    };

    Ok(tera.render("dashboard.html", &Context::from_serialize(&page)?)?)
}

pub fn render_not_found(tera: &Tera) -> Result<String> {
    Ok(tera.render("not_found.html", &Context::new())?)
}
