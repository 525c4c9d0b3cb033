//! Form input and its validation.
//!
//! An [`EventoDraft`] holds exactly what the user typed. [`EventoDraft::validate`]
//! is the single place that turns it into a typed [`ValidDraft`] or a list of
//! field-level problems.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::evento::{Evento, EventoPayload, Modalidade};

/// Unvalidated form state. Text fields default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventoDraft {
    /// Present when editing an existing record.
    pub id: Option<String>,
    pub modalidade: String,
    pub data: String,
    pub hora: String,
    pub orgao: String,
    pub objeto: String,
    pub valor_estimado: String,
    pub valor_ideal: String,
    pub observacoes: String,
    /// Attachment URL already stored on the record, kept when no new file is sent.
    pub arquivo_url: Option<String>,
}

/// A file picked in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Draft that passed validation. The id is still unallocated for new records.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub id: Option<String>,
    pub payload: EventoPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

/// Every problem found in a draft, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Reason reported for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.reason.as_str())
    }

    fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.push(FieldError {
            field,
            reason: reason.into(),
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl EventoDraft {
    /// Pre-fill the edit form from a stored record.
    pub fn from_evento(evento: &Evento) -> Self {
        let p = &evento.payload;
        EventoDraft {
            id: Some(evento.id.clone()),
            modalidade: p.modalidade.as_ref().map(|m| m.to_string()).unwrap_or_default(),
            data: p.data.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            hora: p.hora.clone().unwrap_or_default(),
            orgao: p.orgao.clone(),
            objeto: p.objeto.clone(),
            valor_estimado: p.valor_estimado.map(valor_text).unwrap_or_default(),
            valor_ideal: p.valor_ideal.map(valor_text).unwrap_or_default(),
            observacoes: p.observacoes.clone().unwrap_or_default(),
            arquivo_url: p.arquivo_url.clone().filter(|u| !u.is_empty()),
        }
    }

    /// The record id, ignoring blank values a form may post.
    pub fn existing_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn validate(&self) -> Result<ValidDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let modalidade = required(&mut errors, "modalidade", &self.modalidade);

        let data = match required(&mut errors, "data", &self.data) {
            Some(text) => match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("data", format!("data inválida '{text}', use AAAA-MM-DD"));
                    None
                }
            },
            None => None,
        };

        let hora = required(&mut errors, "hora", &self.hora);
        let orgao = required(&mut errors, "orgao", &self.orgao);
        let objeto = required(&mut errors, "objeto", &self.objeto);

        let valor_estimado = optional_valor(&mut errors, "valor_estimado", &self.valor_estimado);
        let valor_ideal = optional_valor(&mut errors, "valor_ideal", &self.valor_ideal);

        if !errors.is_empty() {
            return Err(errors);
        }

        let observacoes = self.observacoes.trim();

        Ok(ValidDraft {
            id: self.existing_id().map(str::to_string),
            payload: EventoPayload {
                modalidade: modalidade.map(Modalidade::from),
                data,
                hora: hora.map(str::to_string),
                orgao: orgao.unwrap_or_default().to_string(),
                objeto: objeto.unwrap_or_default().to_string(),
                valor_estimado,
                valor_ideal,
                observacoes: (!observacoes.is_empty()).then(|| observacoes.to_string()),
                arquivo_url: self.arquivo_url.clone().filter(|u| !u.is_empty()),
            },
        })
    }
}

fn required<'a>(errors: &mut ValidationErrors, field: &'static str, value: &'a str) -> Option<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, "campo obrigatório");
        None
    } else {
        Some(value)
    }
}

fn optional_valor(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<f64> {
    match parse_valor(value) {
        Ok(valor) => valor,
        Err(reason) => {
            errors.push(field, reason);
            None
        }
    }
}

/// Stored amount as editable text, with a decimal comma: `1500.5` → `1500,5`.
fn valor_text(valor: f64) -> String {
    valor.to_string().replace('.', ",")
}

/// Parse a monetary amount as typed in the form.
///
/// Blank input is `None`, never zero. The comma is the decimal mark and dots
/// group thousands (`1.234,56`, `R$ 1.500`). A lone dot that cannot be a
/// thousands separator is read as a decimal point (`1234.56`, `0.5`).
/// Anything else, such as `1,234.56`, is rejected rather than guessed.
pub fn parse_valor(text: &str) -> Result<Option<f64>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let invalid = || format!("valor inválido '{text}'");

    let amount = text.trim_start_matches("R$").trim();
    let (sign, digits) = match amount.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, amount),
    };

    let normalized = match digits.split_once(',') {
        Some((inteiro, centavos)) => {
            if !is_digits(centavos) || !is_grouped(inteiro) {
                return Err(invalid());
            }
            return parse_moeda(digits).map(|v| Some(sign * v)).ok_or_else(invalid);
        }
        None if is_grouped(digits) => digits.replace('.', ""),
        None => match digits.split_once('.') {
            Some((inteiro, fracao)) if is_digits(inteiro) && is_digits(fracao) => {
                digits.to_string()
            }
            _ => return Err(invalid()),
        },
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| Some(sign * v))
        .ok_or_else(invalid)
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// `1234`, or dot-separated thousands like `1.234.567`.
fn is_grouped(text: &str) -> bool {
    let mut groups = text.split('.');
    match groups.next() {
        Some(first) if !text.contains('.') => is_digits(first),
        Some(first) => {
            first.len() <= 3 && is_digits(first) && groups.all(|g| g.len() == 3 && is_digits(g))
        }
        None => false,
    }
}

/// Brazilian currency text to a number: `1.234,56` → `1234.56`.
///
/// Dots are thousands separators and the comma is the decimal mark.
pub fn parse_moeda(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
