//! Procurement event records as stored by the data service.
//!
//! Field names follow the backend columns (`modalidade`, `data`, `hora`, ...)
//! so records serialize straight into insert/update payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A scheduled procurement event ("licitação").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evento {
    /// Client-generated UUID, immutable after creation.
    pub id: String,
    #[serde(flatten)]
    pub payload: EventoPayload,
}

/// Every column of an event except its id.
///
/// This is what an update sends, keyed by id, and what an insert sends
/// alongside a freshly allocated id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventoPayload {
    #[serde(default)]
    pub modalidade: Option<Modalidade>,
    #[serde(default)]
    pub data: Option<NaiveDate>,
    #[serde(default)]
    pub hora: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub orgao: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub objeto: String,
    #[serde(default)]
    pub valor_estimado: Option<f64>,
    #[serde(default)]
    pub valor_ideal: Option<f64>,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub arquivo_url: Option<String>,
}

impl Evento {
    pub fn new(id: impl Into<String>, payload: EventoPayload) -> Self {
        Evento {
            id: id.into(),
            payload,
        }
    }

    pub fn data(&self) -> Option<NaiveDate> {
        self.payload.data
    }
}

impl fmt::Display for Evento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload.modalidade {
            Some(modalidade) => write!(f, "{} - {}", modalidade, self.payload.orgao),
            None => write!(f, "{}", self.payload.orgao),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Procurement method.
///
/// The form only offers the known variants, but older rows hold free text,
/// which round-trips through `Outra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Modalidade {
    PregaoEletronico,
    DispensaEletronica,
    Outra(String),
}

impl Modalidade {
    /// Options offered by the creation/edit form, in display order.
    pub const OPTIONS: [Modalidade; 2] = [Modalidade::PregaoEletronico, Modalidade::DispensaEletronica];

    pub fn as_str(&self) -> &str {
        match self {
            Modalidade::PregaoEletronico => "Pregão Eletrônico",
            Modalidade::DispensaEletronica => "Dispensa Eletrônica",
            Modalidade::Outra(text) => text,
        }
    }
}

impl From<&str> for Modalidade {
    fn from(s: &str) -> Self {
        let s = s.trim();
        match s {
            "Pregão Eletrônico" => Modalidade::PregaoEletronico,
            "Dispensa Eletrônica" => Modalidade::DispensaEletronica,
            other => Modalidade::Outra(other.to_string()),
        }
    }
}

impl From<String> for Modalidade {
    fn from(s: String) -> Self {
        Modalidade::from(s.as_str())
    }
}

impl From<Modalidade> for String {
    fn from(m: Modalidade) -> Self {
        match m {
            Modalidade::Outra(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Modalidade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
