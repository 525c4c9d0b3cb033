//! Core types for scheduling procurement events ("licitações").
//!
//! This crate is shared by the `licitacoes` CLI and `licitacoes-server`:
//! - `evento` for the stored record
//! - `agenda` for the dashboard view (date groups, next upcoming event)
//! - `draft` and `save` for the create/edit form flow
//! - `service` for the hosted backend seam

pub mod agenda;
pub mod config;
pub mod draft;
pub mod error;
pub mod evento;
pub mod format;
pub mod save;
pub mod service;

pub use agenda::{Agenda, DateGroup};
pub use draft::{Attachment, EventoDraft};
pub use error::{LicitacaoError, LicitacaoResult};
pub use evento::{Evento, EventoPayload, Modalidade};
pub use save::{SaveError, SaveKind, SaveOutcome, SaveTarget, save};
pub use service::DataService;
