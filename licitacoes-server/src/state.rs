use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tera::Tera;

use licitacoes_core::config::LicitacoesConfig;
use licitacoes_core::DataService;

use crate::views;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LicitacoesConfig>,
    pub service: Arc<dyn DataService>,
    pub templates: Arc<Tera>,
    // Pinned date for tests; the local calendar date otherwise.
    today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(config: LicitacoesConfig, service: Arc<dyn DataService>) -> Result<Self> {
        Ok(AppState {
            config: Arc::new(config),
            service,
            templates: Arc::new(views::templates()?),
            today: None,
        })
    }

    #[cfg(test)]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
