pub mod edit;
pub mod list;
pub mod new;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use licitacoes_core::save::{SaveError, SaveKind, SaveOutcome};
use licitacoes_core::{Attachment, EventoDraft};
use owo_colors::OwoColorize;

/// Field flags shared by `new` and `edit`. Unset flags leave the draft as is.
#[derive(Args, Debug, Default, Clone)]
pub struct EventoArgs {
    /// Procurement method, e.g. "Pregão Eletrônico"
    #[arg(short, long)]
    pub modalidade: Option<String>,

    /// Date (YYYY-MM-DD)
    #[arg(short, long)]
    pub data: Option<String>,

    /// Time of day (HH:MM)
    #[arg(long)]
    pub hora: Option<String>,

    /// Issuing organization
    #[arg(short, long)]
    pub orgao: Option<String>,

    /// What is being procured
    #[arg(long)]
    pub objeto: Option<String>,

    /// Estimated value, e.g. "1.234,56" (empty to clear)
    #[arg(long)]
    pub valor_estimado: Option<String>,

    /// Target value (empty to clear)
    #[arg(long)]
    pub valor_ideal: Option<String>,

    #[arg(long)]
    pub observacoes: Option<String>,

    /// File to attach (PDF or image)
    #[arg(short, long)]
    pub arquivo: Option<PathBuf>,
}

impl EventoArgs {
    pub fn apply(&self, draft: &mut EventoDraft) {
        let fields = [
            (&self.modalidade, &mut draft.modalidade),
            (&self.data, &mut draft.data),
            (&self.hora, &mut draft.hora),
            (&self.orgao, &mut draft.orgao),
            (&self.objeto, &mut draft.objeto),
            (&self.valor_estimado, &mut draft.valor_estimado),
            (&self.valor_ideal, &mut draft.valor_ideal),
            (&self.observacoes, &mut draft.observacoes),
        ];
        for (flag, field) in fields {
            if let Some(value) = flag {
                *field = value.clone();
            }
        }
    }

    pub fn attachment(&self) -> Result<Option<Attachment>> {
        self.arquivo.as_deref().map(read_attachment).transpose()
    }
}

pub fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    let content_type = mime_guess::from_path(path).first().map(|m| m.to_string());

    Ok(Attachment {
        file_name,
        content_type,
        bytes,
    })
}

/// Print the result of a save. Validation problems are listed per field.
pub fn report(result: Result<SaveOutcome, SaveError>) -> Result<()> {
    match result {
        Ok(outcome) => {
            let verb = match outcome.kind {
                SaveKind::Created => "Criada",
                SaveKind::Updated => "Atualizada",
            };
            println!("{}", format!("  {verb}: {}", outcome.id).green());
            if let Some(url) = outcome.arquivo_url {
                println!("  {} {}", "Arquivo:".dimmed(), url);
            }
            Ok(())
        }
        Err(SaveError::Validation(errors)) => {
            for error in errors.iter() {
                eprintln!("  {}", format!("{}: {}", error.field, error.reason).red());
            }
            anyhow::bail!("Dados inválidos, licitação não salva")
        }
        Err(SaveError::Persist {
            source,
            orphaned_upload: Some(path),
        }) => {
            eprintln!(
                "  {}",
                format!("O arquivo {path} foi enviado, mas o registro não foi salvo").yellow()
            );
            Err(SaveError::Persist {
                source,
                orphaned_upload: Some(path),
            }
            .into())
        }
        Err(err) => Err(err.into()),
    }
}
