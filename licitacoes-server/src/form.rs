//! Multipart form submissions.

use anyhow::{Context, Result};
use axum::extract::Multipart;

use licitacoes_core::{Attachment, EventoDraft};

/// Read the create/edit form: text fields into a draft, `arquivo` into an attachment.
///
/// Browsers post an empty `arquivo` part when no file was picked; that is
/// treated as no attachment. The record id and stored attachment URL never
/// come from the form.
pub async fn read_submission(mut multipart: Multipart) -> Result<(EventoDraft, Option<Attachment>)> {
    let mut draft = EventoDraft::default();
    let mut attachment = None;

    while let Some(field) = multipart.next_field().await.context("Invalid form submission")? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "arquivo" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.context("Could not read uploaded file")?;

            if !file_name.is_empty() && !bytes.is_empty() {
                attachment = Some(Attachment {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.context("Invalid form field")?;
        match name.as_str() {
            "modalidade" => draft.modalidade = value,
            "data" => draft.data = value,
            "hora" => draft.hora = value,
            "orgao" => draft.orgao = value,
            "objeto" => draft.objeto = value,
            "valor_estimado" => draft.valor_estimado = value,
            "valor_ideal" => draft.valor_ideal = value,
            "observacoes" => draft.observacoes = value,
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok((draft, attachment))
}
