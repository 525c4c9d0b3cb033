//! Saving a draft: allocate the id, upload the attachment, write the record.
//!
//! The id is allocated locally before anything leaves the process, so the
//! attachment path (`{id}/{file_name}`) and the record share the same key.
//! Upload and write are two independent backend calls. A failed upload stops
//! the save before the write. A failed write after a successful upload leaves
//! the object in the bucket; the error carries its path.

use thiserror::Error;
use uuid::Uuid;

use crate::draft::{Attachment, EventoDraft, ValidationErrors};
use crate::error::LicitacaoError;
use crate::evento::Evento;
use crate::service::{DataService, UploadOptions};

/// Where saves go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub collection: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: String,
    pub kind: SaveKind,
    pub arquivo_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Dados inválidos: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Erro ao fazer upload do arquivo: {0}")]
    Upload(#[source] LicitacaoError),

    #[error("Erro ao salvar licitação: {source}")]
    Persist {
        #[source]
        source: LicitacaoError,
        /// Object uploaded during this save that no record points to.
        orphaned_upload: Option<String>,
    },
}

/// Object path for an attachment: `{id}/{file_name}`.
pub fn attachment_path(id: &str, file_name: &str) -> String {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("arquivo");
    format!("{id}/{name}")
}

/// Validate `draft` and persist it, uploading `attachment` first when given.
///
/// A draft carrying an id is updated in place; otherwise a new record is
/// inserted under a freshly generated id.
pub async fn save(
    service: &dyn DataService,
    target: &SaveTarget,
    draft: &EventoDraft,
    attachment: Option<&Attachment>,
) -> Result<SaveOutcome, SaveError> {
    let valid = draft.validate()?;

    let (id, kind) = match valid.id {
        Some(id) => (id, SaveKind::Updated),
        None => (Uuid::new_v4().to_string(), SaveKind::Created),
    };
    let mut payload = valid.payload;
    if kind == SaveKind::Created {
        // A new record only points at a file this save uploaded.
        payload.arquivo_url = None;
    }

    let mut uploaded = None;
    if let Some(attachment) = attachment {
        let path = attachment_path(&id, &attachment.file_name);
        let options = UploadOptions {
            content_type: attachment.content_type.clone(),
            ..Default::default()
        };

        service
            .upload_file(&target.bucket, &path, &attachment.bytes, &options)
            .await
            .map_err(SaveError::Upload)?;

        payload.arquivo_url = Some(service.public_url(&target.bucket, &path));
        uploaded = Some(path);
    }

    let written = match kind {
        SaveKind::Updated => service.update(&target.collection, &id, &payload).await,
        SaveKind::Created => {
            let evento = Evento::new(id.clone(), payload.clone());
            service.insert(&target.collection, &evento).await
        }
    };

    if let Err(source) = written {
        if let Some(path) = &uploaded {
            tracing::warn!(bucket = %target.bucket, path = %path, "record write failed after upload; object left orphaned");
        }
        return Err(SaveError::Persist {
            source,
            orphaned_upload: uploaded,
        });
    }

    tracing::info!(id = %id, ?kind, "licitação salva");

    Ok(SaveOutcome {
        id,
        kind,
        arquivo_url: payload.arquivo_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicitacaoResult;
    use crate::evento::{EventoPayload, Modalidade};
    use crate::service::{MemoryService, OrderBy, StoredObject};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Insert(Evento),
        Update(String, EventoPayload),
        Upload(String, String, UploadOptions),
    }

    /// Records every call and fails the ones it is told to.
    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<Call>>,
        fail_upload: bool,
        fail_write: bool,
    }

    impl RecordingService {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DataService for RecordingService {
        async fn list(&self, _: &str, _: &[OrderBy]) -> LicitacaoResult<Vec<Evento>> {
            Ok(Vec::new())
        }

        async fn insert(&self, _: &str, evento: &Evento) -> LicitacaoResult<()> {
            self.calls.lock().unwrap().push(Call::Insert(evento.clone()));
            if self.fail_write {
                return Err(LicitacaoError::Service("insert refused".into()));
            }
            Ok(())
        }

        async fn update(&self, _: &str, id: &str, payload: &EventoPayload) -> LicitacaoResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(id.to_string(), payload.clone()));
            if self.fail_write {
                return Err(LicitacaoError::Service("update refused".into()));
            }
            Ok(())
        }

        async fn upload_file(
            &self,
            bucket: &str,
            path: &str,
            _: &[u8],
            options: &UploadOptions,
        ) -> LicitacaoResult<StoredObject> {
            self.calls.lock().unwrap().push(Call::Upload(
                bucket.to_string(),
                path.to_string(),
                options.clone(),
            ));
            if self.fail_upload {
                return Err(LicitacaoError::Service("Payload too large".into()));
            }
            Ok(StoredObject {
                key: format!("{bucket}/{path}"),
            })
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("https://cdn.test/{bucket}/{path}")
        }
    }

    fn target() -> SaveTarget {
        SaveTarget {
            collection: "eventos".into(),
            bucket: "licitacoes".into(),
        }
    }

    fn draft() -> EventoDraft {
        EventoDraft {
            modalidade: "Dispensa Eletrônica".into(),
            data: "2025-09-10".into(),
            hora: "10:00".into(),
            orgao: "Câmara Municipal".into(),
            objeto: "Cadeiras".into(),
            valor_estimado: "2.500,00".into(),
            ..Default::default()
        }
    }

    fn attachment() -> Attachment {
        Attachment {
            file_name: "edital.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: b"%PDF".to_vec(),
        }
    }

    #[tokio::test]
    async fn create_without_file_inserts_once_with_null_attachment() {
        let service = RecordingService::default();

        let outcome = save(&service, &target(), &draft(), None).await.unwrap();

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        let Call::Insert(evento) = &calls[0] else {
            panic!("expected insert, got {:?}", calls[0]);
        };
        assert_eq!(evento.id, outcome.id);
        assert_eq!(evento.payload.arquivo_url, None);
        assert_eq!(evento.payload.valor_estimado, Some(2500.0));
        assert_eq!(evento.payload.modalidade, Some(Modalidade::DispensaEletronica));
        assert_eq!(outcome.kind, SaveKind::Created);
        assert!(Uuid::parse_str(&outcome.id).is_ok());
    }

    #[tokio::test]
    async fn create_ignores_attachment_url_it_did_not_upload() {
        let service = RecordingService::default();
        let draft = EventoDraft {
            arquivo_url: Some("javascript:alert(1)".into()),
            ..draft()
        };

        let outcome = save(&service, &target(), &draft, None).await.unwrap();

        let Call::Insert(evento) = &service.calls()[0] else {
            panic!("expected insert");
        };
        assert_eq!(evento.payload.arquivo_url, None);
        assert_eq!(outcome.arquivo_url, None);
    }

    #[tokio::test]
    async fn edit_updates_by_id_and_never_inserts() {
        let service = RecordingService::default();
        let draft = EventoDraft {
            id: Some("existing-id".into()),
            arquivo_url: Some("https://cdn.test/licitacoes/existing-id/old.pdf".into()),
            ..draft()
        };

        let outcome = save(&service, &target(), &draft, None).await.unwrap();

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        let Call::Update(id, payload) = &calls[0] else {
            panic!("expected update, got {:?}", calls[0]);
        };
        assert_eq!(id, "existing-id");
        assert_eq!(
            payload.arquivo_url.as_deref(),
            Some("https://cdn.test/licitacoes/existing-id/old.pdf")
        );
        assert_eq!(outcome.kind, SaveKind::Updated);
    }

    #[tokio::test]
    async fn upload_shares_the_record_id() {
        let service = RecordingService::default();

        let outcome = save(&service, &target(), &draft(), Some(&attachment()))
            .await
            .unwrap();

        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        let expected_path = format!("{}/edital.pdf", outcome.id);
        match &calls[0] {
            Call::Upload(bucket, path, options) => {
                assert_eq!(bucket, "licitacoes");
                assert_eq!(path, &expected_path);
                assert_eq!(options.cache_control, 3600);
                assert!(options.upsert);
                assert_eq!(options.content_type.as_deref(), Some("application/pdf"));
            }
            other => panic!("expected upload first, got {other:?}"),
        }
        let Call::Insert(evento) = &calls[1] else {
            panic!("expected insert second, got {:?}", calls[1]);
        };
        let url = format!("https://cdn.test/licitacoes/{expected_path}");
        assert_eq!(evento.payload.arquivo_url.as_deref(), Some(url.as_str()));
        assert_eq!(outcome.arquivo_url.as_deref(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn upload_failure_skips_the_write() {
        let service = RecordingService {
            fail_upload: true,
            ..Default::default()
        };

        let err = save(&service, &target(), &draft(), Some(&attachment()))
            .await
            .unwrap_err();

        assert!(matches!(err, SaveError::Upload(_)));
        assert_eq!(
            err.to_string(),
            "Erro ao fazer upload do arquivo: Payload too large"
        );
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn write_failure_after_upload_reports_orphan() {
        let service = RecordingService {
            fail_write: true,
            ..Default::default()
        };
        let draft = EventoDraft {
            id: Some("abc".into()),
            ..draft()
        };

        let err = save(&service, &target(), &draft, Some(&attachment()))
            .await
            .unwrap_err();

        match err {
            SaveError::Persist {
                orphaned_upload, ..
            } => assert_eq!(orphaned_upload.as_deref(), Some("abc/edital.pdf")),
            other => panic!("expected persist error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_draft_makes_no_calls() {
        let service = RecordingService::default();
        let draft = EventoDraft {
            hora: String::new(),
            ..draft()
        };

        let err = save(&service, &target(), &draft, Some(&attachment()))
            .await
            .unwrap_err();

        assert!(matches!(err, SaveError::Validation(_)));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn saved_record_shows_up_in_the_next_snapshot() {
        let service = MemoryService::new();

        let outcome = save(&service, &target(), &draft(), Some(&attachment()))
            .await
            .unwrap();

        let rows = service.list("eventos", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, outcome.id);
        let path = attachment_path(&outcome.id, "edital.pdf");
        assert_eq!(service.object("licitacoes", &path).await, Some(b"%PDF".to_vec()));
    }

    #[test]
    fn attachment_path_keeps_only_the_file_name() {
        assert_eq!(attachment_path("id", "C:\\Users\\ana\\edital.pdf"), "id/edital.pdf");
        assert_eq!(attachment_path("id", "../../etc/passwd"), "id/passwd");
        assert_eq!(attachment_path("id", ""), "id/arquivo");
    }
}
