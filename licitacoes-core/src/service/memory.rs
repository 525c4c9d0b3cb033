//! In-process backend used for offline runs and tests.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{DataService, OrderBy, StoredObject, UploadOptions};
use crate::error::{LicitacaoError, LicitacaoResult};
use crate::evento::{Evento, EventoPayload};

#[derive(Default)]
pub struct MemoryService {
    tables: Mutex<HashMap<String, Vec<Evento>>>,
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `eventos` already stored in `collection`.
    pub fn with_eventos(collection: &str, eventos: Vec<Evento>) -> Self {
        let mut tables = HashMap::new();
        tables.insert(collection.to_string(), eventos);
        MemoryService {
            tables: Mutex::new(tables),
            objects: Mutex::default(),
        }
    }

    pub async fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }
}

/// Compare two rows on one column. Nulls sort last, as PostgREST does for `asc`.
fn compare_column(a: &Evento, b: &Evento, column: &str) -> LicitacaoResult<Ordering> {
    fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    let (a, b) = (&a.payload, &b.payload);
    let ordering = match column {
        "data" => nulls_last(a.data, b.data),
        "hora" => nulls_last(a.hora.as_deref(), b.hora.as_deref()),
        "orgao" => a.orgao.cmp(&b.orgao),
        "objeto" => a.objeto.cmp(&b.objeto),
        "modalidade" => nulls_last(
            a.modalidade.as_ref().map(|m| m.as_str()),
            b.modalidade.as_ref().map(|m| m.as_str()),
        ),
        other => {
            return Err(LicitacaoError::Service(format!(
                "column eventos.{other} does not exist"
            )));
        }
    };
    Ok(ordering)
}

#[async_trait]
impl DataService for MemoryService {
    async fn list(&self, collection: &str, order_by: &[OrderBy]) -> LicitacaoResult<Vec<Evento>> {
        let mut rows = self
            .tables
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();

        // Validate columns up front so the sort comparator cannot fail.
        if let Some(first) = rows.first() {
            for order in order_by {
                compare_column(first, first, order.column)?;
            }
        }

        rows.sort_by(|a, b| {
            order_by
                .iter()
                .map(|o| {
                    let ordering = compare_column(a, b, o.column).unwrap_or(Ordering::Equal);
                    if o.ascending { ordering } else { ordering.reverse() }
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(rows)
    }

    async fn insert(&self, collection: &str, evento: &Evento) -> LicitacaoResult<()> {
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(collection.to_string()).or_default();

        if rows.iter().any(|e| e.id == evento.id) {
            return Err(LicitacaoError::Service(format!(
                "duplicate key value violates unique constraint \"{collection}_pkey\""
            )));
        }

        rows.push(evento.clone());
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        payload: &EventoPayload,
    ) -> LicitacaoResult<()> {
        let mut tables = self.tables.lock().await;
        match tables
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|e| e.id == id))
        {
            Some(row) => row.payload = payload.clone(),
            // PostgREST answers a PATCH matching no rows with success.
            None => tracing::debug!(collection, id, "update matched no rows"),
        }
        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> LicitacaoResult<StoredObject> {
        let mut objects = self.objects.lock().await;
        let key = (bucket.to_string(), path.to_string());

        if !options.upsert && objects.contains_key(&key) {
            return Err(LicitacaoError::Service("The resource already exists".into()));
        }

        objects.insert(key, bytes.to_vec());
        Ok(StoredObject {
            key: format!("{bucket}/{path}"),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn evento(id: &str, data: Option<(i32, u32, u32)>, hora: Option<&str>) -> Evento {
        Evento::new(
            id,
            EventoPayload {
                data: data.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                hora: hora.map(str::to_string),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn list_orders_by_date_then_time_with_nulls_last() {
        let service = MemoryService::with_eventos(
            "eventos",
            vec![
                evento("undated", None, Some("08:00")),
                evento("late", Some((2025, 8, 1)), Some("09:00")),
                evento("early-pm", Some((2025, 7, 1)), Some("15:00")),
                evento("early-am", Some((2025, 7, 1)), Some("09:00")),
            ],
        );

        let rows = service
            .list("eventos", &[OrderBy::asc("data"), OrderBy::asc("hora")])
            .await
            .unwrap();

        let ids: Vec<_> = rows.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early-am", "early-pm", "late", "undated"]);
    }

    #[tokio::test]
    async fn list_rejects_unknown_column() {
        let service = MemoryService::with_eventos("eventos", vec![evento("a", None, None)]);
        let result = service.list("eventos", &[OrderBy::asc("nope")]).await;
        assert!(matches!(result, Err(LicitacaoError::Service(_))));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let service = MemoryService::new();
        service.insert("eventos", &evento("a", None, None)).await.unwrap();
        let again = service.insert("eventos", &evento("a", None, None)).await;
        assert!(matches!(again, Err(LicitacaoError::Service(_))));
    }

    #[tokio::test]
    async fn update_replaces_payload_in_place() {
        let service = MemoryService::with_eventos("eventos", vec![evento("a", None, None)]);
        let payload = EventoPayload {
            orgao: "Prefeitura".into(),
            ..Default::default()
        };

        service.update("eventos", "a", &payload).await.unwrap();

        let rows = service.list("eventos", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "a");
        assert_eq!(rows[0].payload.orgao, "Prefeitura");
    }

    #[tokio::test]
    async fn upload_without_upsert_refuses_overwrite() {
        let service = MemoryService::new();
        let options = UploadOptions {
            upsert: false,
            ..Default::default()
        };

        service.upload_file("b", "x/y.pdf", b"one", &options).await.unwrap();
        assert!(service.upload_file("b", "x/y.pdf", b"two", &options).await.is_err());
        assert_eq!(service.object("b", "x/y.pdf").await, Some(b"one".to_vec()));
    }
}
