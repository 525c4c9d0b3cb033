//! Supabase REST backend: PostgREST tables and the storage API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{DataService, OrderBy, StoredObject, UploadOptions};
use crate::error::{LicitacaoError, LicitacaoResult};
use crate::evento::{Evento, EventoPayload};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct SupabaseService {
    client: Client,
    base_url: Url,
    key: String,
}

/// Error body returned by PostgREST and the storage API.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    msg: Option<String>,
}

impl SupabaseService {
    pub fn new(base_url: &str, key: &str) -> LicitacaoResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LicitacaoError::Config(format!("Invalid supabase_url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(LicitacaoError::Config(format!(
                "Invalid supabase_url '{base_url}': expected an http(s) URL"
            )));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(SupabaseService {
            client,
            base_url,
            key: key.to_string(),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded on its own.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn table_url(&self, collection: &str) -> Url {
        self.endpoint(["rest", "v1", collection])
    }

    fn object_url(&self, bucket: &str, path: &str) -> Url {
        self.endpoint(["storage", "v1", "object", bucket].into_iter().chain(path.split('/')))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.key).bearer_auth(&self.key)
    }
}

/// `data.asc,hora.asc`
fn order_param(order_by: &[OrderBy]) -> String {
    order_by
        .iter()
        .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
        .collect::<Vec<_>>()
        .join(",")
}

/// Turn a non-2xx response into a `Service` error carrying the backend's message.
async fn check(response: Response) -> LicitacaoResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error).or(b.msg))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.to_string());

    tracing::debug!(%status, %message, "backend request failed");
    Err(LicitacaoError::Service(message))
}

#[async_trait]
impl DataService for SupabaseService {
    async fn list(&self, collection: &str, order_by: &[OrderBy]) -> LicitacaoResult<Vec<Evento>> {
        let mut query = vec![("select", "*".to_string())];
        if !order_by.is_empty() {
            query.push(("order", order_param(order_by)));
        }

        tracing::debug!(collection, "listing rows");
        let response = self
            .authorize(self.client.get(self.table_url(collection)))
            .query(&query)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn insert(&self, collection: &str, evento: &Evento) -> LicitacaoResult<()> {
        tracing::debug!(collection, id = %evento.id, "inserting row");
        let response = self
            .authorize(self.client.post(self.table_url(collection)))
            .header("Prefer", "return=minimal")
            .json(&[evento])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        payload: &EventoPayload,
    ) -> LicitacaoResult<()> {
        tracing::debug!(collection, id, "updating row");
        let response = self
            .authorize(self.client.patch(self.table_url(collection)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(payload)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> LicitacaoResult<StoredObject> {
        tracing::debug!(bucket, path, size = bytes.len(), "uploading object");
        let content_type = options
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let response = self
            .authorize(self.client.post(self.object_url(bucket, path)))
            .header("cache-control", format!("max-age={}", options.cache_control))
            .header("x-upsert", options.upsert.to_string())
            .header("content-type", content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(
            ["storage", "v1", "object", "public", bucket]
                .into_iter()
                .chain(path.split('/')),
        )
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SupabaseService {
        SupabaseService::new("https://demo.supabase.co/", "anon-key").unwrap()
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            SupabaseService::new("not a url", "k"),
            Err(LicitacaoError::Config(_))
        ));
        assert!(matches!(
            SupabaseService::new("mailto:someone@example.com", "k"),
            Err(LicitacaoError::Config(_))
        ));
    }

    #[test]
    fn builds_table_url() {
        assert_eq!(
            service().table_url("eventos").as_str(),
            "https://demo.supabase.co/rest/v1/eventos"
        );
    }

    #[test]
    fn public_url_encodes_each_path_segment() {
        let url = service().public_url("licitacoes", "abc-123/edital final.pdf");
        assert_eq!(
            url,
            "https://demo.supabase.co/storage/v1/object/public/licitacoes/abc-123/edital%20final.pdf"
        );
    }

    #[test]
    fn object_url_keeps_id_directory() {
        let url = service().object_url("licitacoes", "abc/doc.pdf");
        assert_eq!(
            url.as_str(),
            "https://demo.supabase.co/storage/v1/object/licitacoes/abc/doc.pdf"
        );
    }

    #[test]
    fn order_param_joins_terms() {
        assert_eq!(
            order_param(&[
                OrderBy::asc("data"),
                OrderBy {
                    column: "hora",
                    ascending: false
                }
            ]),
            "data.asc,hora.desc"
        );
    }
}
