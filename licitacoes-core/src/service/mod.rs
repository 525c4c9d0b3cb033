//! The hosted backend seam.
//!
//! Everything that leaves the process goes through [`DataService`]: table
//! reads and writes plus object storage uploads. `SupabaseService` talks to
//! the real backend over HTTP; `MemoryService` keeps everything in-process.

mod memory;
mod supabase;

pub use memory::MemoryService;
pub use supabase::SupabaseService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LicitacaoResult;
use crate::evento::{Evento, EventoPayload};

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub ascending: bool,
}

impl OrderBy {
    pub const fn asc(column: &'static str) -> Self {
        OrderBy {
            column,
            ascending: true,
        }
    }
}

/// Storage options sent with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Seconds, sent as `cache-control: max-age=<n>`.
    pub cache_control: u32,
    /// Overwrite an existing object at the same path.
    pub upsert: bool,
    pub content_type: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            cache_control: 3600,
            upsert: true,
            content_type: None,
        }
    }
}

/// Reference to an object the storage backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    #[serde(rename = "Key")]
    pub key: String,
}

#[async_trait]
pub trait DataService: Send + Sync {
    /// All rows of `collection`, ordered by `order_by`.
    async fn list(&self, collection: &str, order_by: &[OrderBy]) -> LicitacaoResult<Vec<Evento>>;

    async fn insert(&self, collection: &str, evento: &Evento) -> LicitacaoResult<()>;

    /// Overwrite every non-id column of the row with the given id.
    async fn update(&self, collection: &str, id: &str, payload: &EventoPayload)
    -> LicitacaoResult<()>;

    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> LicitacaoResult<StoredObject>;

    /// Public URL of an object. Computed locally, no request is made.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
