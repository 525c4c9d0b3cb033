//! Global licitacoes configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{LicitacaoError, LicitacaoResult};
use crate::save::SaveTarget;
use crate::service::SupabaseService;

pub const DEFAULT_COLLECTION: &str = "eventos";
pub const DEFAULT_BUCKET: &str = "licitacoes";
pub const DEFAULT_LANDING_ID: &str = "dc724962-66ef-44fd-92e5-de837abd0b13";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:4096";

/// Prefix for environment overrides, e.g. `LICITACOES_SUPABASE_URL`.
const ENV_PREFIX: &str = "LICITACOES";

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_landing_id() -> String {
    DEFAULT_LANDING_ID.to_string()
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

/// Configuration at ~/.config/licitacoes/config.toml, overridable from the
/// environment.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LicitacoesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_key: Option<String>,

    /// Table holding the events.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Storage bucket for attachments.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Record the server's `/` redirects to.
    #[serde(default = "default_landing_id")]
    pub landing_id: String,

    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for LicitacoesConfig {
    fn default() -> Self {
        LicitacoesConfig {
            supabase_url: None,
            supabase_key: None,
            collection: default_collection(),
            bucket: default_bucket(),
            landing_id: default_landing_id(),
            listen: default_listen(),
        }
    }
}

impl LicitacoesConfig {
    pub fn config_path() -> LicitacaoResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| LicitacaoError::Config("Could not determine config directory".into()))?
            .join("licitacoes");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, creating a commented default on first run.
    pub fn load() -> LicitacaoResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> LicitacaoResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| LicitacaoError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| LicitacaoError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> LicitacaoResult<()> {
        let contents = format!(
            "\
# licitacoes configuration

# Hosted backend (also settable via LICITACOES_SUPABASE_URL / LICITACOES_SUPABASE_KEY):
# supabase_url = \"https://<project>.supabase.co\"
# supabase_key = \"<anon key>\"

# Table and storage bucket:
# collection = \"{DEFAULT_COLLECTION}\"
# bucket = \"{DEFAULT_BUCKET}\"

# Record opened by the server's landing page:
# landing_id = \"{DEFAULT_LANDING_ID}\"

# Server address:
# listen = \"{DEFAULT_LISTEN}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;

        Ok(())
    }

    pub fn save_target(&self) -> SaveTarget {
        SaveTarget {
            collection: self.collection.clone(),
            bucket: self.bucket.clone(),
        }
    }

    /// Client for the configured backend.
    pub fn supabase(&self) -> LicitacaoResult<SupabaseService> {
        let (Some(url), Some(key)) = (&self.supabase_url, &self.supabase_key) else {
            return Err(LicitacaoError::Config(
                "supabase_url and supabase_key must be set (config.toml or LICITACOES_* env)".into(),
            ));
        };
        SupabaseService::new(url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_default_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("licitacoes").join("config.toml");

        LicitacoesConfig::create_default_config(&path).unwrap();
        let config = LicitacoesConfig::load_from(&path).unwrap();

        assert_eq!(config.collection, DEFAULT_COLLECTION);
        assert_eq!(config.bucket, DEFAULT_BUCKET);
        assert_eq!(config.landing_id, DEFAULT_LANDING_ID);
        assert!(config.supabase().is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "supabase_url = \"https://demo.supabase.co\"\nsupabase_key = \"k\"\nbucket = \"anexos\"\n",
        )
        .unwrap();

        let config = LicitacoesConfig::load_from(&path).unwrap();

        assert_eq!(config.bucket, "anexos");
        assert_eq!(config.save_target().collection, DEFAULT_COLLECTION);
        assert!(config.supabase().is_ok());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = LicitacoesConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.listen, DEFAULT_LISTEN);
    }

    #[test]
    fn unwritable_config_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("licitacoes");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = LicitacoesConfig::create_default_config(&blocker.join("config.toml")).unwrap_err();

        assert!(matches!(err, LicitacaoError::Io(_)));
    }
}
