use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Which persistence engine backs the collections.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

impl StorageBackend {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(anyhow!("unknown storage backend `{other}` (expected memory|file)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_countries_collection")]
    pub countries_collection: String,
    #[serde(default = "default_neighbors_collection")]
    pub neighbors_collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_file: default_data_file(),
            countries_collection: default_countries_collection(),
            neighbors_collection: default_neighbors_collection(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { default_limit: default_limit(), max_limit: default_max_limit() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_data_file() -> PathBuf { PathBuf::from("data/store.json") }
fn default_countries_collection() -> String { "countries".into() }
fn default_neighbors_collection() -> String { "neighbors".into() }
fn default_limit() -> u32 { 10 }
fn default_max_limit() -> u32 { 100 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        // 归一化 storage（支持从环境变量覆盖）
        self.storage.normalize_from_env()?;
        self.storage.validate()?;
        self.listing.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var("STORAGE_BACKEND") {
            self.backend = StorageBackend::parse(&backend)?;
        }
        if let Ok(file) = std::env::var("STORAGE_FILE") {
            if !file.trim().is_empty() {
                self.data_file = PathBuf::from(file);
            }
        }
        self.countries_collection = self.countries_collection.trim().to_string();
        self.neighbors_collection = self.neighbors_collection.trim().to_string();
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.countries_collection.is_empty() || self.neighbors_collection.is_empty() {
            return Err(anyhow!("storage collection names must not be empty"));
        }
        if self.countries_collection == self.neighbors_collection {
            return Err(anyhow!("storage.countries_collection and storage.neighbors_collection must differ"));
        }
        if self.backend == StorageBackend::File && self.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file is required for the file backend"));
        }
        Ok(())
    }
}

impl ListingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 {
            return Err(anyhow!("listing.max_limit must be >= 1"));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(anyhow!("listing.default_limit must be within 1..=listing.max_limit"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() -> Result<()> {
        let cfg = load_from_str("")?;
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.countries_collection, "countries");
        assert_eq!(cfg.listing.default_limit, 10);
        assert_eq!(cfg.listing.max_limit, 100);
        Ok(())
    }

    #[test]
    fn parses_full_document() -> Result<()> {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [storage]
            backend = "file"
            data_file = "var/countries.json"

            [listing]
            default_limit = 25
            max_limit = 50
            "#,
        )?;
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.data_file, PathBuf::from("var/countries.json"));
        assert_eq!(cfg.listing.default_limit, 25);
        Ok(())
    }

    #[test]
    fn partial_server_table_keeps_other_defaults() -> Result<()> {
        let cfg = load_from_str("[server]\nport = 9000")?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");

        let cfg = load_from_str("[server]\nhost = \"0.0.0.0\"")?;
        assert_eq!(cfg.server.port, 8080);
        Ok(())
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(load_from_str("[storage]\nbackend = \"s3\"").is_err());
        assert!(StorageBackend::parse("S3").is_err());
        assert_eq!(StorageBackend::parse(" File ").unwrap(), StorageBackend::File);
    }

    #[test]
    fn server_normalize_fills_blanks_and_rejects_port_zero() {
        let mut s = ServerConfig { host: " ".into(), port: 8080, worker_threads: Some(0) };
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));

        let mut bad = ServerConfig { port: 0, ..ServerConfig::default() };
        assert!(bad.normalize().is_err());
    }

    #[test]
    fn listing_limits_are_validated() {
        assert!(ListingConfig { default_limit: 0, max_limit: 10 }.validate().is_err());
        assert!(ListingConfig { default_limit: 20, max_limit: 10 }.validate().is_err());
        assert!(ListingConfig { default_limit: 10, max_limit: 10 }.validate().is_ok());
    }

    #[test]
    fn storage_collections_must_be_distinct() {
        let cfg = StorageConfig {
            neighbors_collection: "countries".into(),
            ..StorageConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(StorageConfig::default().validate().is_ok());
    }

    #[test]
    fn load_from_missing_file_fails() {
        let path = std::env::temp_dir().join(format!("missing_{}.toml", uuid::Uuid::new_v4()));
        assert!(load_from_file(path.to_str().unwrap()).is_err());
    }
}
