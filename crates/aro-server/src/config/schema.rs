use std::net::SocketAddr;

use serde::Deserialize;
use aro_core::error::{AroError, Result};

/// Upper bound accepted for `query.max_page_size`.
const PAGE_SIZE_CEILING: usize = 100_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AroConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub query: QuerySection,
}

impl Default for AroConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            store: StoreSection::default(),
            query: QuerySection::default(),
        }
    }
}

impl AroConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AroError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.store.validate()?;
        self.query.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            AroError::BadRequest(format!(
                "server.listen must be a valid socket address, got {:?}",
                self.listen
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr().map(|_| ())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Append-only log location (file backend only).
    #[serde(default)]
    pub path: Option<String>,
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::File
            && self.path.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(AroError::BadRequest(
                "store.path is required for the file backend".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerySection {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl QuerySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=PAGE_SIZE_CEILING).contains(&self.max_page_size) {
            return Err(AroError::BadRequest(format!(
                "query.max_page_size must be between 1 and {PAGE_SIZE_CEILING}"
            )));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(AroError::BadRequest(
                "query.default_page_size must be between 1 and query.max_page_size".into(),
            ));
        }
        Ok(())
    }
}

fn default_page_size() -> usize {
    aro_core::query::DEFAULT_PAGE_SIZE
}
fn default_max_page_size() -> usize {
    2000
}
