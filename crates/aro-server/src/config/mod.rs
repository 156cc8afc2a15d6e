//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use aro_core::error::{AroError, Result};

pub use schema::{AroConfig, QuerySection, ServerSection, StoreBackend, StoreSection};

pub fn load_from_file(path: &str) -> Result<AroConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AroError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

/// Like `load_from_file`, but a missing file yields the built-in defaults.
pub fn load_or_default(path: &str) -> Result<AroConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            let cfg = AroConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
        Err(e) => Err(AroError::Internal(format!("read config failed: {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<AroConfig> {
    let cfg: AroConfig = serde_yaml::from_str(s)
        .map_err(|e| AroError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
