mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, io::ErrorKind, path::PathBuf};

/// Configuration plus the warnings raised while loading it.
///
/// Loading happens before the subscriber is installed, so warnings are
/// handed back to the caller to be logged once tracing is up.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub config: Config,
    pub warnings: Vec<String>,
}

pub async fn load() -> Result<Loaded> {
    let mut warnings = Vec::new();

    if let Err(e) = dotenvy::dotenv() {
        warnings.push(format!(".env file not loaded: {}", e));
    }

    let explicit_path = env::var("CONFIG_PATH").ok();
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| "config.yaml".to_string());

    let yaml = match tokio::fs::read_to_string(&config_path).await {
        Ok(contents) => Some(contents),
        // The default path is optional, an explicit one is not
        Err(e) if e.kind() == ErrorKind::NotFound && explicit_path.is_none() => None,
        Err(e) => {
            return Err(Error::config(format!(
                "Failed to read {}: {}",
                config_path, e
            )));
        }
    };

    let mut loaded = from_sources(yaml.as_deref(), |key| env::var(key).ok())?;
    warnings.append(&mut loaded.warnings);
    loaded.warnings = warnings;

    Ok(loaded)
}

/// Builds the configuration from an optional YAML document and an
/// environment lookup. Environment values win over the document.
pub fn from_sources<F>(yaml: Option<&str>, lookup: F) -> Result<Loaded>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = match yaml {
        Some(doc) if !doc.trim().is_empty() => serde_yaml::from_str(doc)?,
        _ => Config::default(),
    };
    let mut warnings = Vec::new();

    let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

    match var("PORT") {
        Some(port) => {
            config.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("Invalid PORT value: '{}'", port)))?;
        }
        None => warnings.push(format!(
            "PORT environment variable not set. Defaulting to {}",
            config.server.port
        )),
    }

    if let Some(host) = var("HOST") {
        config.server.host = host;
    }
    if let Some(dir) = var("STATIC_DIR") {
        config.server.static_dir = PathBuf::from(dir);
    }
    if let Some(base_url) = var("OLLAMA_BASE_URL") {
        config.llm.base_url = base_url;
    }
    if let Some(model) = var("LLM_MODEL") {
        config.llm.model = model;
    }

    Ok(Loaded { config, warnings })
}
