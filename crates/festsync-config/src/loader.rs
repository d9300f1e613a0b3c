use std::path::{Path, PathBuf};

use festsync_common::{Error, Result};
use tracing::{debug, info};

use crate::model::AppConfig;

const DEFAULT_CONFIG_FILES: &[&str] = &["festsync.yml", "festsync.yaml", "festsync.toml"];

/// Builds an [`AppConfig`] from an optional config file, a `.env` file and
/// the process environment, in increasing order of precedence.
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// `path` is an explicit config file; when `None` the loader looks for
    /// `festsync.{yml,yaml,toml}` in the working directory.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<AppConfig> {
        if let Ok(dotenv) = dotenvy::dotenv() {
            debug!("loaded environment from {}", dotenv.display());
        }
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigLoader::load`] but reads variables through `lookup`
    /// and skips the `.env` file.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_file()? {
            Some(path) => {
                info!("loading config from {}", path.display());
                parse_config_file(&path)?
            }
            None => AppConfig::default(),
        };
        apply_env(&mut config, lookup)?;
        Ok(config)
    }

    fn config_file(&self) -> Result<Option<PathBuf>> {
        match &self.path {
            Some(path) if path.exists() => Ok(Some(path.clone())),
            Some(path) => Err(Error::Config(format!(
                "config file {} does not exist",
                path.display()
            ))),
            None => Ok(DEFAULT_CONFIG_FILES
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())),
        }
    }
}

fn parse_config_file(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yml" | "yaml" => serde_yaml::from_str(&contents)
            .map_err(|e| Error::Config(format!("YAML parse error in {}: {e}", path.display()))),
        "toml" => toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("TOML parse error in {}: {e}", path.display()))),
        other => Err(Error::Config(format!(
            "unsupported config extension: {other}"
        ))),
    }
}

fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("SUPABASE_URL") {
        config.destination.url = Some(url);
    }
    if let Some(key) = get("SUPABASE_SERVICE_KEY").or_else(|| get("SUPABASE_SERVICE_ROLE_KEY")) {
        config.destination.service_key = Some(key);
    }
    if let Some(path) = get("FESTSYNC_SOURCE_DB") {
        config.source.path = PathBuf::from(path);
    }
    if let Some(path) = get("FESTSYNC_SCHEMA_OUT") {
        config.schema_output = Some(PathBuf::from(path));
    }
    if let Some(secs) = get("FESTSYNC_TIMEOUT_SECS") {
        config.destination.timeout_secs = secs.trim().parse().map_err(|_| {
            Error::Config(format!("FESTSYNC_TIMEOUT_SECS must be a number, got `{secs}`"))
        })?;
    }
    Ok(())
}
