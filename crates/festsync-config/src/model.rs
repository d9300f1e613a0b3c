use std::path::PathBuf;
use std::time::Duration;

use festsync_common::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_SOURCE_DB: &str = "fest_management.db";
pub const DEFAULT_SCHEMA_OUTPUT: &str = "supabase_schema.sql";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    /// Where the destination schema script is written before migrating.
    pub schema_output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SOURCE_DB),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// A destination endpoint that passed validation.
#[derive(Debug, Clone)]
pub struct DestinationTarget {
    pub url: Url,
    pub service_key: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn schema_output(&self) -> PathBuf {
        self.schema_output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_OUTPUT))
    }

    /// Resolve the destination endpoint and credential. Both are required;
    /// a missing one is a startup failure.
    pub fn destination(&self) -> Result<DestinationTarget> {
        let raw_url = self
            .destination
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("SUPABASE_URL is not set".into()))?;

        let service_key = self
            .destination
            .service_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("SUPABASE_SERVICE_KEY is not set".into()))?;

        let url = Url::parse(raw_url)
            .map_err(|e| Error::Config(format!("invalid SUPABASE_URL `{raw_url}`: {e}")))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(Error::Config(format!(
                "SUPABASE_URL must be http(s), got `{}`",
                url.scheme()
            )));
        }

        Ok(DestinationTarget {
            url,
            service_key: service_key.to_string(),
            timeout: Duration::from_secs(self.destination.timeout_secs.max(1)),
        })
    }
}
