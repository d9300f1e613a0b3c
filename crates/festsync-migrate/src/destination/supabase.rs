use std::time::Duration;

use async_trait::async_trait;
use festsync_common::{Error, Result};
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use super::Destination;
use crate::mapping::DestinationRecord;

const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";
const PREFER_INSERT: &str = "return=minimal";
const PREFER_COUNT: &str = "count=exact";

/// Writes rows through the Supabase REST (PostgREST) API using the
/// service-role key.
pub struct SupabaseDestination {
    client: Client,
    rest_base: Url,
    service_key: String,
}

impl SupabaseDestination {
    pub fn new(project_url: &Url, service_key: &str, timeout: Duration) -> Result<Self> {
        let mut base = project_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_base = base
            .join("rest/v1/")
            .map_err(|e| Error::Config(format!("invalid Supabase URL {project_url}: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Destination(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            rest_base,
            service_key: service_key.to_string(),
        })
    }

    fn endpoint(&self, table: &str) -> Result<Url> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::Destination(format!("invalid table name `{table}`")));
        }
        self.rest_base
            .join(table)
            .map_err(|e| Error::Destination(format!("failed to build URL for {table}: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, request: RequestBuilder, action: &str, table: &str) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Error::Destination(format!("{action} {table}: request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Destination(format!(
            "{action} {table}: {status}: {}",
            body.trim()
        )))
    }
}

#[async_trait]
impl Destination for SupabaseDestination {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn upsert(
        &self,
        table: &str,
        conflict_column: &str,
        record: &DestinationRecord,
    ) -> Result<()> {
        let mut url = self.endpoint(table)?;
        url.query_pairs_mut()
            .append_pair("on_conflict", conflict_column);
        debug!("POST {url} (upsert)");

        let request = self
            .client
            .post(url)
            .header("Prefer", PREFER_UPSERT)
            .json(record);
        self.send(request, "upsert into", table).await?;
        Ok(())
    }

    async fn insert(&self, table: &str, record: &DestinationRecord) -> Result<()> {
        let url = self.endpoint(table)?;
        debug!("POST {url} (insert)");

        let request = self
            .client
            .post(url)
            .header("Prefer", PREFER_INSERT)
            .json(record);
        self.send(request, "insert into", table).await?;
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<u64> {
        let mut url = self.endpoint(table)?;
        url.query_pairs_mut().append_pair("select", "*");

        let request = self.client.head(url).header("Prefer", PREFER_COUNT);
        let response = self.send(request, "count", table).await?;

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                Error::Destination(format!("count {table}: response has no Content-Range"))
            })?;
        parse_content_range_total(range).ok_or_else(|| {
            Error::Destination(format!("count {table}: unexpected Content-Range `{range}`"))
        })
    }
}

/// Total from a PostgREST `Content-Range` such as `0-24/57` or `*/0`.
fn parse_content_range_total(range: &str) -> Option<u64> {
    let (_, total) = range.rsplit_once('/')?;
    total.trim().parse().ok()
}
