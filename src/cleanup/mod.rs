//! Removal of synthetic records created by POST/PUT traffic.
use std::collections::BTreeSet;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::args::EndpointSpec;
use crate::error::HttpError;
use crate::http::endpoint_url;


const TEXT_FIELDS: [&str; 3] = ["name", "email", "description"];

/// True for records that look generated: "test" in name, email, or
/// description (any case), or `metadata.test_data == true`.
#[must_use]
pub fn is_test_data(record: &Value) -> bool {
    let text_match = TEXT_FIELDS.iter().any(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase().contains("test"))
    });
    let flagged = record
        .get("metadata")
        .and_then(|metadata| metadata.get("test_data"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    text_match || flagged
}

/// Nonzero integral ids only; `0`, `0.0` and fractional numbers have no id.
fn numeric_id(id: &serde_json::Number) -> Option<String> {
    let integral = id
        .as_u64()
        .map(i128::from)
        .or_else(|| id.as_i64().map(i128::from))?;
    (integral != 0).then(|| integral.to_string())
}

/// Record id as used in `{path}/{id}`; null, empty, and zero ids are skipped.
fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => numeric_id(id),
        Value::Null
        | Value::Bool(_)
        | Value::String(_)
        | Value::Array(_)
        | Value::Object(_) => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathCleanup {
    pub path: String,
    pub matched: u64,
    pub deleted: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub paths: Vec<PathCleanup>,
    pub deleted: u64,
}

pub struct CleanupRunner {
    client: Client,
    base_url: Url,
}

impl CleanupRunner {
    #[must_use]
    pub const fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Cleans every distinct POST/PUT path. A failing path is logged and
    /// reported; the remaining paths are still processed.
    pub async fn run(&self, endpoints: &[EndpointSpec]) -> CleanupReport {
        let paths: BTreeSet<&str> = endpoints
            .iter()
            .filter(|endpoint| endpoint.method.carries_body())
            .map(|endpoint| endpoint.path.as_str())
            .collect();

        let mut report = CleanupReport::default();
        for path in paths {
            let mut entry = PathCleanup {
                path: path.to_owned(),
                ..PathCleanup::default()
            };
            if let Err(err) = self.clean_path(path, &mut entry).await {
                error!("Cleanup of {} failed: {}", path, err);
                entry.error = Some(err.to_string());
            }
            report.deleted = report.deleted.saturating_add(entry.deleted);
            report.paths.push(entry);
        }

        if report.deleted > 0 {
            info!("Cleaned up {} test resources", report.deleted);
        } else {
            info!("No test data found to clean up");
        }
        report
    }

    async fn clean_path(&self, path: &str, entry: &mut PathCleanup) -> Result<(), HttpError> {
        let list_url = endpoint_url(&self.base_url, path)?;
        let response = self
            .client
            .get(list_url.clone())
            .send()
            .await
            .map_err(|err| HttpError::RequestFailed {
                url: list_url.to_string(),
                source: err,
            })?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(HttpError::ListStatus {
                url: list_url.to_string(),
                status,
            });
        }
        let body: Value = response
            .json()
            .await
            .map_err(|err| HttpError::RequestFailed {
                url: list_url.to_string(),
                source: err,
            })?;
        let Value::Array(records) = body else {
            return Err(HttpError::ListNotArray {
                url: list_url.to_string(),
            });
        };

        let base_path = path.trim_end_matches('/');
        for record in records.iter().filter(|record| is_test_data(record)) {
            let Some(id) = record_id(record) else {
                debug!("Skipping test record without id under {}", path);
                continue;
            };
            entry.matched = entry.matched.saturating_add(1);
            let delete_url = endpoint_url(&self.base_url, &format!("{}/{}", base_path, id))?;
            match self.client.delete(delete_url.clone()).send().await {
                Ok(response) if matches!(response.status().as_u16(), 200 | 204) => {
                    entry.deleted = entry.deleted.saturating_add(1);
                    let label = record
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or(id.as_str());
                    info!("Deleted test resource: {}", label);
                }
                Ok(response) => warn!(
                    "DELETE {} returned {}",
                    delete_url,
                    response.status().as_u16()
                ),
                Err(err) => warn!("DELETE {} failed: {}", delete_url, err),
            }
        }
        Ok(())
    }
}
