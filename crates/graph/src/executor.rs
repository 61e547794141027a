use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::value::NestedValue;

pub const OPEN_TARGETS_ENDPOINT: &str = "https://api.platform.opentargets.org/api/v4/graphql";

/// Query text in the knowledge graph's query language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredQuery(String);

impl StructuredQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StructuredQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Submits structured queries and hands back the decoded `data` container.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &StructuredQuery) -> Result<NestedValue>;
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<NestedValue>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Clone)]
pub struct GraphQlClient {
    endpoint: String,
    client: reqwest::Client,
}

impl GraphQlClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { endpoint, client })
    }

    pub fn open_targets(timeout: Duration) -> Result<Self> {
        Self::new(OPEN_TARGETS_ENDPOINT.to_string(), timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryExecutor for GraphQlClient {
    async fn execute(&self, query: &StructuredQuery) -> Result<NestedValue> {
        debug!(endpoint = %self.endpoint, query = %query, "Submitting GraphQL query");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query: query.as_str() })
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "GraphQL request failed");
                Error::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body, "GraphQL endpoint returned an error status");
            return Err(Error::upstream(Some(status.as_u16()), body));
        }

        decode_response(&body)
    }
}

/// Decode a GraphQL response body into its `data` container.
pub fn decode_response(body: &str) -> Result<NestedValue> {
    let response: GraphQlResponse = serde_json::from_str(body)
        .map_err(|e| Error::decode(format!("invalid GraphQL response body: {e}")))?;

    let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();

    match response.data {
        Some(data) if !data.is_null() => {
            if !messages.is_empty() {
                warn!(errors = ?messages, "GraphQL response carried partial errors");
            }
            Ok(data)
        }
        _ if !messages.is_empty() => Err(Error::upstream(None, messages.join("; "))),
        _ => Err(Error::upstream(None, "GraphQL response had no data")),
    }
}
