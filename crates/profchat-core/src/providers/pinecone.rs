//! Pinecone data-plane client.

use crate::error::{PipelineError, SetupError};
use crate::services::{VectorIndex, VectorQuery};
use async_trait::async_trait;
use log::{debug, info};
use profchat_protocol::RetrievalMatch;
use serde::{Deserialize, Serialize};

/// Control-plane endpoint used to look up an index host.
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
/// REST API version pinned for requests.
const API_VERSION: &str = "2024-07";

/// [`VectorIndex`] backed by a Pinecone serverless index namespace.
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    http: reqwest::Client,
    host: String,
    api_key: String,
    namespace: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RetrievalMatch>,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

impl PineconeIndex {
    pub fn new(
        http: reqwest::Client,
        host: &str,
        api_key: String,
        namespace: String,
    ) -> Self {
        Self {
            http,
            host: normalize_host(host),
            api_key,
            namespace,
        }
    }

    /// Base URL of the data plane, scheme included.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Look up the data-plane host of a named index.
    pub async fn resolve_host(
        http: &reqwest::Client,
        api_key: &str,
        index_name: &str,
    ) -> Result<String, SetupError> {
        Self::resolve_host_at(http, CONTROL_PLANE_URL, api_key, index_name).await
    }

    /// Same as [`PineconeIndex::resolve_host`] against an explicit control plane.
    pub async fn resolve_host_at(
        http: &reqwest::Client,
        control_plane: &str,
        api_key: &str,
        index_name: &str,
    ) -> Result<String, SetupError> {
        let resolve_err = |message: String| SetupError::IndexResolve {
            index: index_name.to_string(),
            message,
        };
        let url = format!(
            "{}/indexes/{}",
            control_plane.trim_end_matches('/'),
            index_name
        );
        debug!("resolving index host (index={})", index_name);
        let response = http
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|err| resolve_err(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(resolve_err(format!("status {status}: {body}")));
        }
        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|err| resolve_err(err.to_string()))?;
        let host = normalize_host(&described.host);
        info!("resolved index host (index={}, host={})", index_name, host);
        Ok(host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, query: VectorQuery) -> Result<Vec<RetrievalMatch>, PipelineError> {
        let body = QueryRequest {
            vector: &query.vector,
            top_k: query.top_k,
            include_metadata: query.include_metadata,
            include_values: false,
            namespace: &self.namespace,
        };
        let response = self
            .http
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| PipelineError::VectorQuery(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::VectorQuery(format!(
                "index returned {status}: {body}"
            )));
        }
        let decoded: QueryResponse = response
            .json()
            .await
            .map_err(|err| PipelineError::VectorQuery(err.to_string()))?;
        debug!(
            "index query complete (namespace={}, matches={})",
            self.namespace,
            decoded.matches.len()
        );
        Ok(decoded.matches)
    }
}

/// Pinecone reports hosts without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[cfg(test)]
mod tests {
    use super::{QueryRequest, QueryResponse, normalize_host};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn bare_hosts_gain_https() {
        assert_eq!(
            normalize_host("rag-abc.svc.pinecone.io"),
            "https://rag-abc.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://127.0.0.1:9/"), "http://127.0.0.1:9");
    }

    #[test]
    fn request_uses_camel_case_fields() {
        let body = QueryRequest {
            vector: &[0.1, 0.2],
            top_k: 5,
            include_metadata: true,
            include_values: false,
            namespace: "ns1",
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["topK"], json!(5));
        assert_eq!(value["includeMetadata"], json!(true));
        assert_eq!(value["includeValues"], json!(false));
        assert_eq!(value["namespace"], json!("ns1"));
    }

    #[test]
    fn response_tolerates_missing_metadata() {
        let decoded: QueryResponse = serde_json::from_value(json!({
            "matches": [
                { "id": "Dr. A", "score": 0.91,
                  "metadata": { "content": "Great", "subject": "Math", "stars": 5 } },
                { "id": "Dr. B", "score": 0.4 }
            ],
            "namespace": "ns1",
            "usage": { "readUnits": 6 }
        }))
        .expect("decode");
        assert_eq!(decoded.matches.len(), 2);
        assert_eq!(decoded.matches[0].metadata.review, "Great");
        assert_eq!(decoded.matches[0].metadata.stars, 5.0);
        assert_eq!(decoded.matches[1].metadata.subject, "");
    }

    #[test]
    fn response_without_matches_is_empty() {
        let decoded: QueryResponse = serde_json::from_value(json!({})).expect("decode");
        assert!(decoded.matches.is_empty());
    }
}
