//! Thin Elasticsearch REST client.
//!
//! Only the handful of endpoints the movie index needs: cluster info, index
//! management, bulk indexing, refresh, count and search.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use super::config::SearchConfig;
use super::SearchError;

/// Cluster name and version reported by `GET /`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub cluster_name: String,
    pub version: ClusterVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterVersion {
    pub number: String,
}

/// A raw hit from a `_search` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// Elasticsearch client bound to one cluster.
#[derive(Debug, Clone)]
pub struct SearchClient {
    base_url: String,
    client: Client,
}

impl SearchClient {
    /// Build a client from configuration.
    ///
    /// The API key, when present, is sent on every request.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let parsed = Url::parse(&config.url)
            .map_err(|e| SearchError::InvalidConfig(format!("{}: {}", config.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::InvalidConfig(format!(
                "{}: unsupported scheme {}",
                config.url,
                parsed.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(ref key) = config.api_key {
            let mut value = HeaderValue::from_str(&format!("ApiKey {}", key))
                .map_err(|e| SearchError::InvalidConfig(format!("invalid API key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode a JSON body, mapping non-2xx to an error.
    async fn send_json(&self, request: RequestBuilder) -> Result<Value, SearchError> {
        let resp = request
            .send()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))
    }

    /// Fetch cluster name and version.
    pub async fn info(&self) -> Result<ClusterInfo, SearchError> {
        let body = self.send_json(self.client.get(self.url("/"))).await?;
        serde_json::from_value(body).map_err(|e| SearchError::Parse(e.to_string()))
    }

    /// Check whether an index exists.
    pub async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let resp = self
            .client
            .head(self.url(index))
            .send()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(SearchError::Api {
                status: s.as_u16(),
                body: String::new(),
            }),
        }
    }

    /// Create an index for segments with vectors of `dims` dimensions.
    pub async fn create_index(&self, index: &str, dims: usize) -> Result<(), SearchError> {
        let mapping = index_mapping(dims);
        self.send_json(self.client.put(self.url(index)).json(&mapping))
            .await?;
        info!("Created index {} ({} dimensions)", index, dims);
        Ok(())
    }

    /// Delete an index. A missing index is not an error.
    pub async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        match self.send_json(self.client.delete(self.url(index))).await {
            Ok(_) => {
                info!("Deleted index {}", index);
                Ok(())
            }
            Err(SearchError::Api { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Index documents in one bulk request.
    pub async fn bulk(&self, index: &str, docs: &[(String, Value)]) -> Result<(), SearchError> {
        if docs.is_empty() {
            return Ok(());
        }

        let body = bulk_body(index, docs)?;
        debug!("Sending bulk request with {} documents", docs.len());
        let value = self
            .send_json(
                self.client
                    .post(self.url("_bulk"))
                    .header(CONTENT_TYPE, "application/x-ndjson")
                    .body(body),
            )
            .await?;

        let resp: BulkResponse =
            serde_json::from_value(value).map_err(|e| SearchError::Parse(e.to_string()))?;
        if resp.errors {
            return Err(SearchError::Bulk(first_bulk_failure(&resp.items)));
        }
        Ok(())
    }

    /// Make recent writes visible to search.
    pub async fn refresh(&self, index: &str) -> Result<(), SearchError> {
        self.send_json(self.client.post(self.url(&format!("{}/_refresh", index))))
            .await?;
        debug!("Refreshed index {}", index);
        Ok(())
    }

    /// Number of documents in an index.
    pub async fn count(&self, index: &str) -> Result<u64, SearchError> {
        let value = self
            .send_json(self.client.get(self.url(&format!("{}/_count", index))))
            .await?;
        let resp: CountResponse =
            serde_json::from_value(value).map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(resp.count)
    }

    /// Run a search request and return its hits.
    pub async fn search(&self, index: &str, body: &Value) -> Result<Vec<RawHit>, SearchError> {
        let value = self
            .send_json(
                self.client
                    .post(self.url(&format!("{}/_search", index)))
                    .json(body),
            )
            .await?;
        let resp: SearchResponse =
            serde_json::from_value(value).map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(resp.hits.hits)
    }
}

/// Mapping for segment documents.
pub fn index_mapping(dims: usize) -> Value {
    json!({
        "mappings": {
            "properties": {
                "text": { "type": "text" },
                "vector": {
                    "type": "dense_vector",
                    "dims": dims,
                    "index": true,
                    "similarity": "cosine"
                },
                "metadata": { "type": "object" }
            }
        }
    })
}

/// Render documents as an NDJSON bulk body.
pub fn bulk_body(index: &str, docs: &[(String, Value)]) -> Result<String, SearchError> {
    let mut body = String::new();
    for (id, doc) in docs {
        let action = json!({ "index": { "_index": index, "_id": id } });
        body.push_str(&action.to_string());
        body.push('\n');
        body.push_str(
            &serde_json::to_string(doc).map_err(|e| SearchError::Parse(e.to_string()))?,
        );
        body.push('\n');
    }
    Ok(body)
}

/// Describe the first failed item of a bulk response.
fn first_bulk_failure(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(|item| item.as_object()?.values().next())
        .find_map(|op| {
            let error = op.get("error")?;
            let id = op.get("_id").and_then(Value::as_str).unwrap_or("?");
            let reason = error
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unknown reason");
            Some(format!("document {}: {}", id, reason))
        })
        .unwrap_or_else(|| "bulk request reported errors".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_body_is_ndjson() {
        let docs = vec![
            ("a".to_string(), json!({"text": "one"})),
            ("b".to_string(), json!({"text": "two"})),
        ];
        let body = bulk_body("movies", &docs).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));

        let action: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(action["index"]["_index"], "movies");
        assert_eq!(action["index"]["_id"], "b");
        let source: Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(source["text"], "two");
    }

    #[test]
    fn test_mapping_declares_vector_dims() {
        let mapping = index_mapping(768);
        let vector = &mapping["mappings"]["properties"]["vector"];
        assert_eq!(vector["type"], "dense_vector");
        assert_eq!(vector["dims"], 768);
        assert_eq!(vector["similarity"], "cosine");
    }

    #[test]
    fn test_first_bulk_failure_reports_reason() {
        let items = vec![
            json!({"index": {"_id": "ok", "status": 201}}),
            json!({"index": {"_id": "bad", "status": 400, "error": {
                "type": "mapper_parsing_exception",
                "reason": "dims mismatch"
            }}}),
        ];
        assert_eq!(first_bulk_failure(&items), "document bad: dims mismatch");
        assert_eq!(first_bulk_failure(&[]), "bulk request reported errors");
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = SearchConfig::default().with_url("ftp://localhost:9200");
        assert!(matches!(
            SearchClient::new(&config),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_api_key_unusable_as_header() {
        let config = SearchConfig::default().with_api_key("line\nbreak");
        match SearchClient::new(&config) {
            Err(SearchError::InvalidConfig(message)) => assert!(message.contains("API key")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = SearchConfig::default().with_url("http://localhost:9200/");
        let client = SearchClient::new(&config).unwrap();
        assert_eq!(client.url("/default/_refresh"), "http://localhost:9200/default/_refresh");
        assert_eq!(client.url("/"), "http://localhost:9200/");
    }
}
