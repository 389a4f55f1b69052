use crate::error::IndexError;
use crate::models::{HybridWeights, IndexedDocument, SearchHit};
use crate::traits::DocumentIndex;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// OpenSearch-backed document index. One shared HTTP client per
/// instance; construct once and inject wherever index access is needed.
pub struct OpenSearchIndex {
    client: Arc<Client>,
    endpoint: String,
    index_name: String,
}

impl OpenSearchIndex {
    pub fn new(
        endpoint: impl AsRef<str>,
        index_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IndexError> {
        let parsed = Url::parse(endpoint.as_ref())?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: parsed.as_str().trim_end_matches('/').to_string(),
            index_name: index_name.into(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.index_name)
    }

    async fn run_query(&self, body: Value) -> Result<Vec<SearchHit>, IndexError> {
        let response = self
            .client
            .post(format!("{}/_search", self.index_url()))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                status: response.status().as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        let payload: Value = response.json().await?;
        Ok(parse_hits(&payload))
    }
}

#[async_trait]
impl DocumentIndex for OpenSearchIndex {
    async fn ensure_schema(&self, vector_dimension: usize) -> Result<(), IndexError> {
        let response = self.client.head(self.index_url()).send().await?;

        if response.status() == StatusCode::OK {
            return Ok(());
        }
        if !response.status().is_client_error() {
            return Err(IndexError::BackendResponse {
                status: response.status().as_u16(),
                details: "index existence check failed".to_string(),
            });
        }

        let response = self
            .client
            .put(self.index_url())
            .json(&schema_body(vector_dimension))
            .send()
            .await?;

        let status = response.status();
        let details = if status.is_success() {
            String::new()
        } else {
            response.text().await.unwrap_or_default()
        };
        classify_create_response(status, &details)
    }

    async fn upsert(&self, document: &IndexedDocument) -> Result<(), IndexError> {
        let response = self
            .client
            .put(format!("{}/_doc/{}", self.index_url(), document.id))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                status: response.status().as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    async fn search_hybrid(
        &self,
        query_text: &str,
        query_vector: &[f32],
        top_k: usize,
        weights: HybridWeights,
    ) -> Result<Vec<SearchHit>, IndexError> {
        self.run_query(hybrid_query_body(query_text, query_vector, top_k, weights))
            .await
    }

    async fn search_vector(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>, IndexError> {
        self.run_query(vector_query_body(query_vector, top_k)).await
    }
}

/// Classifies the index-creation response. Two processes can both
/// observe the index as absent; the loser's create fails with
/// `resource_already_exists_exception`, which is still success.
fn classify_create_response(status: StatusCode, details: &str) -> Result<(), IndexError> {
    if status.is_success() {
        return Ok(());
    }
    if details.contains("resource_already_exists_exception") {
        return Ok(());
    }
    Err(IndexError::SchemaCreate(details.to_string()))
}

fn schema_body(vector_dimension: usize) -> Value {
    json!({
        "settings": {
            "index": {
                "knn": true,
                "number_of_shards": 1,
                "number_of_replicas": 0
            }
        },
        "mappings": {
            "properties": {
                "text": {
                    "type": "text",
                    "analyzer": "standard"
                },
                "embedding": {
                    "type": "knn_vector",
                    "dimension": vector_dimension,
                    "method": {
                        "name": "hnsw",
                        "space_type": "cosinesimil",
                        "engine": "nmslib"
                    }
                },
                "source": {
                    "type": "keyword"
                },
                "chunk_index": {
                    "type": "integer"
                },
                "metadata": {
                    "type": "object",
                    "properties": {
                        "document_type": {"type": "keyword"},
                        "source_file": {"type": "keyword"},
                        "chunk_number": {"type": "integer"},
                        "total_chunks": {"type": "integer"}
                    }
                }
            }
        }
    })
}

fn hybrid_query_body(
    query_text: &str,
    query_vector: &[f32],
    top_k: usize,
    weights: HybridWeights,
) -> Value {
    json!({
        "size": top_k,
        "query": {
            "bool": {
                "should": [
                    {
                        "match": {
                            "text": {
                                "query": query_text,
                                "boost": weights.lexical
                            }
                        }
                    },
                    {
                        "knn": {
                            "embedding": {
                                "vector": query_vector,
                                "k": top_k,
                                "boost": weights.vector
                            }
                        }
                    }
                ]
            }
        },
        "_source": ["text", "source", "metadata", "chunk_index"]
    })
}

fn vector_query_body(query_vector: &[f32], top_k: usize) -> Value {
    json!({
        "size": top_k,
        "query": {
            "knn": {
                "embedding": {
                    "vector": query_vector,
                    "k": top_k
                }
            }
        },
        "_source": ["text", "source", "metadata", "chunk_index"]
    })
}

fn parse_hits(payload: &Value) -> Vec<SearchHit> {
    let hits = payload
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    hits.into_iter()
        .map(|raw| {
            let source = raw.pointer("/_source").cloned().unwrap_or(Value::Null);
            SearchHit {
                id: raw
                    .pointer("/_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                score: raw.pointer("/_score").and_then(Value::as_f64).unwrap_or(0.0),
                text: source
                    .pointer("/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                source: source
                    .pointer("/source")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                chunk_index: source
                    .pointer("/chunk_index")
                    .and_then(Value::as_u64)
                    .map(|index| index as usize),
                metadata: source
                    .pointer("/metadata")
                    .cloned()
                    .and_then(|value| serde_json::from_value(value).ok()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_must_be_a_url() {
        let result = OpenSearchIndex::new("not a url", "handbooks", Duration::from_secs(5));
        assert!(matches!(result, Err(IndexError::Endpoint(_))));
    }

    #[test]
    fn schema_carries_vector_dimension_and_nested_metadata() {
        let body = schema_body(384);
        assert_eq!(
            body.pointer("/mappings/properties/embedding/dimension"),
            Some(&json!(384))
        );
        assert_eq!(
            body.pointer("/mappings/properties/embedding/method/space_type"),
            Some(&json!("cosinesimil"))
        );
        assert_eq!(
            body.pointer("/mappings/properties/source/type"),
            Some(&json!("keyword"))
        );
        assert_eq!(
            body.pointer("/mappings/properties/metadata/properties/total_chunks/type"),
            Some(&json!("integer"))
        );
        assert_eq!(body.pointer("/settings/index/knn"), Some(&json!(true)));
    }

    #[test]
    fn hybrid_query_accumulates_both_signals() {
        let body = hybrid_query_body("offside rule", &[0.1, 0.2], 5, HybridWeights::default());
        let clauses = body
            .pointer("/query/bool/should")
            .and_then(Value::as_array)
            .expect("should clauses");

        assert_eq!(clauses.len(), 2);
        assert_eq!(
            clauses[0].pointer("/match/text/boost"),
            Some(&json!(1.0))
        );
        assert_eq!(
            clauses[1].pointer("/knn/embedding/boost"),
            Some(&json!(2.0))
        );
        assert_eq!(clauses[1].pointer("/knn/embedding/k"), Some(&json!(5)));
        assert_eq!(body.pointer("/size"), Some(&json!(5)));
    }

    #[test]
    fn vector_query_is_knn_only() {
        let body = vector_query_body(&[0.3, 0.4], 3);
        assert!(body.pointer("/query/knn/embedding/vector").is_some());
        assert!(body.pointer("/query/bool").is_none());
    }

    #[test]
    fn hits_are_parsed_with_metadata() {
        let payload = json!({
            "hits": {
                "hits": [
                    {
                        "_id": "abc",
                        "_score": 3.5,
                        "_source": {
                            "text": "the offside rule",
                            "source": "handbooks/rugby.pdf",
                            "chunk_index": 2,
                            "metadata": {
                                "document_type": "sports_handbook",
                                "source_file": "handbooks/rugby.pdf",
                                "chunk_number": 2,
                                "total_chunks": 3
                            }
                        }
                    }
                ]
            }
        });

        let hits = parse_hits(&payload);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "abc");
        assert_eq!(hits[0].score, 3.5);
        assert_eq!(hits[0].chunk_index, Some(2));
        let metadata = hits[0].metadata.as_ref().expect("metadata present");
        assert_eq!(metadata.total_chunks, 3);
    }

    #[test]
    fn malformed_payload_parses_to_no_hits() {
        assert!(parse_hits(&json!({"took": 3})).is_empty());
    }

    #[test]
    fn successful_creation_is_success() {
        assert!(classify_create_response(StatusCode::OK, "").is_ok());
    }

    #[test]
    fn lost_creation_race_counts_as_success() {
        let body = r#"{"error":{"type":"resource_already_exists_exception","reason":"index [handbooks] already exists"}}"#;
        assert!(classify_create_response(StatusCode::BAD_REQUEST, body).is_ok());
    }

    #[test]
    fn other_creation_failures_surface_as_schema_errors() {
        let result = classify_create_response(StatusCode::FORBIDDEN, "blocked by cluster policy");
        assert!(matches!(result, Err(IndexError::SchemaCreate(_))));
    }
}
