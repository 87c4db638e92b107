//! Remote vector index speaking the Qdrant-style points HTTP API.
//!
//! Dimension checks happen locally before any request goes out, so a
//! mismatched vector never reaches the wire. Metadata filters are
//! forwarded verbatim for server-side evaluation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{rank_matches, NamespaceConfig, VectorMatch, VectorRecord};
use crate::domain::ports::VectorIndex;

pub struct QdrantVectorIndex {
    client: reqwest::Client,
    base_url: String,
    namespace: NamespaceConfig,
}

impl QdrantVectorIndex {
    pub fn new(base_url: impl Into<String>, namespace: NamespaceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            namespace,
        }
    }

    pub fn namespace(&self) -> &NamespaceConfig {
        &self.namespace
    }

    fn points_url(&self, suffix: &str) -> String {
        format!(
            "{}/collections/{}/points{}",
            self.base_url, self.namespace.name, suffix
        )
    }

    fn check_dimension(&self, vector: &[f32]) -> StorageResult<()> {
        if vector.len() != self.namespace.dimension {
            return Err(StorageError::DimensionMismatch {
                expected: self.namespace.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

fn check_status(response: &reqwest::Response) -> StorageResult<()> {
    let status = response.status();
    if !status.is_success() {
        return Err(StorageError::BackendUnavailable(format!(
            "vector service returned {status} for {}",
            response.url()
        )));
    }
    Ok(())
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    points: Vec<PointPayload<'a>>,
}

#[derive(Serialize)]
struct PointPayload<'a> {
    id: &'a str,
    vector: &'a [f32],
    payload: &'a serde_json::Value,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a serde_json::Value>,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: String,
    score: f32,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Serialize)]
struct RetrieveRequest<'a> {
    ids: Vec<&'a str>,
    with_payload: bool,
    with_vector: bool,
}

#[derive(Deserialize)]
struct RetrieveResponse {
    result: Vec<RetrievedPoint>,
}

#[derive(Deserialize)]
struct RetrievedPoint {
    id: String,
    vector: Vec<f32>,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    points: Vec<&'a str>,
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> StorageResult<()> {
        self.check_dimension(&record.vector)?;

        let body = UpsertRequest {
            points: vec![PointPayload {
                id: &record.id,
                vector: &record.vector,
                payload: &record.metadata,
            }],
        };
        let response = self
            .client
            .put(self.points_url(""))
            .json(&body)
            .send()
            .await?;
        check_status(&response)?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&serde_json::Value>,
    ) -> StorageResult<Vec<VectorMatch>> {
        self.check_dimension(vector)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let body = SearchRequest {
            vector,
            limit: k,
            filter,
            with_payload: true,
        };
        let response = self
            .client
            .post(self.points_url("/search"))
            .json(&body)
            .send()
            .await?;
        check_status(&response)?;

        let parsed: SearchResponse = response.json().await?;
        let mut matches: Vec<VectorMatch> = parsed
            .result
            .into_iter()
            .map(|p| VectorMatch {
                id: p.id,
                score: p.score,
                metadata: p.payload,
            })
            .collect();

        // Re-rank locally so equal scores break ties the same way the
        // embedded backends do.
        rank_matches(&mut matches, k);
        Ok(matches)
    }

    async fn get(&self, id: &str) -> StorageResult<Option<VectorRecord>> {
        let body = RetrieveRequest {
            ids: vec![id],
            with_payload: true,
            with_vector: true,
        };
        let response = self
            .client
            .post(self.points_url(""))
            .json(&body)
            .send()
            .await?;
        check_status(&response)?;

        let parsed: RetrieveResponse = response.json().await?;
        Ok(parsed.result.into_iter().next().map(|p| VectorRecord {
            id: p.id,
            vector: p.vector,
            metadata: p.payload,
        }))
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let body = DeleteRequest { points: vec![id] };
        let response = self
            .client
            .post(self.points_url("/delete"))
            .json(&body)
            .send()
            .await?;
        check_status(&response)?;
        Ok(())
    }
}
