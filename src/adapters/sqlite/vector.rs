//! SQLite implementation of the vector index.
//!
//! Embeddings are stored as little-endian f32 blobs and scored in
//! process. Fine for the embedded single-node case; swap in the HTTP
//! adapter when the corpus outgrows a table scan.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::filter::matches_filter;
use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{rank_matches, NamespaceConfig, VectorMatch, VectorRecord};
use crate::domain::ports::VectorIndex;

const BACKEND: &str = "sqlite";

#[derive(Clone)]
pub struct SqliteVectorIndex {
    pool: SqlitePool,
    namespace: NamespaceConfig,
}

impl SqliteVectorIndex {
    pub fn new(pool: SqlitePool, namespace: NamespaceConfig) -> Self {
        Self { pool, namespace }
    }

    pub fn namespace(&self) -> &NamespaceConfig {
        &self.namespace
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

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for component in vector {
        bytes.extend_from_slice(&component.to_le_bytes());
    }
    bytes
}

fn decode_embedding(bytes: &[u8]) -> StorageResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(StorageError::Serialization(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[derive(sqlx::FromRow)]
struct VectorRow {
    id: String,
    embedding: Vec<u8>,
    metadata: String,
}

impl VectorRow {
    fn into_record(self) -> StorageResult<VectorRecord> {
        Ok(VectorRecord {
            id: self.id,
            vector: decode_embedding(&self.embedding)?,
            metadata: serde_json::from_str(&self.metadata)?,
        })
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> StorageResult<()> {
        self.check_dimension(&record.vector)?;
        let metadata_json = serde_json::to_string(&record.metadata)?;

        sqlx::query(
            r#"INSERT INTO vectors (namespace, id, embedding, metadata)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(namespace, id) DO UPDATE SET
                   embedding = excluded.embedding,
                   metadata = excluded.metadata"#,
        )
        .bind(&self.namespace.name)
        .bind(&record.id)
        .bind(encode_embedding(&record.vector))
        .bind(&metadata_json)
        .execute(&self.pool)
        .await?;

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

        let rows: Vec<VectorRow> = sqlx::query_as(
            "SELECT id, embedding, metadata FROM vectors WHERE namespace = ?",
        )
        .bind(&self.namespace.name)
        .fetch_all(&self.pool)
        .await?;

        let mut matches = Vec::new();
        for row in rows {
            let record = row.into_record()?;
            if let Some(filter) = filter {
                if !matches_filter(BACKEND, &record.metadata, filter)? {
                    continue;
                }
            }
            matches.push(VectorMatch {
                score: self.namespace.metric.score(vector, &record.vector),
                id: record.id,
                metadata: record.metadata,
            });
        }

        rank_matches(&mut matches, k);
        Ok(matches)
    }

    async fn get(&self, id: &str) -> StorageResult<Option<VectorRecord>> {
        let row: Option<VectorRow> = sqlx::query_as(
            "SELECT id, embedding, metadata FROM vectors WHERE namespace = ? AND id = ?",
        )
        .bind(&self.namespace.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VectorRow::into_record).transpose()
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM vectors WHERE namespace = ? AND id = ?")
            .bind(&self.namespace.name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::SimilarityMetric;
    use serde_json::json;

    async fn setup(dimension: usize) -> SqliteVectorIndex {
        let pool = create_migrated_test_pool().await.unwrap();
        let namespace = NamespaceConfig {
            name: "default".to_string(),
            dimension,
            metric: SimilarityMetric::Cosine,
        };
        SqliteVectorIndex::new(pool, namespace)
    }

    fn record(id: &str, vector: Vec<f32>, metadata: serde_json::Value) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            vector,
            metadata,
        }
    }

    #[test]
    fn test_embedding_roundtrip() {
        let original = vec![0.5_f32, -1.25, 3.0];
        let decoded = decode_embedding(&encode_embedding(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        assert!(matches!(
            decode_embedding(&[0, 1, 2]),
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_query_nearest_first() {
        let index = setup(2).await;
        index.upsert(record("a", vec![1.0, 0.0], json!({}))).await.unwrap();
        index.upsert(record("b", vec![0.0, 1.0], json!({}))).await.unwrap();
        index.upsert(record("c", vec![0.9, 0.1], json!({}))).await.unwrap();

        let matches = index.query(&[1.0, 0.0], 2, None).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[1].id, "c");
        assert!(matches[0].score >= matches[1].score);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let index = setup(2).await;
        index.upsert(record("a", vec![1.0, 0.0], json!({"v": 1}))).await.unwrap();
        index.upsert(record("a", vec![0.0, 1.0], json!({"v": 2}))).await.unwrap();

        let fetched = index.get("a").await.unwrap().unwrap();
        assert_eq!(fetched.vector, vec![0.0, 1.0]);
        assert_eq!(fetched.metadata, json!({"v": 2}));
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let index = setup(2).await;
        let err = index
            .upsert(record("a", vec![1.0, 0.0, 0.0], json!({})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::DimensionMismatch { expected: 2, actual: 3 }
        ));
        assert!(index.get("a").await.unwrap().is_none());

        let err = index.query(&[1.0], 5, None).await.unwrap_err();
        assert!(matches!(err, StorageError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_metadata_filter() {
        let index = setup(2).await;
        index
            .upsert(record("a", vec![1.0, 0.0], json!({"kind": "note", "rank": 5})))
            .await
            .unwrap();
        index
            .upsert(record("b", vec![1.0, 0.0], json!({"kind": "task", "rank": 9})))
            .await
            .unwrap();

        let filter = json!({"kind": "task"});
        let matches = index.query(&[1.0, 0.0], 10, Some(&filter)).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "b");

        let filter = json!({"rank": {"$gt": 3}});
        let matches = index.query(&[1.0, 0.0], 10, Some(&filter)).await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let index = setup(2).await;
        index.upsert(record("a", vec![1.0, 0.0], json!({}))).await.unwrap();
        index.delete("a").await.unwrap();
        index.delete("a").await.unwrap();
        assert!(index.get("a").await.unwrap().is_none());
        assert!(index.query(&[1.0, 0.0], 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_namespace_isolation() {
        let pool = create_migrated_test_pool().await.unwrap();
        let ns = |name: &str| NamespaceConfig {
            name: name.to_string(),
            dimension: 2,
            metric: SimilarityMetric::Cosine,
        };
        let left = SqliteVectorIndex::new(pool.clone(), ns("left"));
        let right = SqliteVectorIndex::new(pool, ns("right"));

        left.upsert(record("a", vec![1.0, 0.0], json!({}))).await.unwrap();
        assert!(right.get("a").await.unwrap().is_none());
        assert!(right.query(&[1.0, 0.0], 5, None).await.unwrap().is_empty());
    }
}
