//! In-process vector index with exact k-NN.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::adapters::filter::matches_filter;
use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{rank_matches, NamespaceConfig, VectorMatch, VectorRecord};
use crate::domain::ports::VectorIndex;

const BACKEND: &str = "memory";

/// Exact-scan vector index for one namespace.
pub struct InMemoryVectorIndex {
    namespace: NamespaceConfig,
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl InMemoryVectorIndex {
    pub fn new(namespace: NamespaceConfig) -> Self {
        Self { namespace, records: RwLock::new(HashMap::new()) }
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

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> StorageResult<()> {
        self.check_dimension(&record.vector)?;
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&serde_json::Value>,
    ) -> StorageResult<Vec<VectorMatch>> {
        self.check_dimension(vector)?;

        let records = self.records.read().await;
        let mut matches = Vec::new();
        for record in records.values() {
            if let Some(filter) = filter {
                if !matches_filter(BACKEND, &record.metadata, filter)? {
                    continue;
                }
            }
            matches.push(VectorMatch {
                id: record.id.clone(),
                score: self.namespace.metric.score(vector, &record.vector),
                metadata: record.metadata.clone(),
            });
        }

        rank_matches(&mut matches, k);
        Ok(matches)
    }

    async fn get(&self, id: &str) -> StorageResult<Option<VectorRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        self.records.write().await.remove(id);
        Ok(())
    }
}
