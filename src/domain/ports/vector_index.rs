//! Vector index port.

use async_trait::async_trait;

use crate::domain::errors::StorageResult;
use crate::domain::models::{VectorMatch, VectorRecord};

/// Backend-agnostic k-nearest-neighbor search over one namespace.
///
/// Every vector in a namespace shares the dimensionality and metric fixed
/// by its `NamespaceConfig`; a length mismatch is a `DimensionMismatch`
/// error, never a silent truncation. Results are ordered by descending
/// similarity with ties broken by ascending id. A backend that cannot
/// apply a metadata filter fails with `FilterUnsupported` rather than
/// returning unfiltered results.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Store or overwrite a vector by id.
    async fn upsert(&self, record: VectorRecord) -> StorageResult<()>;

    /// Return up to `k` most similar records to `vector`.
    ///
    /// `filter` is a metadata predicate document in the backend's syntax.
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&serde_json::Value>,
    ) -> StorageResult<Vec<VectorMatch>>;

    /// Fetch a single record by id.
    async fn get(&self, id: &str) -> StorageResult<Option<VectorRecord>>;

    /// Remove a vector by id. Removing an absent id is not an error.
    async fn delete(&self, id: &str) -> StorageResult<()>;
}
