//! Vector record and namespace models for k-NN retrieval.

use serde::{Deserialize, Serialize};

/// Similarity metric for a vector namespace, fixed at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    Cosine,
    Euclidean,
    #[serde(rename = "dotproduct")]
    DotProduct,
}

impl SimilarityMetric {
    /// Similarity score between two vectors of equal length.
    ///
    /// Higher is always more similar: euclidean distance is negated so the
    /// maximum score for an exact match is 0.0 (cosine: 1.0, dot: unbounded).
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::Euclidean => -euclidean_distance(a, b),
            SimilarityMetric::DotProduct => dot_product(a, b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::Cosine => "cosine",
            SimilarityMetric::Euclidean => "euclidean",
            SimilarityMetric::DotProduct => "dotproduct",
        }
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot_product(a, b);
    let mag_a = dot_product(a, a).sqrt();
    let mag_b = dot_product(b, b).sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Configuration of one logical vector namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub name: String,
    /// Required dimensionality of every vector in the namespace.
    pub dimension: usize,
    pub metric: SimilarityMetric,
}

impl NamespaceConfig {
    pub fn new(name: impl Into<String>, dimension: usize, metric: SimilarityMetric) -> Self {
        Self { name: name.into(), dimension, metric }
    }
}

/// A stored vector with attached metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique within the namespace.
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, metadata: serde_json::Value) -> Self {
        Self { id: id.into(), vector, metadata }
    }
}

/// One query result, ordered by descending similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: serde_json::Value,
}

/// Sort matches by descending score, breaking ties by ascending id so
/// results are deterministic across runs and backends.
pub fn rank_matches(matches: &mut Vec<VectorMatch>, k: usize) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    matches.truncate(k);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cosine_identical_is_one() {
        let v = vec![1.0, 0.0, 0.0];
        let score = SimilarityMetric::Cosine.score(&v, &v);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        let score = SimilarityMetric::Cosine.score(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(score.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let score = SimilarityMetric::Cosine.score(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_euclidean_identical_is_max() {
        let v = vec![3.0, 4.0];
        assert_eq!(SimilarityMetric::Euclidean.score(&v, &v), 0.0);
        assert!(SimilarityMetric::Euclidean.score(&v, &[0.0, 0.0]) < 0.0);
    }

    #[test]
    fn test_dot_product() {
        let score = SimilarityMetric::DotProduct.score(&[1.0, 2.0], &[3.0, 4.0]);
        assert!((score - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_matches_orders_and_truncates() {
        let mut matches = vec![
            VectorMatch { id: "b".into(), score: 0.5, metadata: json!({}) },
            VectorMatch { id: "a".into(), score: 0.9, metadata: json!({}) },
            VectorMatch { id: "c".into(), score: 0.5, metadata: json!({}) },
        ];
        rank_matches(&mut matches, 2);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        // tie between b and c broken by ascending id
        assert_eq!(matches[1].id, "b");
    }
}
