use crate::error::IndexError;
use crate::models::{HybridWeights, IndexedDocument, SearchHit};
use async_trait::async_trait;

/// Remote document index seam: schema setup, idempotent writes, and the
/// two query shapes the searcher issues.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Creates the index with its field mapping if it does not exist.
    /// A no-op when the index is already present.
    async fn ensure_schema(&self, vector_dimension: usize) -> Result<(), IndexError>;

    /// Writes one document by id; a second write with the same id
    /// replaces the first.
    async fn upsert(&self, document: &IndexedDocument) -> Result<(), IndexError>;

    /// Combined lexical + vector query. A document matching both signals
    /// accumulates both weighted scores. Ties come back in engine order,
    /// which is not deterministic.
    async fn search_hybrid(
        &self,
        query_text: &str,
        query_vector: &[f32],
        top_k: usize,
        weights: HybridWeights,
    ) -> Result<Vec<SearchHit>, IndexError>;

    /// Approximate-nearest-neighbor query over embeddings only.
    async fn search_vector(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>, IndexError>;
}
