use crate::embeddings::Embedder;
use crate::error::EmbeddingError;
use crate::models::{HybridWeights, SearchResponse};
use crate::traits::DocumentIndex;
use tracing::warn;

/// Issues hybrid and vector-only queries against the document index.
///
/// An unreachable engine degrades to an empty result set instead of an
/// error; the response's `degraded` flag tells a legitimate zero-hit
/// search apart from that fallback. A failed query embedding is a real
/// error and propagates.
pub struct HybridSearcher<E, I>
where
    E: Embedder,
    I: DocumentIndex,
{
    embedder: E,
    index: I,
    weights: HybridWeights,
}

impl<E, I> HybridSearcher<E, I>
where
    E: Embedder,
    I: DocumentIndex,
{
    pub fn new(embedder: E, index: I, weights: HybridWeights) -> Self {
        Self {
            embedder,
            index,
            weights,
        }
    }

    /// Embeds the query text and runs the combined lexical + vector
    /// query.
    pub async fn search(
        &self,
        query_text: &str,
        top_k: usize,
    ) -> Result<SearchResponse, EmbeddingError> {
        let query_vector = self.embedder.embed(query_text).await?;
        Ok(self
            .search_with_vector(query_text, &query_vector, top_k)
            .await)
    }

    /// Hybrid query with a caller-supplied embedding.
    pub async fn search_with_vector(
        &self,
        query_text: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> SearchResponse {
        match self
            .index
            .search_hybrid(query_text, query_vector, top_k, self.weights)
            .await
        {
            Ok(hits) => SearchResponse {
                hits,
                degraded: false,
            },
            Err(error) => {
                warn!(%error, "hybrid search degraded to empty results");
                SearchResponse {
                    hits: Vec::new(),
                    degraded: true,
                }
            }
        }
    }

    /// Vector-only query with a caller-supplied embedding.
    pub async fn search_vector(&self, query_vector: &[f32], top_k: usize) -> SearchResponse {
        match self.index.search_vector(query_vector, top_k).await {
            Ok(hits) => SearchResponse {
                hits,
                degraded: false,
            },
            Err(error) => {
                warn!(%error, "vector search degraded to empty results");
                SearchResponse {
                    hits: Vec::new(),
                    degraded: true,
                }
            }
        }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}
