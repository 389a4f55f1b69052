use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nested metadata persisted with every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_type: String,
    pub source_file: String,
    pub chunk_number: usize,
    pub total_chunks: usize,
}

/// Persisted unit: one chunk with its embedding and metadata. The `id`
/// is derived from `(source, chunk_index)`, so re-indexing the same
/// source replaces prior documents instead of duplicating them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub source: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    pub text: String,
    pub source: String,
    pub chunk_index: Option<usize>,
    pub metadata: Option<ChunkMetadata>,
}

/// Outcome of a search call. `degraded` is true when the engine was
/// unreachable and the empty hit list is a fallback rather than a
/// legitimate zero-hit result.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub degraded: bool,
}

/// Boosts applied to the two halves of a hybrid query. The defaults are
/// tuned constants, not invariants; callers may override them.
#[derive(Debug, Clone, Copy)]
pub struct HybridWeights {
    pub lexical: f32,
    pub vector: f32,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            lexical: 1.0,
            vector: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Embedding,
    Write,
}

/// A per-chunk failure that did not abort the rest of the source.
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    pub chunk_index: usize,
    pub stage: FailureStage,
    pub reason: String,
}

/// Result of ingesting one source. `chunks_attempted` counts every chunk
/// produced from the text; `chunks_indexed` counts the writes that
/// succeeded.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub source: String,
    pub chunks_attempted: usize,
    pub chunks_indexed: usize,
    pub failures: Vec<ChunkFailure>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub chunk_size: usize,
    pub overlap: usize,
    pub document_type: String,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            overlap: 200,
            document_type: "handbook".to_string(),
        }
    }
}
