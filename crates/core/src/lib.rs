pub mod assemble;
pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod stores;
pub mod traits;

pub use assemble::{assemble, chunk_id};
pub use chunking::{chunk_text, normalize_whitespace, ChunkingConfig};
pub use embeddings::{
    CharacterNgramEmbedder, Embedder, HttpEmbedder, DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{EmbeddingError, ExtractError, FetchError, IndexError, IngestError};
pub use extract::{join_pages, LopdfExtractor, PageText, PdfExtractor};
pub use fetch::{discover_pdf_keys, BlobFetcher, FsBlobStore};
pub use models::{
    ChunkFailure, ChunkMetadata, FailureStage, HybridWeights, IndexedDocument, IngestReport,
    IngestionOptions, SearchHit, SearchResponse,
};
pub use pipeline::IngestPipeline;
pub use search::HybridSearcher;
pub use stores::OpenSearchIndex;
pub use traits::DocumentIndex;
