use thiserror::Error;

/// Failure fetching raw bytes from blob storage.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("access denied: {bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    #[error("transient fetch failure: {0}")]
    Transient(String),
}

/// Failure extracting text from a PDF. The pipeline degrades a corrupt
/// document to empty text instead of failing the source.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("corrupt pdf: {0}")]
    CorruptDocument(String),
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("embedding dimension {actual} does not match configured {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding response malformed: {0}")]
    MalformedResponse(String),
}

/// Failure talking to the remote document index. Covers schema setup,
/// per-document writes, and queries.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid index endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("index returned {status}: {details}")]
    BackendResponse { status: u16, details: String },

    #[error("index creation failed: {0}")]
    SchemaCreate(String),
}

/// Top-level ingestion failure. Any of these aborts processing of the
/// whole source; per-chunk embedding and write failures are reported in
/// the ingest report instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("schema setup failed: {0}")]
    Schema(#[source] IndexError),
}

impl IngestError {
    /// Stable machine-readable failure kind for structured reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::InvalidChunkConfig(_) => "invalid_chunk_config",
            IngestError::Fetch(_) => "fetch",
            IngestError::Schema(_) => "schema",
        }
    }
}
