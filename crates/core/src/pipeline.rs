use crate::assemble::assemble;
use crate::chunking::{chunk_text, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::extract::{join_pages, PdfExtractor};
use crate::fetch::BlobFetcher;
use crate::models::{ChunkFailure, FailureStage, IngestReport, IngestionOptions};
use crate::traits::DocumentIndex;
use chrono::Utc;
use tracing::warn;

/// End-to-end ingestion for one source: extract text, chunk it, embed
/// each chunk, and upsert the documents into the index.
pub struct IngestPipeline<X, E, I>
where
    X: PdfExtractor,
    E: Embedder,
    I: DocumentIndex,
{
    extractor: X,
    embedder: E,
    index: I,
    options: IngestionOptions,
}

impl<X, E, I> IngestPipeline<X, E, I>
where
    X: PdfExtractor,
    E: Embedder,
    I: DocumentIndex,
{
    pub fn new(extractor: X, embedder: E, index: I, options: IngestionOptions) -> Self {
        Self {
            extractor,
            embedder,
            index,
            options,
        }
    }

    /// Fetches an object from blob storage and ingests it; the key is
    /// the source identifier.
    pub async fn ingest_object<F>(
        &self,
        fetcher: &F,
        bucket: &str,
        key: &str,
    ) -> Result<IngestReport, IngestError>
    where
        F: BlobFetcher + ?Sized,
    {
        let bytes = fetcher.get(bucket, key).await?;
        self.ingest(key, &bytes).await
    }

    /// Ingests one source. A corrupt PDF degrades to empty text (zero
    /// chunks, success); per-chunk embedding and write failures are
    /// collected in the report without aborting their siblings.
    /// Re-running with the same input replaces the previously indexed
    /// documents because ids are derived from `(source, chunk_index)`.
    pub async fn ingest(&self, source: &str, raw_bytes: &[u8]) -> Result<IngestReport, IngestError> {
        let config = ChunkingConfig::from(&self.options);
        config.validate()?;

        let text = match self.extractor.extract(raw_bytes) {
            Ok(pages) => join_pages(&pages),
            Err(error) => {
                warn!(source, %error, "pdf extraction failed, treating source as empty");
                String::new()
            }
        };

        let chunks = chunk_text(&text, config)?;
        if chunks.is_empty() {
            return Ok(IngestReport {
                source: source.to_string(),
                chunks_attempted: 0,
                chunks_indexed: 0,
                failures: Vec::new(),
                completed_at: Utc::now(),
            });
        }

        self.index
            .ensure_schema(self.embedder.dimensions())
            .await
            .map_err(IngestError::Schema)?;

        let (documents, mut failures) = assemble(
            &chunks,
            source,
            &self.embedder,
            &self.options.document_type,
        )
        .await;

        let mut chunks_indexed = 0usize;
        for document in &documents {
            match self.index.upsert(document).await {
                Ok(()) => chunks_indexed += 1,
                Err(error) => {
                    warn!(source, chunk_index = document.chunk_index, %error, "chunk write failed");
                    failures.push(ChunkFailure {
                        chunk_index: document.chunk_index,
                        stage: FailureStage::Write,
                        reason: error.to_string(),
                    });
                }
            }
        }

        failures.sort_by_key(|failure| failure.chunk_index);

        Ok(IngestReport {
            source: source.to_string(),
            chunks_attempted: chunks.len(),
            chunks_indexed,
            failures,
            completed_at: Utc::now(),
        })
    }
}
