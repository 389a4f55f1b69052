use crate::embeddings::Embedder;
use crate::models::{ChunkFailure, ChunkMetadata, FailureStage, IndexedDocument};
use sha2::{Digest, Sha256};

/// Deterministic id for a chunk: SHA-256 hex of `{source}_{chunk_index}`.
/// The same inputs always produce the same id, which is what makes
/// re-indexing an upsert instead of a duplicate insertion.
pub fn chunk_id(source: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"_");
    hasher.update(chunk_index.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Turns the full chunk list of one source into indexable documents.
///
/// Requires the complete list up front because every document's metadata
/// records `total_chunks`. A chunk whose embedding fails is reported and
/// skipped; the rest of the source is still assembled.
pub async fn assemble<E>(
    chunks: &[String],
    source: &str,
    embedder: &E,
    document_type: &str,
) -> (Vec<IndexedDocument>, Vec<ChunkFailure>)
where
    E: Embedder + ?Sized,
{
    let total_chunks = chunks.len();
    let mut documents = Vec::with_capacity(total_chunks);
    let mut failures = Vec::new();

    for (chunk_index, text) in chunks.iter().enumerate() {
        match embedder.embed(text).await {
            Ok(embedding) => documents.push(IndexedDocument {
                id: chunk_id(source, chunk_index),
                text: text.clone(),
                embedding,
                source: source.to_string(),
                chunk_index,
                metadata: ChunkMetadata {
                    document_type: document_type.to_string(),
                    source_file: source.to_string(),
                    chunk_number: chunk_index,
                    total_chunks,
                },
            }),
            Err(error) => failures.push(ChunkFailure {
                chunk_index,
                stage: FailureStage::Embedding,
                reason: error.to_string(),
            }),
        }
    }

    (documents, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::CharacterNgramEmbedder;
    use crate::error::EmbeddingError;
    use async_trait::async_trait;

    struct FlakyEmbedder {
        fail_on: usize,
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        fn dimensions(&self) -> usize {
            4
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if text.contains(&format!("chunk {}", self.fail_on)) {
                Err(EmbeddingError::ModelUnavailable("down".to_string()))
            } else {
                Ok(vec![0.5; 4])
            }
        }
    }

    #[test]
    fn chunk_id_is_deterministic() {
        let first = chunk_id("handbooks/rugby.pdf", 0);
        let second = chunk_id("handbooks/rugby.pdf", 0);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn chunk_id_varies_with_source_and_index() {
        let base = chunk_id("handbooks/rugby.pdf", 0);
        assert_ne!(base, chunk_id("handbooks/rugby.pdf", 1));
        assert_ne!(base, chunk_id("handbooks/cricket.pdf", 0));
    }

    #[tokio::test]
    async fn metadata_reflects_the_full_chunk_list() {
        let chunks = vec![
            "chunk 0 text".to_string(),
            "chunk 1 text".to_string(),
            "chunk 2 text".to_string(),
        ];
        let embedder = CharacterNgramEmbedder::new(8);

        let (documents, failures) =
            assemble(&chunks, "handbooks/rugby.pdf", &embedder, "sports_handbook").await;

        assert!(failures.is_empty());
        assert_eq!(documents.len(), 3);
        for (index, document) in documents.iter().enumerate() {
            assert_eq!(document.chunk_index, index);
            assert_eq!(document.metadata.chunk_number, index);
            assert_eq!(document.metadata.total_chunks, 3);
            assert_eq!(document.metadata.source_file, "handbooks/rugby.pdf");
            assert_eq!(document.metadata.document_type, "sports_handbook");
            assert_eq!(document.embedding.len(), 8);
        }
    }

    #[tokio::test]
    async fn embedding_failure_skips_only_that_chunk() {
        let chunks = vec![
            "chunk 0 text".to_string(),
            "chunk 1 text".to_string(),
            "chunk 2 text".to_string(),
        ];
        let embedder = FlakyEmbedder { fail_on: 1 };

        let (documents, failures) = assemble(&chunks, "rugby.pdf", &embedder, "handbook").await;

        assert_eq!(documents.len(), 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].chunk_index, 1);
        assert_eq!(failures[0].stage, FailureStage::Embedding);
        assert_eq!(documents[1].chunk_index, 2);
    }

    #[tokio::test]
    async fn empty_chunk_list_assembles_to_nothing() {
        let embedder = CharacterNgramEmbedder::new(8);
        let (documents, failures) = assemble(&[], "rugby.pdf", &embedder, "handbook").await;
        assert!(documents.is_empty());
        assert!(failures.is_empty());
    }
}
