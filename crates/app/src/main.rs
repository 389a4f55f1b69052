use chrono::Utc;
use clap::{Parser, Subcommand};
use handbook_index_core::{
    discover_pdf_keys, CharacterNgramEmbedder, Embedder, FsBlobStore, HttpEmbedder,
    HybridSearcher, HybridWeights, IngestPipeline, IngestionOptions, LopdfExtractor,
    OpenSearchIndex, DEFAULT_EMBEDDING_DIMENSIONS,
};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "handbook-index", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OpenSearch base URL
    #[arg(long, env = "OPENSEARCH_ENDPOINT", default_value = "http://localhost:9200")]
    endpoint: String,

    /// Target index name
    #[arg(long, default_value = "handbooks")]
    index: String,

    /// Remote embedding endpoint; the local hashing embedder is used when unset
    #[arg(long, env = "EMBEDDING_ENDPOINT")]
    embedding_endpoint: Option<String>,

    /// Embedding vector dimension
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    embedding_dimensions: usize,

    /// Timeout for index and embedding requests, in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest PDFs from a bucket directory into the index.
    Ingest {
        /// Directory acting as the blob bucket.
        #[arg(long)]
        bucket: String,

        /// Single object key; when omitted, every PDF under the bucket
        /// is ingested (relative paths become source identifiers).
        #[arg(long)]
        key: Option<String>,

        /// Classification tag stored in each chunk's metadata.
        #[arg(long, default_value = "handbook")]
        document_type: String,

        /// Chunk window size in characters.
        #[arg(long, default_value = "1000")]
        chunk_size: usize,

        /// Overlap between consecutive chunks in characters.
        #[arg(long, default_value = "200")]
        overlap: usize,
    },
    /// Query the index with a hybrid or vector-only search.
    Search {
        /// Search query
        #[arg(long)]
        query: String,

        /// Number of results to return.
        #[arg(long, default_value = "5")]
        top_k: usize,

        /// Skip the lexical half and rank by vector similarity only.
        #[arg(long, default_value_t = false)]
        vector_only: bool,

        /// Boost for the lexical match clause.
        #[arg(long, default_value = "1.0")]
        lexical_weight: f32,

        /// Boost for the vector similarity clause.
        #[arg(long, default_value = "2.0")]
        vector_weight: f32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    let embedder: Box<dyn Embedder> = match &cli.embedding_endpoint {
        Some(endpoint) => Box::new(HttpEmbedder::new(
            endpoint,
            cli.embedding_dimensions,
            timeout,
        )?),
        None => Box::new(CharacterNgramEmbedder::new(cli.embedding_dimensions)),
    };

    let index = OpenSearchIndex::new(&cli.endpoint, &cli.index, timeout)?;

    info!(
        endpoint = %cli.endpoint,
        index = %cli.index,
        started_at = %Utc::now().to_rfc3339(),
        "handbook-index boot"
    );

    match cli.command {
        Command::Ingest {
            bucket,
            key,
            document_type,
            chunk_size,
            overlap,
        } => {
            let options = IngestionOptions {
                chunk_size,
                overlap,
                document_type,
            };
            let pipeline = IngestPipeline::new(LopdfExtractor, embedder, index, options);
            let fetcher = FsBlobStore;

            let keys = match key {
                Some(single) => vec![single],
                None => discover_pdf_keys(Path::new(&bucket)),
            };
            if keys.is_empty() {
                anyhow::bail!("no pdf files found under {bucket}");
            }

            let mut failed_sources = 0usize;
            for key in keys {
                match pipeline.ingest_object(&fetcher, &bucket, &key).await {
                    Ok(report) => {
                        for failure in &report.failures {
                            warn!(
                                source = %key,
                                chunk_index = failure.chunk_index,
                                reason = %failure.reason,
                                "chunk failed"
                            );
                        }
                        println!(
                            "{key}: {} of {} chunks indexed at {}",
                            report.chunks_indexed,
                            report.chunks_attempted,
                            report.completed_at.to_rfc3339()
                        );
                    }
                    Err(error) => {
                        failed_sources += 1;
                        warn!(source = %key, kind = error.kind(), %error, "source failed");
                        println!("{key}: failed ({})", error.kind());
                    }
                }
            }

            if failed_sources > 0 {
                anyhow::bail!("{failed_sources} source(s) failed to ingest");
            }
        }
        Command::Search {
            query,
            top_k,
            vector_only,
            lexical_weight,
            vector_weight,
        } => {
            let weights = HybridWeights {
                lexical: lexical_weight,
                vector: vector_weight,
            };
            let searcher = HybridSearcher::new(embedder, index, weights);

            let response = if vector_only {
                let query_vector = searcher.embedder().embed(&query).await?;
                searcher.search_vector(&query_vector, top_k).await
            } else {
                searcher.search(&query, top_k).await?
            };

            if response.degraded {
                warn!("search engine unreachable, returning no results");
            }

            println!("query: {query}");
            for hit in response.hits {
                let chunk_label = hit
                    .chunk_index
                    .map(|index| index.to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "score={:.4} source={} chunk={chunk_label} id={}",
                    hit.score, hit.source, hit.id
                );
                if let Some(metadata) = &hit.metadata {
                    println!(
                        "  type={} chunk {} of {}",
                        metadata.document_type,
                        metadata.chunk_number + 1,
                        metadata.total_chunks
                    );
                }
                println!("  {}", hit.text);
            }
        }
    }

    Ok(())
}
