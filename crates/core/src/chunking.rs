use crate::error::IngestError;
use crate::models::IngestionOptions;

/// How far back from the tentative window end the chunker looks for a
/// sentence boundary.
const SENTENCE_BOUNDARY_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            overlap: 200,
        }
    }
}

impl From<&IngestionOptions> for ChunkingConfig {
    fn from(value: &IngestionOptions) -> Self {
        Self {
            chunk_size: value.chunk_size,
            overlap: value.overlap,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {} must be smaller than chunk_size {}",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text into overlapping windows of at most
/// `chunk_size` characters, preferring to end each window one past the
/// last `.` found in its final [`SENTENCE_BOUNDARY_WINDOW`] characters.
///
/// Text no longer than `chunk_size` comes back as a single chunk;
/// empty or whitespace-only input yields no chunks. Indexing is by
/// character, so multi-byte text never splits inside a codepoint.
pub fn chunk_text(text: &str, config: ChunkingConfig) -> Result<Vec<String>, IngestError> {
    config.validate()?;

    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = normalized.chars().collect();
    let total = chars.len();
    if total <= config.chunk_size {
        return Ok(vec![normalized]);
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total {
        let mut end = start + config.chunk_size;

        if end < total {
            let floor = (start + config.chunk_size).saturating_sub(SENTENCE_BOUNDARY_WINDOW);
            if let Some(position) = chars[start..end].iter().rposition(|c| *c == '.') {
                let boundary = start + position;
                if boundary > floor {
                    end = boundary + 1;
                }
            }
        }

        let piece: String = chars[start..end.min(total)].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        // The overlap step always moves forward, even when the boundary
        // search shortened the window below the overlap.
        let next = end.saturating_sub(config.overlap);
        start = next.max(start + 1);
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_normalized() {
        let input = "A  \t  lot\nof   spacing";
        assert_eq!(normalize_whitespace(input), "A lot of spacing");
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = chunk_text("  just a short  paragraph ", ChunkingConfig::default())
            .expect("default config is valid");
        assert_eq!(chunks, vec!["just a short paragraph".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let config = ChunkingConfig::default();
        assert!(chunk_text("", config).unwrap().is_empty());
        assert!(chunk_text("   \n\t  ", config).unwrap().is_empty());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let config = ChunkingConfig {
            chunk_size: 100,
            overlap: 100,
        };
        assert!(matches!(
            chunk_text("irrelevant", config),
            Err(IngestError::InvalidChunkConfig(_))
        ));
    }

    #[test]
    fn long_text_without_periods_uses_hard_boundaries() {
        let text = "0123456789".repeat(240);
        let config = ChunkingConfig::default();
        let chunks = chunk_text(&text, config).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], text[0..1000]);
        assert_eq!(chunks[1], text[800..1800]);
        assert_eq!(chunks[2], text[1600..2400]);

        // Stitching non-overlapping tails back together reconstructs the
        // source with no gaps.
        let stitched = format!("{}{}{}", chunks[0], &chunks[1][200..], &chunks[2][200..]);
        assert_eq!(stitched, text);
    }

    #[test]
    fn window_prefers_trailing_sentence_boundary() {
        let mut chars: Vec<char> = std::iter::repeat('a').take(2400).collect();
        chars[950] = '.';
        let text: String = chars.iter().collect();

        let chunks = chunk_text(&text, ChunkingConfig::default()).unwrap();
        assert_eq!(chunks[0].len(), 951);
        assert!(chunks[0].ends_with('.'));
        // The next window starts overlap characters before the boundary.
        assert_eq!(chunks[1].len(), 1000);
    }

    #[test]
    fn boundary_shifted_chunks_still_cover_the_text() {
        // Distinct codepoints make every chunk's position in the source
        // unambiguous, so coverage can be checked even though the
        // sentence boundary shifts window ends and chunk lengths vary.
        let mut chars: Vec<char> = (0..2400u32)
            .map(|offset| char::from_u32(0x4E00 + offset).unwrap())
            .collect();
        chars[950] = '.';
        let text: String = chars.iter().collect();

        let chunks = chunk_text(&text, ChunkingConfig::default()).unwrap();
        assert!(chunks.len() >= 3);
        assert!(chunks[0].ends_with('.'));

        // Stitch each chunk's not-yet-covered tail back together; the
        // result must reconstruct the source with no gaps.
        let mut stitched = String::new();
        let mut covered = 0usize;
        for chunk in &chunks {
            let chunk_chars: Vec<char> = chunk.chars().collect();
            let start = (0..=chars.len() - chunk_chars.len())
                .find(|&candidate| chars[candidate..candidate + chunk_chars.len()] == chunk_chars[..])
                .expect("every chunk is a substring of the source");
            assert!(start <= covered, "gap before chunk starting at {start}");
            if start + chunk_chars.len() > covered {
                stitched.extend(&chunk_chars[covered - start..]);
                covered = start + chunk_chars.len();
            }
        }
        assert_eq!(covered, chars.len());
        assert_eq!(stitched, text);
    }

    #[test]
    fn period_outside_search_window_is_ignored() {
        let mut chars: Vec<char> = std::iter::repeat('a').take(2400).collect();
        chars[500] = '.';
        let text: String = chars.iter().collect();

        let chunks = chunk_text(&text, ChunkingConfig::default()).unwrap();
        assert_eq!(chunks[0].len(), 1000);
    }

    #[test]
    fn boundary_shortened_windows_still_terminate() {
        // Every character is a period, so each window ends right after its
        // last period and the overlap step barely advances.
        let text = ".".repeat(500);
        let config = ChunkingConfig {
            chunk_size: 120,
            overlap: 30,
        };
        let chunks = chunk_text(&text, config).unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|chunk| chunk.len() <= 120));
    }
}
