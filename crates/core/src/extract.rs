use crate::error::ExtractError;
use lopdf::Document;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// Opaque bytes-to-page-texts capability.
pub trait PdfExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<PageText>, ExtractError>;
}

#[derive(Debug, Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
        let document = Document::load_mem(bytes)
            .map_err(|error| ExtractError::CorruptDocument(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_number, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_number])
                .map_err(|error| ExtractError::CorruptDocument(error.to_string()))?;

            pages.push(PageText {
                number: page_number,
                text,
            });
        }

        Ok(pages)
    }
}

/// Joins page texts with newlines in original page order.
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
