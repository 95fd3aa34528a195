//! # Document Acquisition
//!
//! Upstream seams of the analysis pipeline: fetching raw document bytes and
//! turning them into cleaned text. Both capabilities sit behind traits so
//! the core never performs network I/O or format parsing itself; binary
//! format extraction (PDF and friends) is an external collaborator plugged
//! in through [`TextExtractor`].
//!
//! Acquisition failures are the only request-fatal errors in the system:
//! a document that cannot be fetched or decoded fails the whole request,
//! unlike provider failures which isolate per reference or per section.

use std::io::Read;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while acquiring a document. Fatal to the whole request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document fetch failed: {0}")]
    Fetch(String),
    #[error("text extraction failed: {0}")]
    Decode(String),
    #[error("document empty after extraction")]
    EmptyDocument,
}

/// Fetches the raw bytes of a document from a locator (typically a URL).
pub trait DocumentFetcher: Send + Sync {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, ExtractError>;
}

/// Extracts cleaned text from raw document bytes.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Some servers refuse requests without a browser-looking user agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36";

/// HTTP-backed [`DocumentFetcher`].
pub struct HttpDocumentFetcher {
    agent: ureq::Agent,
}

impl HttpDocumentFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Default for HttpDocumentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentFetcher for HttpDocumentFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, ExtractError> {
        let start = Instant::now();
        let response = self
            .agent
            .get(locator)
            .set("User-Agent", BROWSER_USER_AGENT)
            .call()
            .map_err(|err| {
                warn!(locator, error = %err, "document_fetch_failure");
                ExtractError::Fetch(err.to_string())
            })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|err| ExtractError::Fetch(err.to_string()))?;

        info!(
            locator,
            bytes = bytes.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "document_fetch_success"
        );
        Ok(bytes)
    }
}

/// [`TextExtractor`] for documents that already are UTF-8 text.
pub struct Utf8TextExtractor;

impl TextExtractor for Utf8TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| ExtractError::Decode(err.to_string()))?;
        if text.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        Ok(text.to_string())
    }
}

/// Clean extracted text while preserving line structure.
///
/// The segmenter consumes lines, so cleanup must not flatten newlines:
/// per line, whitespace runs collapse to single spaces and edges trim;
/// blank lines, page-number artifacts ("3 | P a g e", "page 3 of 10") and
/// standalone boilerplate markers drop out entirely.
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() || is_page_artifact(&collapsed) || is_boilerplate(&collapsed) {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&collapsed);
    }
    out
}

/// Recognizes the page-footer shapes PDF extraction tends to leave behind.
fn is_page_artifact(line: &str) -> bool {
    let lowered = line.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    match tokens.as_slice() {
        // "<n> | p a g e"
        [number, "|", "p", "a", "g", "e"] => number.bytes().all(|b| b.is_ascii_digit()),
        // "page <n> of <m>"
        ["page", n, "of", m] => {
            n.bytes().all(|b| b.is_ascii_digit()) && m.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

fn is_boilerplate(line: &str) -> bool {
    matches!(
        line.to_lowercase().as_str(),
        "confidential" | "draft" | "internal use only"
    )
}
