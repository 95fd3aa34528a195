//! # Bibliographic Search
//!
//! Discovery of candidate reference documents through external scholarly
//! search services. The core treats search results as an opaque ranked
//! list: no freshness validation, no cross-provider dedup — that belongs to
//! callers who want it.
//!
//! [`gather_candidates`] is the glue the external-candidate scoring mode
//! runs on: extract keywords from the suspect text, fan the query over
//! every configured searcher, fetch each hit's content through the
//! acquisition seams, fall back to the abstract when fetching yields
//! nothing, and drop candidates too thin to compare against. A search that
//! comes back empty is a valid outcome — the plagiarism result set is then
//! empty and the request still succeeds.

mod clients;
mod keywords;

pub use clients::{CoreSearch, ScholarSearch};
pub use keywords::extract_keywords;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use vdoc_ingest::{DocumentFetcher, TextExtractor};

/// Candidates with less content than this are not worth comparing against.
pub const MIN_CANDIDATE_CHARS: usize = 100;

/// How many keywords form the search query.
const KEYWORD_QUERY_SIZE: usize = 7;

/// One search hit from a bibliographic service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePaper {
    pub title: String,
    pub link: String,
    /// Which service produced the hit.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

/// A candidate with its fetched textual content, ready for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDocument {
    pub text: String,
    pub paper: CandidatePaper,
}

/// Errors raised by a search client. A failing searcher is skipped; it
/// never fails the gathering pass as a whole.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("missing credentials for {0}")]
    MissingCredentials(String),
    #[error("search request failed: {0}")]
    Http(String),
    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// A scholarly search service, queried with free-text keywords.
pub trait BibliographicSearch: Send + Sync {
    /// Human-readable service name, used in logs and provenance.
    fn name(&self) -> &str;

    fn search(&self, query: &str, count: usize) -> Result<Vec<CandidatePaper>, SearchError>;
}

/// Search every configured service for papers related to `suspect_text`
/// and fetch their content.
///
/// Fetching goes through the injected acquisition seams; a hit whose link
/// cannot be fetched or decoded falls back to its abstract. Candidates
/// under [`MIN_CANDIDATE_CHARS`] are dropped. The output lists are
/// positionally parallel to each other by construction.
pub fn gather_candidates(
    searchers: &[Box<dyn BibliographicSearch>],
    fetcher: &dyn DocumentFetcher,
    extractor: &dyn TextExtractor,
    suspect_text: &str,
    per_source: usize,
) -> Vec<CandidateDocument> {
    let keywords = extract_keywords(suspect_text, KEYWORD_QUERY_SIZE);
    let query = keywords.join(" ");
    if query.is_empty() {
        return Vec::new();
    }

    let mut papers = Vec::new();
    for searcher in searchers {
        match searcher.search(&query, per_source) {
            Ok(found) => papers.extend(found),
            Err(err) => {
                warn!(service = searcher.name(), error = %err, "search provider skipped");
            }
        }
    }

    let mut candidates = Vec::new();
    for paper in papers {
        let fetched = if paper.link.is_empty() {
            None
        } else {
            fetch_content(fetcher, extractor, &paper.link)
        };
        let content = match fetched {
            Some(content) => content,
            None => match &paper.abstract_text {
                Some(abstract_text) if !abstract_text.trim().is_empty() => {
                    abstract_text.trim().to_string()
                }
                _ => continue,
            },
        };
        if content.len() < MIN_CANDIDATE_CHARS {
            continue;
        }
        candidates.push(CandidateDocument {
            text: content,
            paper,
        });
    }
    candidates
}

fn fetch_content(
    fetcher: &dyn DocumentFetcher,
    extractor: &dyn TextExtractor,
    link: &str,
) -> Option<String> {
    let bytes = match fetcher.fetch(link) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(link, error = %err, "candidate fetch failed, falling back to abstract");
            return None;
        }
    };
    match extractor.extract(&bytes) {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(link, error = %err, "candidate extraction failed, falling back to abstract");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdoc_ingest::ExtractError;

    struct StaticSearch {
        papers: Vec<CandidatePaper>,
    }

    impl BibliographicSearch for StaticSearch {
        fn name(&self) -> &str {
            "static"
        }

        fn search(&self, _query: &str, count: usize) -> Result<Vec<CandidatePaper>, SearchError> {
            Ok(self.papers.iter().take(count).cloned().collect())
        }
    }

    struct FailingSearch;

    impl BibliographicSearch for FailingSearch {
        fn name(&self) -> &str {
            "failing"
        }

        fn search(&self, _query: &str, _count: usize) -> Result<Vec<CandidatePaper>, SearchError> {
            Err(SearchError::Http("service down".into()))
        }
    }

    struct MapFetcher;

    impl DocumentFetcher for MapFetcher {
        fn fetch(&self, locator: &str) -> Result<Vec<u8>, ExtractError> {
            match locator {
                "https://ok.example/paper" => Ok(b"fetched full text ".repeat(10)),
                _ => Err(ExtractError::Fetch("no route".into())),
            }
        }
    }

    struct PassthroughExtractor;

    impl TextExtractor for PassthroughExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
            String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Decode(e.to_string()))
        }
    }

    fn paper(title: &str, link: &str, abstract_text: Option<&str>) -> CandidatePaper {
        CandidatePaper {
            title: title.into(),
            link: link.into(),
            source: "static".into(),
            author: None,
            abstract_text: abstract_text.map(Into::into),
        }
    }

    const SUSPECT: &str = "transformer embeddings improve plagiarism detection because \
                           transformer embeddings capture semantics of documents";

    #[test]
    fn gathers_fetched_content_and_abstract_fallbacks() {
        let long_abstract = "an abstract long enough to survive the minimum candidate \
                             length filter because it carries real descriptive content";
        let searchers: Vec<Box<dyn BibliographicSearch>> = vec![Box::new(StaticSearch {
            papers: vec![
                paper("Fetchable", "https://ok.example/paper", None),
                paper("Abstract only", "https://dead.example/x", Some(long_abstract)),
                paper("Too thin", "", Some("short")),
            ],
        })];

        let candidates = gather_candidates(
            &searchers,
            &MapFetcher,
            &PassthroughExtractor,
            SUSPECT,
            10,
        );
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].text.starts_with("fetched full text"));
        assert_eq!(candidates[1].text, long_abstract);
    }

    #[test]
    fn failing_searcher_is_skipped_not_fatal() {
        let searchers: Vec<Box<dyn BibliographicSearch>> = vec![
            Box::new(FailingSearch),
            Box::new(StaticSearch {
                papers: vec![paper("Fetchable", "https://ok.example/paper", None)],
            }),
        ];
        let candidates = gather_candidates(
            &searchers,
            &MapFetcher,
            &PassthroughExtractor,
            SUSPECT,
            10,
        );
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn empty_search_outcome_is_ok_not_an_error() {
        let searchers: Vec<Box<dyn BibliographicSearch>> =
            vec![Box::new(StaticSearch { papers: vec![] })];
        let candidates = gather_candidates(
            &searchers,
            &MapFetcher,
            &PassthroughExtractor,
            SUSPECT,
            10,
        );
        assert!(candidates.is_empty());
    }
}
