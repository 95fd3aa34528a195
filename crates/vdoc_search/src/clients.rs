//! HTTP clients for scholarly search services.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::warn;

use crate::{BibliographicSearch, CandidatePaper, SearchError};

const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search";
const CORE_ENDPOINT: &str = "https://api.core.ac.uk/v3/search/works";

fn search_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(20))
        .build()
}

/// Google Scholar via SerpAPI.
pub struct ScholarSearch {
    api_key: String,
    agent: ureq::Agent,
}

impl ScholarSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent: search_agent(),
        }
    }
}

impl BibliographicSearch for ScholarSearch {
    fn name(&self) -> &str {
        "Google Scholar"
    }

    fn search(&self, query: &str, count: usize) -> Result<Vec<CandidatePaper>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::MissingCredentials("Google Scholar".into()));
        }
        let response = self
            .agent
            .get(SERPAPI_ENDPOINT)
            .query("engine", "google_scholar")
            .query("q", query)
            .query("num", &count.to_string())
            .query("api_key", &self.api_key)
            .call()
            .map_err(|err| SearchError::Http(err.to_string()))?;
        let body = parse_body(response)?;

        let Some(results) = body.get("organic_results").and_then(Value::as_array) else {
            warn!("scholar response carried no organic_results");
            return Ok(Vec::new());
        };
        Ok(results
            .iter()
            .take(count)
            .map(|entry| CandidatePaper {
                title: string_field(entry, "title").unwrap_or_else(|| "Unknown".into()),
                link: string_field(entry, "link").unwrap_or_default(),
                source: self.name().to_string(),
                author: entry
                    .pointer("/publication_info/summary")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                abstract_text: string_field(entry, "snippet"),
            })
            .collect())
    }
}

/// CORE (core.ac.uk) works search.
pub struct CoreSearch {
    api_key: String,
    agent: ureq::Agent,
}

impl CoreSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent: search_agent(),
        }
    }
}

impl BibliographicSearch for CoreSearch {
    fn name(&self) -> &str {
        "CORE"
    }

    fn search(&self, query: &str, count: usize) -> Result<Vec<CandidatePaper>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::MissingCredentials("CORE".into()));
        }
        let payload = json!({ "q": query, "limit": count });
        let response = self
            .agent
            .post(CORE_ENDPOINT)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_string(&payload.to_string())
            .map_err(|err| SearchError::Http(err.to_string()))?;
        let body = parse_body(response)?;

        let Some(results) = body.get("results").and_then(Value::as_array) else {
            warn!("core response carried no results");
            return Ok(Vec::new());
        };
        Ok(results
            .iter()
            .take(count)
            .map(|entry| {
                let authors = entry
                    .get("authors")
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .filter_map(|author| string_field(author, "name"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .filter(|joined| !joined.is_empty());
                let link = string_field(entry, "downloadUrl")
                    .or_else(|| string_field(entry, "doi"))
                    .unwrap_or_default();
                CandidatePaper {
                    title: string_field(entry, "title").unwrap_or_else(|| "Unknown".into()),
                    link,
                    source: self.name().to_string(),
                    author: authors,
                    abstract_text: string_field(entry, "abstract"),
                }
            })
            .collect())
    }
}

fn parse_body(response: ureq::Response) -> Result<Value, SearchError> {
    let body = response
        .into_string()
        .map_err(|err| SearchError::Http(err.to_string()))?;
    serde_json::from_str(&body).map_err(|err| SearchError::Malformed(err.to_string()))
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}
