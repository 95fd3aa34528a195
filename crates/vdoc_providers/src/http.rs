use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    Classification, ClassifierProvider, EmbeddingProvider, ProviderError, MIN_CLASSIFIABLE_CHARS,
};

#[derive(Clone, Copy)]
enum PayloadShape {
    HuggingFace,
    OpenAi,
    Custom,
}

/// Configuration for an HTTP-backed embedding provider.
///
/// # Example
/// ```no_run
/// use vdoc_providers::{EmbeddingProvider, HttpEmbedder, HttpEmbedderConfig};
///
/// let embedder = HttpEmbedder::new(HttpEmbedderConfig {
///     api_url: "https://api-inference.huggingface.co/models/BAAI/bge-small-en-v1.5".into(),
///     auth_header: Some("Bearer hf_xxx".into()),
///     provider: Some("hf".into()),
///     ..Default::default()
/// });
/// let _ = embedder.embed("This is a test.");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpEmbedderConfig {
    /// Inference endpoint.
    pub api_url: String,
    /// Authorization header value (e.g. `"Bearer hf_xxx"`).
    pub auth_header: Option<String>,
    /// Remote payload shape hint: `"hf"`, `"openai"`, or `"custom"` (default).
    pub provider: Option<String>,
    /// Model name, forwarded to providers that expect one in the payload.
    pub model_name: String,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpEmbedderConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            auth_header: None,
            provider: None,
            model_name: "bge-small-en-v1.5".into(),
            timeout_secs: 30,
        }
    }
}

/// Embedding provider backed by a remote HTTP inference endpoint.
pub struct HttpEmbedder {
    cfg: HttpEmbedderConfig,
    agent: ureq::Agent,
}

impl HttpEmbedder {
    pub fn new(cfg: HttpEmbedderConfig) -> Self {
        let agent = build_agent(cfg.timeout_secs);
        Self { cfg, agent }
    }

    fn payload_shape(&self) -> PayloadShape {
        let provider = self
            .cfg
            .provider
            .as_deref()
            .unwrap_or("custom")
            .to_ascii_lowercase();
        match provider.as_str() {
            "hf" | "huggingface" => PayloadShape::HuggingFace,
            "openai" | "gpt" => PayloadShape::OpenAi,
            _ => PayloadShape::Custom,
        }
    }

    fn build_payload(&self, text: &str) -> Value {
        match self.payload_shape() {
            PayloadShape::HuggingFace => json!({ "inputs": text }),
            PayloadShape::OpenAi => json!({ "input": text, "model": self.cfg.model_name }),
            PayloadShape::Custom => json!({ "text": text }),
        }
    }
}

impl EmbeddingProvider for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        if self.cfg.api_url.is_empty() {
            return Err(ProviderError::InvalidConfig(
                "api_url is required for the http embedder".into(),
            ));
        }
        let response = post_json(
            &self.agent,
            &self.cfg.api_url,
            self.cfg.auth_header.as_deref(),
            self.build_payload(text),
        )?;
        let mut vectors = parse_embedding_vectors(response)?;
        vectors.pop().ok_or_else(|| {
            ProviderError::Malformed("response did not contain an embedding".into())
        })
    }
}

/// Configuration for an HTTP-backed AI classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpClassifierConfig {
    /// Inference endpoint expecting `{ "text": ... }`.
    pub api_url: String,
    /// Authorization header value.
    pub auth_header: Option<String>,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpClassifierConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            auth_header: None,
            timeout_secs: 30,
        }
    }
}

/// Classifier provider backed by a remote HTTP inference endpoint.
///
/// Accepts either `{ "human_probability": h, "ai_probability": a }` or a
/// bare `[h, a]` pair in the response, and validates that the pair sums
/// to 1 within tolerance.
pub struct HttpClassifier {
    cfg: HttpClassifierConfig,
    agent: ureq::Agent,
}

impl HttpClassifier {
    pub fn new(cfg: HttpClassifierConfig) -> Self {
        let agent = build_agent(cfg.timeout_secs);
        Self { cfg, agent }
    }
}

impl ClassifierProvider for HttpClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ProviderError> {
        if text.len() < MIN_CLASSIFIABLE_CHARS {
            return Ok(Classification::human_floor());
        }
        if self.cfg.api_url.is_empty() {
            return Err(ProviderError::InvalidConfig(
                "api_url is required for the http classifier".into(),
            ));
        }
        let response = post_json(
            &self.agent,
            &self.cfg.api_url,
            self.cfg.auth_header.as_deref(),
            json!({ "text": text }),
        )?;
        parse_classification(response)
    }
}

fn build_agent(timeout_secs: u64) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

fn post_json(
    agent: &ureq::Agent,
    url: &str,
    auth_header: Option<&str>,
    payload: Value,
) -> Result<Value, ProviderError> {
    let mut request = agent.post(url).set("Content-Type", "application/json");
    if let Some(header) = auth_header {
        request = request.set("Authorization", header);
    }
    let response = request
        .send_string(&payload.to_string())
        .map_err(|e| ProviderError::Http(e.to_string()))?;
    let body = response
        .into_string()
        .map_err(|e| ProviderError::Http(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Accepts the common response shapes remote embedding services use:
/// `{"embeddings": [[..]]}`, `{"data": [{"embedding": [..]}]}`, a bare
/// `[[..]]`, or a single bare `[..]`.
fn parse_embedding_vectors(value: Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_vector_collection(embeddings);
            }
            if let Some(Value::Array(items)) = map.remove("data") {
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Object(mut obj) = item else {
                        return Err(ProviderError::Malformed(
                            "unexpected entry inside `data` array".into(),
                        ));
                    };
                    let embedding = obj.remove("embedding").ok_or_else(|| {
                        ProviderError::Malformed("missing `embedding` field in data item".into())
                    })?;
                    vectors.push(parse_vector(embedding)?);
                }
                return Ok(vectors);
            }
            Err(ProviderError::Malformed(
                "unsupported embedding response shape".into(),
            ))
        }
        other => parse_vector_collection(other),
    }
}

fn parse_vector_collection(value: Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_vector).collect()
            } else {
                parse_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_vector(value: Value) -> Result<Vec<f32>, ProviderError> {
    let Value::Array(values) = value else {
        return Err(ProviderError::Malformed(
            "embedding vector must be an array".into(),
        ));
    };
    values
        .into_iter()
        .map(|entry| match entry {
            Value::Number(num) => num
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| ProviderError::Malformed("non-finite embedding value".into())),
            other => Err(ProviderError::Malformed(format!(
                "embedding entries must be numbers, got {other:?}"
            ))),
        })
        .collect()
}

fn parse_classification(value: Value) -> Result<Classification, ProviderError> {
    let (human, ai) = match &value {
        Value::Object(map) => {
            let human = map
                .get("human_probability")
                .and_then(Value::as_f64)
                .ok_or_else(|| {
                    ProviderError::Malformed("missing `human_probability` field".into())
                })?;
            let ai = map
                .get("ai_probability")
                .and_then(Value::as_f64)
                .ok_or_else(|| ProviderError::Malformed("missing `ai_probability` field".into()))?;
            (human, ai)
        }
        Value::Array(items) if items.len() == 2 => {
            let human = items[0].as_f64();
            let ai = items[1].as_f64();
            match (human, ai) {
                (Some(h), Some(a)) => (h, a),
                _ => {
                    return Err(ProviderError::Malformed(
                        "probability pair entries must be numbers".into(),
                    ))
                }
            }
        }
        _ => {
            return Err(ProviderError::Malformed(
                "unsupported classifier response shape".into(),
            ))
        }
    };

    if (human + ai - 1.0).abs() > 1e-6 {
        return Err(ProviderError::Malformed(format!(
            "probabilities must sum to 1.0, got {human} + {ai}"
        )));
    }
    Ok(Classification {
        human_probability: human,
        ai_probability: ai,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_huggingface_style_embeddings() {
        let value = json!([[0.1, 0.2, 0.3]]);
        let vectors = parse_embedding_vectors(value).unwrap();
        assert_eq!(vectors, vec![vec![0.1_f32, 0.2, 0.3]]);
    }

    #[test]
    fn parses_openai_style_embeddings() {
        let value = json!({ "data": [ { "embedding": [1.0, 0.0] } ] });
        let vectors = parse_embedding_vectors(value).unwrap();
        assert_eq!(vectors, vec![vec![1.0_f32, 0.0]]);
    }

    #[test]
    fn rejects_non_numeric_embedding_entries() {
        let value = json!([["not", "numbers"]]);
        assert!(matches!(
            parse_embedding_vectors(value),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn parses_classification_object_and_pair() {
        let object = json!({ "human_probability": 0.25, "ai_probability": 0.75 });
        let got = parse_classification(object).unwrap();
        assert_eq!(got.ai_probability, 0.75);

        let pair = json!([0.4, 0.6]);
        let got = parse_classification(pair).unwrap();
        assert_eq!(got.human_probability, 0.4);
    }

    #[test]
    fn rejects_probabilities_not_summing_to_one() {
        let value = json!({ "human_probability": 0.5, "ai_probability": 0.2 });
        assert!(matches!(
            parse_classification(value),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn http_classifier_floor_skips_the_network() {
        // No server behind this URL; the floor must answer before any request.
        let classifier = HttpClassifier::new(HttpClassifierConfig {
            api_url: "http://127.0.0.1:1/classify".into(),
            ..Default::default()
        });
        let got = classifier.classify("hi").unwrap();
        assert_eq!(got, Classification::human_floor());
    }
}
