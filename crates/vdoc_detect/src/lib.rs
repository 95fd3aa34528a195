//! # Section-Weighted AI Aggregation
//!
//! Rolls per-section AI-detection classifications into one document-level
//! probability, weighted by section word count:
//!
//! `overall = Σ(ai_probability_i · word_count_i) / Σ(word_count_i)`
//!
//! Sections shorter than [`MIN_SECTION_WORDS`] are skipped entirely — they
//! appear in neither the per-section map nor the weighted sum, rather than
//! being scored as zero. A document where nothing qualifies yields a 0.0
//! probability with an empty map; that is a valid outcome, not an error.
//! A classifier failure is isolated to its section and recorded, never
//! aborting the rest of the document.
//!
//! The aggregation itself is pure arithmetic over immutable value types;
//! the only effect is one classifier call per qualifying section.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use vdoc_providers::ClassifierProvider;
use vdoc_segment::Section;

/// Sections with fewer words than this are not classified at all.
pub const MIN_SECTION_WORDS: usize = 10;

/// Default document-level verdict threshold.
pub const DEFAULT_AI_THRESHOLD: f64 = 0.7;

/// Classification outcome for one section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionAiResult {
    pub ai_probability: f64,
    pub human_probability: f64,
    pub is_ai_generated: bool,
    /// The larger of the two probabilities.
    pub confidence: f64,
    pub word_count: usize,
}

/// A section whose classification failed; the rest of the document still
/// aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
    pub section: Section,
    pub error: String,
}

/// Word-count-weighted rollup over the qualifying sections. Built fresh per
/// request; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAiReport {
    pub overall_ai_probability: f64,
    pub overall_human_probability: f64,
    pub overall_is_ai_generated: bool,
    pub sections: BTreeMap<Section, SectionAiResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SectionFailure>,
}

/// Classify each qualifying section once and aggregate.
pub fn analyze_sections(
    classifier: &dyn ClassifierProvider,
    sections: &BTreeMap<Section, String>,
    threshold: f64,
) -> DocumentAiReport {
    let mut section_results = BTreeMap::new();
    let mut failures = Vec::new();
    let mut weighted_sum = 0.0;
    let mut total_words = 0usize;

    for (&section, text) in sections {
        let word_count = text.split_whitespace().count();
        if word_count < MIN_SECTION_WORDS {
            continue;
        }

        let classification = match classifier.classify(text) {
            Ok(classification) => classification,
            Err(err) => {
                warn!(section = %section, error = %err, "section classification skipped");
                failures.push(SectionFailure {
                    section,
                    error: err.to_string(),
                });
                continue;
            }
        };

        total_words += word_count;
        weighted_sum += classification.ai_probability * word_count as f64;
        section_results.insert(
            section,
            SectionAiResult {
                ai_probability: classification.ai_probability,
                human_probability: classification.human_probability,
                is_ai_generated: classification.ai_probability > threshold,
                confidence: classification.confidence(),
                word_count,
            },
        );
    }

    let overall_ai_probability = if total_words > 0 {
        weighted_sum / total_words as f64
    } else {
        0.0
    };

    DocumentAiReport {
        overall_ai_probability,
        overall_human_probability: 1.0 - overall_ai_probability,
        overall_is_ai_generated: overall_ai_probability > threshold,
        sections: section_results,
        failures,
    }
}
