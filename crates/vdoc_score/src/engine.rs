use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::warn;
use vdoc_index::{EmbedIndex, IndexError};
use vdoc_providers::ProviderError;
use vdoc_similarity::{SimilarityBreakdown, SimilarityEngine};

use crate::types::{PaperInfo, ReferenceId, ScoreFailure, ScoreOptions, ScoreReport, SimilarityResult};
use crate::TOP_RESULT_WINDOW;

/// Score a suspect text against every reference and rank the outcome.
///
/// Options are assumed validated ([`ScoreOptions::validate`]) at the API
/// boundary. An empty reference list yields an empty report, not an error.
pub fn score(
    engine: &SimilarityEngine,
    suspect: &str,
    references: &[String],
    opts: &ScoreOptions,
) -> ScoreReport {
    if references.is_empty() {
        return ScoreReport::default();
    }
    let mut report = if opts.use_index {
        score_via_index(engine, suspect, references, opts)
    } else {
        score_direct(engine, suspect, references, opts)
    };
    rank(&mut report.results);
    report
}

/// Compare against each reference in turn. The fan-out is embarrassingly
/// parallel; when a concurrency bound is set, comparisons run on a scoped
/// rayon pool and results are reassembled in input order before ranking.
fn score_direct(
    engine: &SimilarityEngine,
    suspect: &str,
    references: &[String],
    opts: &ScoreOptions,
) -> ScoreReport {
    let compare_all = || {
        references
            .par_iter()
            .map(|reference| engine.compare(suspect, reference))
            .collect::<Vec<_>>()
    };
    let outcomes: Vec<Result<SimilarityBreakdown, ProviderError>> = match opts.max_concurrency {
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(compare_all),
            Err(err) => {
                warn!(error = %err, "scoring pool unavailable, running sequentially");
                references
                    .iter()
                    .map(|reference| engine.compare(suspect, reference))
                    .collect()
            }
        },
        None => references
            .iter()
            .map(|reference| engine.compare(suspect, reference))
            .collect(),
    };

    let mut results = Vec::with_capacity(references.len());
    let mut failures = Vec::new();
    for (position, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(breakdown) => results.push(SimilarityResult::from_breakdown(
                ReferenceId::Position(position),
                breakdown,
                &opts.thresholds,
                references[position].clone(),
            )),
            Err(err) => {
                warn!(reference = position, error = %err, "reference comparison skipped");
                failures.push(ScoreFailure {
                    reference_id: ReferenceId::Position(position),
                    error: err.to_string(),
                });
            }
        }
    }
    ScoreReport { results, failures }
}

/// Route comparisons through an ephemeral embedding index: embed every
/// reference once, take the top-N semantic neighbors, and compute the
/// lexical metrics only for those.
fn score_via_index(
    engine: &SimilarityEngine,
    suspect: &str,
    references: &[String],
    opts: &ScoreOptions,
) -> ScoreReport {
    let mut index = EmbedIndex::new(engine.embedder().clone());
    let mut failures = Vec::new();
    let mut inserted = Vec::new();
    for (position, reference) in references.iter().enumerate() {
        match index.insert(position.to_string(), reference) {
            Ok(()) => inserted.push(position),
            Err(err) => {
                warn!(reference = position, error = %err, "reference could not be indexed");
                failures.push(ScoreFailure {
                    reference_id: ReferenceId::Position(position),
                    error: err.to_string(),
                });
            }
        }
    }

    let hits = match index.query(suspect, opts.index_top_n) {
        Ok(hits) => hits,
        // Every insert failed; each failure is already on record.
        Err(IndexError::EmptyIndex) => {
            return ScoreReport {
                results: Vec::new(),
                failures,
            }
        }
        Err(err) => {
            // The suspect embedding itself failed, so nothing can be scored.
            warn!(error = %err, "index query failed, skipping all indexed references");
            let message = err.to_string();
            failures.extend(inserted.into_iter().map(|position| ScoreFailure {
                reference_id: ReferenceId::Position(position),
                error: message.clone(),
            }));
            return ScoreReport {
                results: Vec::new(),
                failures,
            };
        }
    };

    let results = hits
        .into_iter()
        .map(|hit| {
            let reference_id = match hit.doc_id.parse::<usize>() {
                Ok(position) => ReferenceId::Position(position),
                Err(_) => ReferenceId::Document(hit.doc_id.clone()),
            };
            let breakdown = engine.compare_with_semantic(hit.score, suspect, &hit.text);
            SimilarityResult::from_breakdown(reference_id, breakdown, &opts.thresholds, hit.text)
        })
        .collect();
    ScoreReport { results, failures }
}

/// Sort results by fused score descending. Stable, so equal scores keep
/// their original relative order.
fn rank(results: &mut [SimilarityResult]) {
    results.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
    });
}

/// Document-level plagiarism score: the arithmetic mean of the top three
/// fused scores in the ranked list (all of them when fewer than three
/// exist), zero with no results.
pub fn overall_plagiarism_score(results: &[SimilarityResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let window = results.len().min(TOP_RESULT_WINDOW);
    let sum: f64 = results[..window].iter().map(|r| r.overall_score).sum();
    sum / window as f64
}

/// The single highest-ranked result, if any.
pub fn best_match(results: &[SimilarityResult]) -> Option<&SimilarityResult> {
    results.first()
}

/// Attach provenance strictly by positional correspondence. Results whose
/// position falls outside `sources`, or that carry a non-positional id,
/// degrade to [`PaperInfo::unknown`].
pub fn attach_paper_info(results: &mut [SimilarityResult], sources: &[PaperInfo]) {
    for result in results.iter_mut() {
        let info = match &result.reference_id {
            ReferenceId::Position(position) if *position < sources.len() => {
                sources[*position].clone()
            }
            _ => PaperInfo::unknown(),
        };
        result.paper_info = Some(info);
    }
}
