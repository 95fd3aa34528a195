//! # Plagiarism Scorer
//!
//! Orchestrates the similarity engine over a candidate list — directly or
//! through the embedding index — ranks the results, and derives one
//! document-level plagiarism score.
//!
//! ## Guarantees
//!
//! - Output is sorted by fused score descending; ties preserve the original
//!   reference order (stable sort, restored after any parallel fan-out).
//! - Per-reference comparisons are independent; one failed provider call
//!   drops that one reference into [`ScoreReport::failures`] and the batch
//!   continues.
//! - The document-level score is the arithmetic mean of the top three fused
//!   scores (or all of them when fewer exist), zero with no references.
//! - Provenance metadata attaches strictly by positional correspondence and
//!   degrades to [`PaperInfo::unknown`] when correspondence cannot be
//!   established.

mod engine;
mod types;

pub use engine::{attach_paper_info, best_match, overall_plagiarism_score, score};
pub use types::{
    PaperInfo, ReferenceId, ScoreFailure, ScoreOptions, ScoreReport, SimilarityResult,
};

/// How many top-ranked results feed the document-level mean.
pub const TOP_RESULT_WINDOW: usize = 3;
