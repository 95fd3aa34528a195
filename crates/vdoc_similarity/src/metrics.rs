//! The three raw similarity metrics.
//!
//! Each metric is a pure function of already-preprocessed text and catches a
//! different plagiarism pattern: cosine over embeddings catches paraphrase,
//! hashed shingle overlap catches near-verbatim copying, and the token-sort
//! ratio catches reordered sentences. All run in O(n) or O(n·m) over token
//! and character counts with no I/O.

use std::collections::HashSet;

use xxhash_rust::xxh3::xxh3_64;

/// Tokens per shingle for the n-gram fingerprint.
pub const SHINGLE_SIZE: usize = 5;

/// Lowercase, collapse whitespace runs to a single space, and trim.
///
/// Applied before every metric so the three signals see the same text.
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    for segment in lowered.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

/// Jaccard index over hashed [`SHINGLE_SIZE`]-word shingles.
///
/// Each contiguous shingle is joined and hashed to a 64-bit digest; only set
/// membership matters, so hash collisions cost almost nothing. An empty
/// union (either text shorter than one shingle) scores 0.0.
pub fn ngram_similarity(a: &str, b: &str) -> f64 {
    let sa = shingle_digests(a);
    let sb = shingle_digests(b);
    let union = sa.union(&sb).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = sa.intersection(&sb).count();
    intersection as f64 / union as f64
}

fn shingle_digests(text: &str) -> HashSet<u64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < SHINGLE_SIZE {
        return HashSet::new();
    }
    tokens
        .windows(SHINGLE_SIZE)
        .map(|window| xxh3_64(window.join(" ").as_bytes()))
        .collect()
}

/// Token-sort ratio: sort each side's tokens alphabetically, then compute a
/// normalized edit similarity over the joined strings.
///
/// `(len_a + len_b - indel_distance) / (len_a + len_b)`, which is the
/// classic Levenshtein ratio with substitutions costing two. Robust to word
/// reordering by construction. Two empty texts are identical (1.0); one
/// empty side scores 0.0.
pub fn fuzzy_similarity(a: &str, b: &str) -> f64 {
    let sorted_a = token_sort(a);
    let sorted_b = token_sort(b);
    let chars_a: Vec<char> = sorted_a.chars().collect();
    let chars_b: Vec<char> = sorted_b.chars().collect();
    let total = chars_a.len() + chars_b.len();
    if total == 0 {
        return 1.0;
    }
    let distance = indel_distance(&chars_a, &chars_b);
    (total - distance) as f64 / total as f64
}

fn token_sort(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Edit distance with insertions and deletions only (substitution = 2).
/// Two-row dynamic program, O(len_a * len_b) time, O(len_b) space.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j + 1].min(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Cosine similarity between two embedding vectors, in f64.
///
/// Mismatched lengths, empty vectors, or a zero norm all score 0.0 rather
/// than erroring; the engine treats degenerate inputs as "no signal".
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(&x, &y)| x as f64 * y as f64).sum();
    let norm_a: f64 = a.iter().map(|&x| (x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|&x| (x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Clip a raw similarity into [0, 1] for scoring. Cosine ranges over
/// [-1, 1]; negative correlation carries no plagiarism signal.
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "the quick brown fox jumps over the lazy dog near the river bank";

    #[test]
    fn preprocess_lowercases_and_collapses() {
        assert_eq!(preprocess("  Hello\n\n   WORLD\t test  "), "hello world test");
        assert_eq!(preprocess(""), "");
    }

    #[test]
    fn ngram_self_similarity_is_maximal() {
        assert_eq!(ngram_similarity(PROSE, PROSE), 1.0);
    }

    #[test]
    fn ngram_similarity_is_symmetric() {
        let other = "a completely different sentence about compilers and type systems here";
        let ab = ngram_similarity(PROSE, other);
        let ba = ngram_similarity(other, PROSE);
        assert_eq!(ab, ba);
    }

    #[test]
    fn ngram_short_texts_have_empty_union() {
        // Fewer tokens than one shingle on both sides: union is empty.
        assert_eq!(ngram_similarity("too few words", "too few words"), 0.0);
    }

    #[test]
    fn ngram_disjoint_texts_score_zero() {
        let other = "entirely unrelated words describing protein folding in yeast cells";
        assert_eq!(ngram_similarity(PROSE, other), 0.0);
    }

    #[test]
    fn fuzzy_self_similarity_is_maximal() {
        assert_eq!(fuzzy_similarity(PROSE, PROSE), 1.0);
        assert_eq!(fuzzy_similarity("", ""), 1.0);
    }

    #[test]
    fn fuzzy_is_robust_to_reordering() {
        let reordered = "near the river bank the lazy dog jumps over the quick brown fox";
        // Identical token multiset, different order: token sort makes it exact.
        assert_eq!(fuzzy_similarity(PROSE, reordered), 1.0);
    }

    #[test]
    fn fuzzy_one_empty_side_scores_zero() {
        assert_eq!(fuzzy_similarity(PROSE, ""), 0.0);
    }

    #[test]
    fn fuzzy_partial_overlap_lands_between() {
        let similar = "the quick brown fox jumps over the sleepy dog near the river bank";
        let got = fuzzy_similarity(PROSE, similar);
        assert!(got > 0.8 && got < 1.0, "got {got}");
    }

    #[test]
    fn indel_distance_basic_cases() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        // k->s and e->i are delete+insert pairs, plus one insert of g.
        assert_eq!(indel_distance(&a, &b), 5);
        assert_eq!(indel_distance(&a, &a), 0);
        assert_eq!(indel_distance(&a, &[]), 6);
    }

    #[test]
    fn cosine_identical_vectors_score_one() {
        let v = vec![0.6_f32, 0.8, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn clamp_unit_clips_negative_correlation() {
        assert_eq!(clamp_unit(-0.4), 0.0);
        assert_eq!(clamp_unit(0.4), 0.4);
        assert_eq!(clamp_unit(1.2), 1.0);
    }
}
