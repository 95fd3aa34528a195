//! Keyword extraction for search queries.

use std::collections::HashMap;

/// Common English words that carry no search signal.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "because",
    "been", "but", "by", "can", "could", "did", "do", "does", "each", "for", "from", "had", "has",
    "have", "he", "her", "his", "how", "if", "in", "into", "is", "it", "its", "may", "more",
    "most", "no", "not", "of", "on", "one", "only", "or", "other", "our", "out", "over", "she",
    "so", "some", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "to", "under", "up", "was", "we", "were", "what", "when",
    "which", "while", "who", "will", "with", "would", "you", "your",
];

/// Pick the most frequent non-stopword alphanumeric tokens.
///
/// Ties break by first appearance so the query is deterministic for a given
/// text.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (order, raw) in text.split_whitespace().enumerate() {
        let token = raw.to_lowercase();
        if !token.chars().all(char::is_alphanumeric) || token.is_empty() {
            continue;
        }
        if STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        let entry = counts.entry(token).or_insert((0, order));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(max_keywords)
        .map(|(token, _)| token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_ranks_keywords() {
        let text = "embeddings embeddings embeddings similarity similarity plagiarism";
        let keywords = extract_keywords(text, 3);
        assert_eq!(keywords, vec!["embeddings", "similarity", "plagiarism"]);
    }

    #[test]
    fn stopwords_and_punctuation_are_filtered() {
        let text = "the quick, brown fox and the lazy dog";
        let keywords = extract_keywords(text, 10);
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"quick,".to_string()));
        assert!(keywords.contains(&"brown".to_string()));
    }

    #[test]
    fn ties_break_by_first_appearance() {
        let text = "alpha beta gamma alpha beta gamma";
        let keywords = extract_keywords(text, 3);
        assert_eq!(keywords, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn empty_text_yields_no_keywords() {
        assert!(extract_keywords("", 5).is_empty());
        assert!(extract_keywords("the of and", 5).is_empty());
    }
}
