//! BM25 Okapi scoring over the corpus of one search.
//!
//! Document text is `title + " " + abstract`. Document frequency is a case-insensitive
//! substring test; term frequency counts case-insensitive occurrences, so a term also
//! matches inside longer words.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::config::Bm25Params;

/// Lower-cased, whitespace-split query terms.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Corpus statistics needed by the BM25 formula.
#[derive(Debug, Clone)]
pub struct CorpusStats {
    /// Number of documents.
    pub doc_count: usize,
    /// Mean whitespace-token count.
    pub avg_doc_len: f64,
    /// Documents containing each query term.
    pub doc_freq: HashMap<String, usize>,
}

impl CorpusStats {
    /// Compute statistics for `terms` over `docs`.
    #[must_use]
    pub fn new(docs: &[String], terms: &[String]) -> Self {
        let lowered: Vec<String> = docs.iter().map(|d| d.to_lowercase()).collect();
        let total_len: usize = docs.iter().map(|d| doc_len(d)).sum();
        let avg_doc_len = if docs.is_empty() { 0.0 } else { total_len as f64 / docs.len() as f64 };

        let mut doc_freq = HashMap::with_capacity(terms.len());
        for term in terms {
            doc_freq
                .entry(term.clone())
                .or_insert_with(|| lowered.iter().filter(|d| d.contains(term.as_str())).count());
        }

        Self { doc_count: docs.len(), avg_doc_len, doc_freq }
    }

    /// `ln((N - df + 0.5) / (df + 0.5) + 1)`; always positive.
    #[must_use]
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.doc_count as f64;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }
}

/// BM25 contribution of one term to one document.
#[must_use]
pub fn term_score(tf: f64, idf: f64, doc_len: f64, avg_doc_len: f64, params: Bm25Params) -> f64 {
    let length_ratio = if avg_doc_len > 0.0 { doc_len / avg_doc_len } else { 1.0 };
    let denominator = tf + params.k1 * (1.0 - params.b + params.b * length_ratio);
    if denominator <= 0.0 {
        return 0.0;
    }
    idf * (tf * (params.k1 + 1.0)) / denominator
}

/// Raw BM25 score of every document for `query`, in document order.
#[must_use]
pub fn score_documents(query: &str, docs: &[String], params: Bm25Params) -> Vec<f64> {
    let terms = tokenize(query);
    let stats = CorpusStats::new(docs, &terms);
    let matchers: Vec<TermMatcher> = terms.iter().map(|t| TermMatcher::new(t)).collect();

    docs.iter()
        .map(|doc| {
            let len = doc_len(doc) as f64;
            terms
                .iter()
                .zip(&matchers)
                .map(|(term, matcher)| {
                    let tf = matcher.count(doc) as f64;
                    term_score(tf, stats.idf(term), len, stats.avg_doc_len, params)
                })
                .sum()
        })
        .collect()
}

/// Min-max normalize to `[0, 1]`; if every score is equal, every score becomes 1.
#[must_use]
pub fn min_max_normalize(scores: &[f64]) -> Vec<f64> {
    let Some(min) = scores.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = scores.iter().copied().fold(min, f64::max);
    let range = max - min;

    if range <= f64::EPSILON {
        return vec![1.0; scores.len()];
    }

    scores.iter().map(|s| (s - min) / range).collect()
}

/// Normalized BM25 relevance of every document for `query`.
#[must_use]
pub fn bm25_relevance(query: &str, docs: &[String], params: Bm25Params) -> Vec<f64> {
    min_max_normalize(&score_documents(query, docs, params))
}

fn doc_len(doc: &str) -> usize {
    doc.split_whitespace().count()
}

/// Compiled size allowed for one term pattern.
const TERM_PATTERN_SIZE_LIMIT: usize = 64 * 1024;

/// Case-insensitive literal occurrence counter.
///
/// Terms whose pattern exceeds [`TERM_PATTERN_SIZE_LIMIT`] are counted on a
/// lower-cased copy of the document instead.
#[derive(Debug)]
enum TermMatcher {
    Regex(Regex),
    Literal(String),
}

impl TermMatcher {
    fn new(term: &str) -> Self {
        RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .size_limit(TERM_PATTERN_SIZE_LIMIT)
            .build()
            .map_or_else(|_| Self::Literal(term.to_lowercase()), Self::Regex)
    }

    fn count(&self, doc: &str) -> usize {
        match self {
            Self::Regex(re) => re.find_iter(doc).count(),
            Self::Literal(term) => doc.to_lowercase().matches(term.as_str()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  Quantum   COMPUTING "), vec!["quantum", "computing"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_idf_matches_formula() {
        let corpus = docs(&["quantum gates", "classical bits", "quantum walks"]);
        let terms = tokenize("quantum");
        let stats = CorpusStats::new(&corpus, &terms);
        assert_eq!(stats.doc_freq["quantum"], 2);
        let expected = ((3.0 - 2.0 + 0.5) / (2.0 + 0.5) + 1.0_f64).ln();
        assert!((stats.idf("quantum") - expected).abs() < 1e-12);
        assert!(stats.idf("absent") > stats.idf("quantum"));
    }

    #[test]
    fn test_term_frequency_is_case_insensitive_substring() {
        let matcher = TermMatcher::new("quantum");
        assert_eq!(matcher.count("Quantum QUANTUM quantumness"), 3);

        let matcher = TermMatcher::new("c++");
        assert_eq!(matcher.count("C++ and c++"), 2);
    }

    #[test]
    fn test_oversized_term_counts_literally() {
        let term = "ab".repeat(50_000);
        let matcher = TermMatcher::new(&term);
        assert!(matches!(matcher, TermMatcher::Literal(_)));
        assert!(matches!(TermMatcher::new("quantum"), TermMatcher::Regex(_)));

        let doc = format!("{} x {}", term.to_uppercase(), term);
        assert_eq!(matcher.count(&doc), 2);
        assert_eq!(matcher.count("ab ab"), 0);
    }

    #[test]
    fn test_term_score_zero_tf() {
        assert_eq!(term_score(0.0, 2.0, 10.0, 10.0, Bm25Params::default()), 0.0);
    }

    #[test]
    fn test_term_score_monotone_in_tf() {
        let params = Bm25Params::default();
        let mut previous = 0.0;
        for tf in 0..20 {
            let score = term_score(f64::from(tf), 1.3, 12.0, 10.0, params);
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_higher_tf_ranks_first() {
        let corpus = docs(&["rust rust rust", "rust programming", "python scripting"]);
        let scores = score_documents("rust", &corpus, Bm25Params::default());
        assert!(scores[0] > scores[1]);
        assert!(scores[1] > scores[2]);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_min_max_normalize() {
        assert_eq!(min_max_normalize(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(min_max_normalize(&[0.7, 0.7]), vec![1.0, 1.0]);
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn test_bm25_relevance_bounds() {
        let corpus = docs(&["quantum computing review", "quantum", "biology of cells"]);
        let scores = bm25_relevance("quantum computing", &corpus, Bm25Params::default());
        let max = scores.iter().copied().fold(f64::MIN, f64::max);
        let min = scores.iter().copied().fold(f64::MAX, f64::min);
        assert_eq!(max, 1.0);
        assert_eq!(min, 0.0);
    }

    #[test]
    fn test_empty_query_scores_all_equal() {
        let corpus = docs(&["a", "b"]);
        assert_eq!(bm25_relevance("", &corpus, Bm25Params::default()), vec![1.0, 1.0]);
    }
}
