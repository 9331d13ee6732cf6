//! Complaint Extractor
//! Ranks two-word phrases found in the feedback of low-rated orders.

use crate::data::OrderRecord;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_TOP_N: usize = 10;

/// Praise that shows up in angry reviews too ("fast delivery but ...").
pub const NEUTRAL_PHRASES: [&str; 5] = [
    "fast delivery",
    "good service",
    "quick delivery",
    "nice delivery",
    "fresh items",
];

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "got", "had",
    "has", "have", "he", "her", "here", "him", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "just", "me", "my", "no", "not", "of", "on", "or", "our", "out", "over", "she", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "they", "this", "to", "too",
    "up", "us", "very", "was", "we", "were", "what", "when", "which", "who", "will", "with",
    "would", "you", "your",
];

static NON_LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z\s]").expect("letter filter pattern is valid"));

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplaintPhrase {
    pub phrase: String,
    pub count: usize,
}

/// Lowercase, drop everything but letters and whitespace, split.
pub fn tokenize(text: &str) -> Vec<String> {
    NON_LETTERS
        .replace_all(&text.to_lowercase(), "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Consecutive word pairs of `text`, excluding stopword-only and neutral ones.
pub fn candidate_bigrams(text: &str) -> Vec<String> {
    let words = tokenize(text);
    words
        .windows(2)
        .filter(|pair| {
            !(STOPWORD_SET.contains(pair[0].as_str()) && STOPWORD_SET.contains(pair[1].as_str()))
        })
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .filter(|phrase| !NEUTRAL_PHRASES.contains(&phrase.as_str()))
        .collect()
}

pub struct ComplaintExtractor {
    top_n: usize,
}

impl Default for ComplaintExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl ComplaintExtractor {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Top phrases from the feedback of orders rated 2 or lower.
    pub fn extract(&self, records: &[&OrderRecord]) -> Vec<ComplaintPhrase> {
        let reviews: Vec<&str> = records
            .iter()
            .filter(|r| r.is_low_rating())
            .filter_map(|r| r.feedback.as_deref())
            .collect();
        self.rank(&reviews)
    }

    /// Count phrases across reviews; most frequent first, ties in first-seen order.
    pub fn rank(&self, reviews: &[&str]) -> Vec<ComplaintPhrase> {
        // indexed collect keeps review order, so first-seen is deterministic
        let per_review: Vec<Vec<String>> = reviews
            .par_iter()
            .map(|text| candidate_bigrams(text))
            .collect();

        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut next_seen = 0usize;
        for phrase in per_review.into_iter().flatten() {
            let entry = counts.entry(phrase).or_insert_with(|| {
                next_seen += 1;
                (0, next_seen)
            });
            entry.0 += 1;
        }

        let mut ranked: Vec<(String, usize, usize)> = counts
            .into_iter()
            .map(|(phrase, (count, seen))| (phrase, count, seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(self.top_n);

        ranked
            .into_iter()
            .map(|(phrase, count, _)| ComplaintPhrase { phrase, count })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::order;

    fn phrases(ranked: &[ComplaintPhrase]) -> Vec<&str> {
        ranked.iter().map(|p| p.phrase.as_str()).collect()
    }

    #[test]
    fn tokenize_strips_punctuation_and_digits() {
        assert_eq!(
            tokenize("Order #42 was LATE!!  Items   missing."),
            vec!["order", "was", "late", "items", "missing"]
        );
    }

    #[test]
    fn stopword_only_reviews_yield_nothing() {
        let extractor = ComplaintExtractor::default();
        assert!(extractor.rank(&["it was the", "and so on to the"]).is_empty());
    }

    #[test]
    fn neutral_phrases_are_excluded() {
        let bigrams = candidate_bigrams("Fast delivery but wrong item");
        assert!(!bigrams.contains(&"fast delivery".to_string()));
        assert!(bigrams.contains(&"wrong item".to_string()));
        assert!(bigrams.contains(&"delivery but".to_string()));
    }

    #[test]
    fn ranks_by_frequency_then_first_seen() {
        let extractor = ComplaintExtractor::new(3);
        let ranked = extractor.rank(&[
            "stale bread",
            "wrong item",
            "wrong item again",
            "stale bread",
            "cold food",
        ]);
        assert_eq!(phrases(&ranked), vec!["stale bread", "wrong item", "item again"]);
        assert_eq!(ranked[0].count, 2);
        assert_eq!(ranked[2].count, 1);
    }

    #[test]
    fn only_low_ratings_with_text_contribute() {
        let mut angry = order("Zepto", "Dairy", Some(40.0), Some(1.0));
        angry.feedback = Some("Milk packet leaking".into());
        let mut happy = order("Zepto", "Dairy", Some(10.0), Some(5.0));
        happy.feedback = Some("Milk packet leaking".into());
        let silent = order("Zepto", "Dairy", Some(40.0), Some(2.0));
        let mut unrated = order("Zepto", "Dairy", Some(40.0), None);
        unrated.feedback = Some("rotten eggs".into());

        let records = vec![&angry, &happy, &silent, &unrated];
        let ranked = ComplaintExtractor::default().extract(&records);
        assert_eq!(phrases(&ranked), vec!["milk packet", "packet leaking"]);
        assert!(ranked.iter().all(|p| p.count == 1));
    }
}
