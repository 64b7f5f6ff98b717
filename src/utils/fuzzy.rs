//! Fuzzy matching utilities
//!
//! Token-set similarity for material names plus a Levenshtein-based
//! "did you mean" helper for prim paths.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;
use strsim::normalized_levenshtein;

/// Result of a fuzzy match with the matched value and score
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    pub value: String,
    pub score: f64,
}

/// Prepare a name for token comparison.
///
/// Every non-alphanumeric character (`_`, `-`, `.`, punctuation) becomes a
/// space, the result is lowercased and trimmed. `Chrome_Plastic` becomes
/// `chrome plastic`.
pub fn process(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.to_lowercase().trim().to_string()
}

/// Normalized Indel similarity on a 0-100 scale.
///
/// Equal strings score 100 (even when both are empty), otherwise an empty
/// side scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Indel distance counts the chars outside the longest common subsequence
    let total = a.chars().count() + b.chars().count();
    let common = (total - indel::distance(a.chars(), b.chars())) / 2;

    ((200 * common) as f64 / total as f64).round_ties_even() as u8
}

fn join_sorted<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<&str>>().join(" ")
}

/// Token-set similarity between two names (0-100).
///
/// Symmetric, insensitive to case, token order and token repetition.
/// 100 when one token set contains the other.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let pa = process(a);
    let pb = process(b);
    if pa.is_empty() || pb.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = pa.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = pb.split_whitespace().collect();

    let sect = join_sorted(tokens_a.intersection(&tokens_b));
    let diff_ab = join_sorted(tokens_a.difference(&tokens_b));
    let diff_ba = join_sorted(tokens_b.difference(&tokens_a));

    let combined_ab = format!("{} {}", sect, diff_ab).trim().to_string();
    let combined_ba = format!("{} {}", sect, diff_ba).trim().to_string();

    [
        ratio(&sect, &combined_ab),
        ratio(&sect, &combined_ba),
        ratio(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Find the candidate closest to `search_term` by edit distance.
///
/// Returns None if no candidate reaches `cutoff` (0.0 - 1.0).
pub fn closest_match(search_term: &str, candidates: &[String], cutoff: f64) -> Option<FuzzyMatch> {
    let search_lower = search_term.to_lowercase();

    candidates
        .iter()
        .map(|candidate| FuzzyMatch {
            value: candidate.clone(),
            score: normalized_levenshtein(&search_lower, &candidate.to_lowercase()),
        })
        .filter(|m| m.score >= cutoff)
        .fold(None, |best: Option<FuzzyMatch>, m| match best {
            Some(b) if b.score >= m.score => Some(b),
            _ => Some(m),
        })
}
