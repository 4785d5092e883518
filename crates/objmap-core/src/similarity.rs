//! Field name similarity
//!
//! Normalized Levenshtein similarity between field names, used to pair each
//! source field with its closest destination field.

use rapidfuzz::distance::levenshtein;

/// Names longer than this never match anything
const MAX_NAME_LEN: usize = 256;

/// Score of one source/destination name pairing
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityScore {
    pub source: String,
    pub dest: String,
    pub score: f64,
}

/// Edit distance with unit cost for insertion, deletion and substitution.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein::distance(a.chars(), b.chars())
}

/// Similarity in `[0, 1]`: `1 - distance / max_len`.
///
/// Empty names never match, so `similarity("", "")` is `0.0`.
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len > MAX_NAME_LEN {
        return 0.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// All candidates sharing the highest score, in candidate order.
pub fn best_match<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<SimilarityScore> {
    let scores: Vec<SimilarityScore> = candidates
        .into_iter()
        .map(|candidate| SimilarityScore {
            source: name.to_string(),
            dest: candidate.to_string(),
            score: similarity(name, candidate),
        })
        .collect();

    let Some(max) = scores.iter().map(|s| s.score).reduce(f64::max) else {
        return Vec::new();
    };
    scores.into_iter().filter(|s| s.score == max).collect()
}
