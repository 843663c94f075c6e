//! Text similarity scoring.
//!
//! The mapping engine consumes scores through the [`SimilarityScorer`] trait,
//! so the algorithm can be swapped (a semantic scorer, say) without touching
//! selection policy. The shipped scorer is a character-level diff ratio with
//! no model and no external state.

use similar::TextDiff;

/// A normalised similarity measure over two text fragments.
///
/// Implementations must be deterministic, symmetric
/// (`score(a, b) == score(b, a)`), reflexive (`score(a, a) == 1.0`), and
/// bounded to `[0.0, 1.0]`. Strings differing only in letter case score
/// exactly 1.0.
pub trait SimilarityScorer {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Character-level diff match ratio: `2 * matches / (len(a) + len(b))`.
///
/// The classic difflib ratio, computed over lowercased input with a Myers
/// diff. Equal strings short-circuit to exactly 1.0, which also covers two
/// empty strings; a one-sided empty string scores 0.0. Arguments are ordered
/// canonically before diffing, so symmetry holds bit for bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffRatioScorer;

impl SimilarityScorer for DiffRatioScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        if a == b {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let (first, second) = if a <= b { (&a, &b) } else { (&b, &a) };
        let diff = TextDiff::from_chars(first.as_str(), second.as_str());
        f64::from(diff.ratio())
    }
}
