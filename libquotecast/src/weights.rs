//! History-penalized sampling weights
//!
//! Converts per-candidate use histories into a probability distribution that
//! disfavors repeats, plus the draw that samples from it. Smoothing keeps
//! every candidate sampleable: even the most-used author retains a non-zero
//! weight, so nothing is ever permanently excluded.

use rand::Rng;
use std::collections::HashMap;

/// Additive smoothing constant
pub const ALPHA: f64 = 1.0;

/// Raw use score of a single candidate's history multiset
fn use_score<S: AsRef<str>>(history: &[S], penalize: f64) -> f64 {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for marker in history {
        *counts.entry(marker.as_ref()).or_insert(0) += 1;
    }
    counts.values().map(|&n| n as f64 * penalize).sum()
}

/// Compute a probability distribution over candidates from their histories
///
/// Each history is the multiset of prior-use markers relevant to that
/// candidate. Scores are inverted against the maximum so heavy use means low
/// weight, Laplace-smoothed with [`ALPHA`], and normalized to sum to 1. The
/// output is positionally aligned with the input; identical histories yield
/// a uniform distribution.
pub fn compute_weights<S: AsRef<str>>(histories: &[Vec<S>], penalize: f64) -> Vec<f64> {
    if histories.is_empty() {
        return Vec::new();
    }

    let raw: Vec<f64> = histories.iter().map(|h| use_score(h, penalize)).collect();
    let max = raw.iter().cloned().fold(0.0, f64::max);
    let smoothed: Vec<f64> = raw.iter().map(|&score| (max - score) + ALPHA).collect();
    let total: f64 = smoothed.iter().sum();

    smoothed.iter().map(|&value| value / total).collect()
}

/// Draw an index from a probability distribution
///
/// Walks the cumulative sum against a uniform draw in `[0, 1)`. The last
/// index is always selectable: when floating-point rounding leaves the
/// cumulative sum just short of the draw, the walk falls through to it
/// rather than running off the end.
///
/// # Panics
///
/// Panics if `weights` is empty.
pub fn sample_index(weights: &[f64], rng: &mut impl Rng) -> usize {
    assert!(!weights.is_empty(), "cannot sample from an empty distribution");

    let draw: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return index;
        }
    }
    weights.len() - 1
}

/// Draw one item from a candidate list with an aligned distribution
///
/// # Panics
///
/// Panics if `items` and `weights` differ in length or are empty.
pub fn weighted_choice<'a, T>(items: &'a [T], weights: &[f64], rng: &mut impl Rng) -> &'a T {
    assert_eq!(
        items.len(),
        weights.len(),
        "candidate list and distribution must be aligned"
    );
    &items[sample_index(weights, rng)]
}
