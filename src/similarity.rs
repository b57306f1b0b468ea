//! Similarity matcher — normalized edit distance over short words.
//!
//! DESIGN
//! ======
//! Speech transcripts are noisy; a spoken answer counts as correct when it is
//! close enough to the expected word rather than byte-identical. Similarity
//! is classic dynamic-programming edit distance divided by the longer
//! string's length, inverted into `[0, 1]`. Pure and deterministic — the
//! only consumers are response verification paths.

/// Accept threshold for general fuzzy comparisons.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Accept threshold for pronunciation tests, which tolerate more noise.
pub const PRONUNCIATION_THRESHOLD: f64 = 0.7;

/// Normalized similarity between two strings in `[0, 1]`.
///
/// `1.0` means identical (two empty strings are identical); `0.0` means
/// every character differs. O(n·m) time, O(m) space.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }

    // Single-row DP: prev[j] is the distance for a[..i-1] vs b[..j].
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let insertion = current[j] + 1;
            let deletion = prev[j + 1] + 1;
            current[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    let distance = prev[b.len()];
    #[allow(clippy::cast_precision_loss)]
    {
        1.0 - distance as f64 / max_len as f64
    }
}

/// Whether a spoken/typed answer counts as the expected word.
///
/// Accepts on exact case-insensitive equality, on either trimmed string
/// containing the other (transcripts often arrive with filler around the
/// target word), or on `similarity >= threshold`.
#[must_use]
pub fn matches(spoken: &str, expected: &str, threshold: f64) -> bool {
    let spoken = spoken.trim().to_lowercase();
    let expected = expected.trim().to_lowercase();

    if spoken.is_empty() || expected.is_empty() {
        return spoken == expected;
    }
    if spoken == expected {
        return true;
    }
    if spoken.contains(&expected) || expected.contains(&spoken) {
        return true;
    }
    similarity(&spoken, &expected) >= threshold
}

#[cfg(test)]
#[path = "similarity_test.rs"]
mod tests;
