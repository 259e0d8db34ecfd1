//! Gestalt (Ratcliff/Obershelp) string similarity and closest-match search.
//!
//! The ratio is `2 * M / T`, where `T` is the combined length of both strings
//! and `M` the number of characters in the matching blocks found by
//! recursively taking the longest common substring and repeating on the
//! unmatched pieces to its left and right.

use std::collections::HashMap;

/// Similarity of `a` and `b` in `[0.0, 1.0]`
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Up to `n` candidates scoring at least `cutoff` against `word`, best first
///
/// Equal scores are ordered by the candidate text, greatest first.
pub fn close_matches<'a, S>(word: &str, candidates: &'a [S], n: usize, cutoff: f64) -> Vec<&'a str>
where
    S: AsRef<str>,
{
    if n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &'a str)> = candidates
        .iter()
        .map(|candidate| {
            let candidate = candidate.as_ref();
            (ratio(candidate, word), candidate)
        })
        .filter(|(score, _)| *score >= cutoff)
        .collect();

    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then_with(|| y.1.cmp(x.1)));
    scored.into_iter().take(n).map(|(_, candidate)| candidate).collect()
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b2j.entry(*ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }

        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // run length of the match ending at b[j], for the previous a position
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs = HashMap::new();

        if let Some(positions) = b2j.get(ch) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }

                let len = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, len);

                if len > best_len {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_len = len;
                }
            }
        }

        run_ending_at = next_runs;
    }

    (best_i, best_j, best_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_identical_and_disjoint() {
        assert!(close(ratio("wheat", "wheat"), 1.0));
        assert!(close(ratio("abc", "xyz"), 0.0));
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("", "abc"), 0.0));
    }

    #[test]
    fn test_ratio_transposition() {
        // blocks "wh", "a", "t" -> 2 * 4 / 10
        assert!(close(ratio("wheat", "whaet"), 0.8));
    }

    #[test]
    fn test_ratio_known_values() {
        assert!(close(ratio("abcd", "bcde"), 0.75));
        assert!(close(ratio("paddy", "padddy"), 10.0 / 11.0));
        assert!(close(ratio("cotton", "for"), 2.0 / 9.0));
    }

    #[test]
    fn test_close_matches_picks_best_above_cutoff() {
        let candidates = vec!["wheat".to_string(), "paddy".to_string(), "cotton".to_string()];

        assert_eq!(close_matches("whaet", &candidates, 1, 0.6), vec!["wheat"]);
        assert_eq!(close_matches("cottn", &candidates, 1, 0.6), vec!["cotton"]);
        assert!(close_matches("show", &candidates, 1, 0.6).is_empty());
    }

    #[test]
    fn test_close_matches_orders_by_score() {
        let candidates = ["apple", "ape", "peach", "apply"];
        // "apple" and "apply" both score 0.8, "ape" 0.75, "peach" 0.4
        assert_eq!(close_matches("appel", &candidates, 3, 0.6), vec!["apply", "apple", "ape"]);
    }

    #[test]
    fn test_close_matches_tie_prefers_greater_text() {
        let candidates = ["tur", "tuv"];
        assert_eq!(close_matches("tux", &candidates, 1, 0.6), vec!["tuv"]);
    }
}
