//! Fuzzy Text Matcher: Ratcliff/Obershelp similarity ratio.
//!
//! `ratio = 2·M / (len(a) + len(b))` where `M` is the total length of the
//! matching blocks found by repeatedly taking the longest common substring
//! and recursing on the unmatched pieces to its left and right.
//!
//! No case folding or trimming happens here; callers normalize first.

/// Similarity ratio in `[0.0, 1.0]`. Lengths count Unicode scalar values.
///
/// Longest-block search breaks ties toward the earliest position in its
/// first argument, which can make the block decomposition depend on argument
/// order. Both orders are evaluated and the larger match count is used, so
/// `similarity(a, b) == similarity(b, a)` always holds.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total_len = a.len() + b.len();
    if total_len == 0 {
        return 1.0;
    }

    let matched = matching_chars(&a, &b).max(matching_chars(&b, &a));
    (2 * matched) as f64 / total_len as f64
}

/// `true` when `similarity(a, b) >= threshold`.
pub fn is_match(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) >= threshold
}

/// Sum of matching block lengths between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(&a[alo..ahi], &b[blo..bhi]);
        if k == 0 {
            continue;
        }
        let (i, j) = (alo + i, blo + j);
        total += k;

        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common substring as `(start_in_a, start_in_b, len)`.
/// Among equally long blocks, the earliest in `a` wins, then the earliest in `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let k = cur[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}
