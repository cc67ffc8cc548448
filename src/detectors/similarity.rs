//! Name similarity scoring
//!
//! Normalized edit-distance similarity with a length-ratio pruning bound.
//! The pruning is lossless: with `m = min(len)` and `M = max(len)`, at least
//! `M - m` insertions or deletions are always required, so the similarity can
//! never exceed `1 - (M - m)/M = m/M`. If that bound is already below the
//! threshold, the DP matrix never needs to be computed.

/// Standard unit-cost Levenshtein edit distance, rolling two-row DP.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr: Vec<usize> = vec![0; b_chars.len() + 1];

    for (i, &ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Normalized similarity in [0, 1]: `1 - levenshtein(a,b) / max(len)`.
/// Identical strings score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Upper bound on the achievable similarity given only the two lengths.
pub fn length_ratio_bound(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 1.0;
    }
    a_len.min(b_len) as f64 / max_len as f64
}

/// Whether a pair can possibly reach `threshold`. Run before the O(|a|·|b|)
/// distance computation; skipping on a false result never changes the
/// classification.
pub fn passes_length_prune(a: &str, b: &str, threshold: f64) -> bool {
    length_ratio_bound(a, b) >= threshold
}

/// Strip the module-prefix segment from a function name: a single leading
/// underscore is removed, then everything up to and including the first
/// remaining underscore. `git_check_valid` → `check_valid`,
/// `_private_init` → `init`. Names without an underscore are unchanged.
pub fn strip_module_prefix(name: &str) -> &str {
    let name = name.strip_prefix('_').unwrap_or(name);
    match name.find('_') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
