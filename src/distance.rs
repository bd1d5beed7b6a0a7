// distance.rs - Levenshtein edit distance used to score correction candidates

/// Minimum number of single-character insertions, deletions or substitutions
/// turning `source` into `target`. Operates on `char`s, not bytes.
pub fn levenshtein(source: &str, target: &str) -> usize {
    let source_chars: Vec<char> = source.chars().collect();
    let target_chars: Vec<char> = target.chars().collect();

    if source_chars.is_empty() {
        return target_chars.len();
    }
    if target_chars.is_empty() {
        return source_chars.len();
    }

    // Two rows are enough: row i only reads row i - 1
    let mut prev: Vec<usize> = (0..=target_chars.len()).collect();
    let mut curr = vec![0; target_chars.len() + 1];

    for (i, &sc) in source_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &tc) in target_chars.iter().enumerate() {
            let cost = if sc == tc { 0 } else { 1 };

            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            let substitution = prev[j] + cost;

            curr[j + 1] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[target_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(levenshtein("aple", "able"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_transposition_costs_two() {
        // Plain Levenshtein, no Damerau transposition
        assert_eq!(levenshtein("teh", "the"), 2);
    }
}
