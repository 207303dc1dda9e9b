//! Hot-number and missing-number detection.

use crate::types::Outcome;

/// Hard cap on the hot-number list.
const MAX_HOT_NUMBERS: usize = 10;

/// Numbers appearing at least `min_freq` times in the last `lookback`
/// outcomes, ordered by descending count then ascending number. Capped
/// at 10 entries.
///
/// `history` is most-recent-first; a shorter history is used as-is.
pub fn hot_numbers(history: &[Outcome], lookback: usize, min_freq: usize) -> Vec<u8> {
    let counts = frequency_counts(history, lookback);

    let mut hot: Vec<(u8, usize)> = counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c >= min_freq && c > 0)
        .map(|(n, &c)| (n as u8, c))
        .collect();

    hot.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hot.truncate(MAX_HOT_NUMBERS);
    hot.into_iter().map(|(n, _)| n).collect()
}

/// Numbers that have not appeared in the last `lookback` outcomes,
/// ascending, capped at `max_count`.
pub fn missing_numbers(history: &[Outcome], lookback: usize, max_count: usize) -> Vec<u8> {
    let window = &history[..lookback.min(history.len())];

    let mut seen = [false; 37];
    for outcome in window {
        seen[outcome.number as usize] = true;
    }

    (0..=36u8)
        .filter(|&n| !seen[n as usize])
        .take(max_count)
        .collect()
}

/// Occurrence count per number over the last `lookback` outcomes.
pub fn frequency_counts(history: &[Outcome], lookback: usize) -> [usize; 37] {
    let window = &history[..lookback.min(history.len())];
    let mut counts = [0usize; 37];
    for outcome in window {
        counts[outcome.number as usize] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(numbers: &[u8]) -> Vec<Outcome> {
        // numbers are given most-recent-first, matching the slice contract
        let total = numbers.len() as u32;
        numbers
            .iter()
            .enumerate()
            .map(|(i, &n)| Outcome::new(n, total - i as u32).unwrap())
            .collect()
    }

    #[test]
    fn test_hot_numbers_respects_min_freq() {
        // 17 appears 4 times in 20 outcomes, everything else at most twice
        let h = history_of(&[
            17, 3, 17, 8, 22, 17, 9, 3, 30, 17, 5, 11, 8, 26, 1, 35, 14, 20, 33, 6,
        ]);
        let hot = hot_numbers(&h, 20, 3);
        assert!(hot.contains(&17));
        assert!(!hot.contains(&3)); // only twice
    }

    #[test]
    fn test_hot_numbers_sorted_by_count_then_number() {
        let h = history_of(&[5, 5, 5, 9, 9, 9, 2, 2, 7, 7]);
        let hot = hot_numbers(&h, 10, 2);
        // 5 and 9 both count 3: ascending number breaks the tie
        assert_eq!(hot, vec![5, 9, 2, 7]);
    }

    #[test]
    fn test_hot_numbers_capped_at_ten() {
        let mut numbers = Vec::new();
        for n in 1..=12u8 {
            numbers.push(n);
            numbers.push(n);
        }
        let h = history_of(&numbers);
        let hot = hot_numbers(&h, numbers.len(), 2);
        assert_eq!(hot.len(), 10);
    }

    #[test]
    fn test_hot_numbers_empty_history() {
        assert!(hot_numbers(&[], 20, 3).is_empty());
    }

    #[test]
    fn test_hot_numbers_lookback_shorter_than_history() {
        // 8 occurs twice, but only once inside the lookback window
        let h = history_of(&[8, 1, 2, 3, 4, 8]);
        let hot = hot_numbers(&h, 5, 2);
        assert!(hot.is_empty());
    }

    #[test]
    fn test_missing_numbers_ascending_and_capped() {
        let h = history_of(&[0, 1, 2, 3]);
        let missing = missing_numbers(&h, 10, 5);
        assert_eq!(missing, vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_missing_numbers_none_missing() {
        let all: Vec<u8> = (0..=36).collect();
        let h = history_of(&all);
        assert!(missing_numbers(&h, 37, 10).is_empty());
    }

    #[test]
    fn test_missing_numbers_full_set_on_empty_history() {
        let missing = missing_numbers(&[], 20, 50);
        assert_eq!(missing.len(), 37);
        assert_eq!(missing[0], 0);
        assert_eq!(missing[36], 36);
    }

    #[test]
    fn test_frequency_counts() {
        let h = history_of(&[4, 4, 0, 36]);
        let counts = frequency_counts(&h, 10);
        assert_eq!(counts[4], 2);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[36], 1);
        assert_eq!(counts[5], 0);
    }

    #[test]
    fn test_idempotence() {
        let h = history_of(&[17, 3, 17, 8, 22, 17, 9, 3]);
        assert_eq!(hot_numbers(&h, 8, 2), hot_numbers(&h, 8, 2));
        assert_eq!(missing_numbers(&h, 8, 5), missing_numbers(&h, 8, 5));
    }
}
