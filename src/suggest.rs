//! Bet suggestion synthesis.
//!
//! Merges the independent signals (rule matches, hot numbers, wheel
//! neighbors, missing numbers) into one deduplicated, tiered pick list
//! with a confidence grade and discipline warnings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::analysis::SectionSignal;
use crate::rules::RuleMatch;
use crate::types::{PickSource, Tier, WeightedPick};
use crate::wheel;

/// Picks taken from rule matches.
const MAX_RULE_PICKS: usize = 6;
/// Picks taken from the hot-number list.
const MAX_HOT_PICKS: usize = 5;
/// Picks taken from wheel neighbors of the top hot numbers.
const MAX_NEIGHBOR_PICKS: usize = 5;
/// Picks taken from the missing-number list.
const MAX_MISSING_PICKS: usize = 3;
/// Default cap on the combined pick list.
pub const DEFAULT_MAX_PICKS: usize = 15;
/// Safety-tier stake as a fraction of the bingo stake.
const SAFETY_DIVISOR: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Overall confidence of a synthesized suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "HIGH"),
            Confidence::Medium => write!(f, "MEDIUM"),
            Confidence::Low => write!(f, "LOW"),
        }
    }
}

/// Signals feeding one synthesis pass.
pub struct SuggestionInputs<'a> {
    pub hot_numbers: &'a [u8],
    pub missing_numbers: &'a [u8],
    pub section: Option<&'a SectionSignal>,
    pub rule_matches: &'a [RuleMatch],
}

/// A complete synthesized bet suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct BetSuggestion {
    pub picks: Vec<WeightedPick>,
    pub total_stake: Decimal,
    pub confidence: Confidence,
    /// Human-facing section description, when a signal is present.
    pub section: Option<String>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Merge all signals into a tiered pick list.
///
/// `bingo_stake` is the per-number stake for high-confidence picks;
/// safety picks get a quarter of it. `recommended_max` caps the total
/// stake the discipline engine is comfortable with: exceeding it only
/// warns, it never truncates.
pub fn synthesize(
    inputs: &SuggestionInputs<'_>,
    bingo_stake: Decimal,
    recommended_max: Decimal,
    max_picks: usize,
) -> BetSuggestion {
    let safety_stake = bingo_stake / SAFETY_DIVISOR;
    let mut picks: Vec<WeightedPick> = Vec::new();
    let mut picked = [false; 37];

    // 1. Rule-suggested numbers, strongest signal first.
    let mut rule_picks = 0;
    'rules: for m in inputs.rule_matches {
        for &n in &m.suggestions {
            if rule_picks == MAX_RULE_PICKS {
                break 'rules;
            }
            if n <= 36 && !picked[n as usize] {
                rule_picks += 1;
            }
            push(&mut picks, &mut picked, n, bingo_stake, PickSource::Rule, Tier::Bingo);
        }
    }

    // 2. Hot numbers not already covered.
    let mut hot_picks = 0;
    for &n in inputs.hot_numbers {
        if hot_picks == MAX_HOT_PICKS {
            break;
        }
        if n <= 36 && !picked[n as usize] {
            hot_picks += 1;
        }
        push(&mut picks, &mut picked, n, bingo_stake, PickSource::Hot, Tier::Bingo);
    }

    // 3. Close wheel neighbors of the two strongest hot numbers.
    let mut neighbor_picks = 0;
    'neighbors: for &hot in inputs.hot_numbers.iter().take(2) {
        for n in wheel::neighbors(hot, 2) {
            if neighbor_picks == MAX_NEIGHBOR_PICKS {
                break 'neighbors;
            }
            if !picked[n as usize] {
                neighbor_picks += 1;
            }
            push(&mut picks, &mut picked, n, safety_stake, PickSource::Neighbor, Tier::Safety);
        }
    }

    // 4. Missing numbers as long-shot coverage.
    let mut missing_picks = 0;
    for &n in inputs.missing_numbers {
        if missing_picks == MAX_MISSING_PICKS {
            break;
        }
        if n <= 36 && !picked[n as usize] {
            missing_picks += 1;
        }
        push(&mut picks, &mut picked, n, safety_stake, PickSource::Missing, Tier::Safety);
    }

    picks.truncate(max_picks);
    let total_stake: Decimal = picks.iter().map(|p| p.stake).sum();

    let mut warnings = Vec::new();
    let mut confidence = grade(inputs, picks.len());
    if inputs.hot_numbers.is_empty() {
        warnings.push("no hot numbers in the current window; low-signal suggestion".to_string());
        confidence = Confidence::Low;
    }
    if total_stake > recommended_max {
        warnings.push(format!(
            "total stake {total_stake} exceeds the recommended maximum {recommended_max}"
        ));
    }

    debug!(
        picks = picks.len(),
        %total_stake,
        confidence = %confidence,
        "Suggestion synthesized"
    );

    BetSuggestion {
        picks,
        total_stake,
        confidence,
        section: inputs.section.map(SectionSignal::describe),
        warnings,
        created_at: Utc::now(),
    }
}

fn push(
    picks: &mut Vec<WeightedPick>,
    picked: &mut [bool; 37],
    number: u8,
    stake: Decimal,
    source: PickSource,
    tier: Tier,
) {
    if number <= 36 && !picked[number as usize] {
        picked[number as usize] = true;
        picks.push(WeightedPick {
            number,
            stake,
            source,
            tier,
        });
    }
}

fn grade(inputs: &SuggestionInputs<'_>, pick_count: usize) -> Confidence {
    if inputs.hot_numbers.len() >= 5 && inputs.section.is_some() && pick_count >= 10 {
        Confidence::High
    } else if inputs.hot_numbers.len() >= 3 && pick_count >= 5 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::section_signal;
    use crate::rules::{engine::EvaluationContext, Rule, RuleKind};
    use crate::types::Outcome;
    use rust_decimal_macros::dec;

    fn history_of(numbers: &[u8]) -> Vec<Outcome> {
        let total = numbers.len() as u32;
        numbers
            .iter()
            .enumerate()
            .map(|(i, &n)| Outcome::new(n, total - i as u32).unwrap())
            .collect()
    }

    fn rule_match(suggestions: Vec<u8>) -> RuleMatch {
        let rule = Rule::new("32 Adjacent", RuleKind::Adjacent, vec![32], suggestions, 75);
        let h = history_of(&[32]);
        let ctx = EvaluationContext {
            history: &h,
            session_spins: 1,
            lookback: 30,
        };
        crate::rules::engine::match_rule(&rule, &ctx).expect("rule should match")
    }

    fn inputs<'a>(
        hot: &'a [u8],
        missing: &'a [u8],
        section: Option<&'a SectionSignal>,
        matches: &'a [RuleMatch],
    ) -> SuggestionInputs<'a> {
        SuggestionInputs {
            hot_numbers: hot,
            missing_numbers: missing,
            section,
            rule_matches: matches,
        }
    }

    #[test]
    fn test_no_duplicate_picks() {
        let matches = vec![rule_match(vec![30, 34])];
        // 30 also hot, 34 also missing: must appear once each
        let i = inputs(&[30, 17], &[34, 8], None, &matches);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);

        let mut numbers: Vec<u8> = s.picks.iter().map(|p| p.number).collect();
        let before = numbers.len();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), before);
    }

    #[test]
    fn test_total_stake_is_sum_of_picks() {
        let matches = vec![rule_match(vec![30, 34])];
        let i = inputs(&[17, 5, 22], &[8], None, &matches);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);
        let sum: Decimal = s.picks.iter().map(|p| p.stake).sum();
        assert_eq!(s.total_stake, sum);
    }

    #[test]
    fn test_priority_order_rule_first() {
        let matches = vec![rule_match(vec![30, 34])];
        let i = inputs(&[17], &[], None, &matches);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);
        assert_eq!(s.picks[0].number, 30);
        assert_eq!(s.picks[0].source, PickSource::Rule);
        assert_eq!(s.picks[0].tier, Tier::Bingo);
        assert_eq!(s.picks[1].number, 34);
    }

    #[test]
    fn test_safety_stake_is_quarter_of_bingo() {
        let i = inputs(&[17, 5], &[8], None, &[]);
        let s = synthesize(&i, dec!(4), dec!(100), DEFAULT_MAX_PICKS);
        let safety = s
            .picks
            .iter()
            .find(|p| p.tier == Tier::Safety)
            .expect("safety pick");
        assert_eq!(safety.stake, dec!(1));
    }

    #[test]
    fn test_neighbor_picks_from_top_two_hot() {
        let i = inputs(&[0, 5], &[], None, &[]);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);
        let neighbors: Vec<u8> = s
            .picks
            .iter()
            .filter(|p| p.source == PickSource::Neighbor)
            .map(|p| p.number)
            .collect();
        assert!(!neighbors.is_empty());
        assert!(neighbors.len() <= 5);
        // neighbors of 0 at distance 2: 26, 32, 3, 15
        assert!(neighbors.iter().any(|n| [26, 32, 3, 15].contains(n)));
    }

    #[test]
    fn test_cap_preserves_insertion_order() {
        let matches = vec![rule_match(vec![30, 34, 3, 26, 12, 35])];
        let i = inputs(&[17, 5, 22, 9, 14], &[1, 2, 6], None, &matches);
        let s = synthesize(&i, dec!(2), dec!(100), 8);
        assert_eq!(s.picks.len(), 8);
        // rule picks stay in front
        assert!(s.picks[..6].iter().all(|p| p.source == PickSource::Rule));
    }

    #[test]
    fn test_confidence_high() {
        let h = history_of(&[0, 32, 15, 19, 4, 0, 32, 15, 7, 10, 24, 1]);
        let signal = section_signal(&h, 20).expect("signal");
        let matches = vec![rule_match(vec![30, 34, 3])];
        let i = inputs(&[17, 5, 22, 9, 14], &[1, 2, 6], Some(&signal), &matches);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);
        assert!(s.picks.len() >= 10);
        assert_eq!(s.confidence, Confidence::High);
        assert!(s.section.is_some());
    }

    #[test]
    fn test_confidence_medium() {
        let i = inputs(&[17, 5, 22], &[], None, &[]);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);
        assert_eq!(s.confidence, Confidence::Medium);
    }

    #[test]
    fn test_no_hot_numbers_forces_low_with_warning() {
        let matches = vec![rule_match(vec![30, 34, 3, 26, 12])];
        let i = inputs(&[], &[1, 2, 6], None, &matches);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);
        assert_eq!(s.confidence, Confidence::Low);
        assert!(s.warnings.iter().any(|w| w.contains("no hot numbers")));
    }

    #[test]
    fn test_overstake_warning() {
        let matches = vec![rule_match(vec![30, 34, 3, 26])];
        let i = inputs(&[17, 5], &[], None, &matches);
        let s = synthesize(&i, dec!(10), dec!(5), DEFAULT_MAX_PICKS);
        assert!(s
            .warnings
            .iter()
            .any(|w| w.contains("recommended maximum")));
    }

    #[test]
    fn test_empty_inputs_yield_empty_suggestion() {
        let i = inputs(&[], &[], None, &[]);
        let s = synthesize(&i, dec!(2), dec!(100), DEFAULT_MAX_PICKS);
        assert!(s.picks.is_empty());
        assert_eq!(s.total_stake, Decimal::ZERO);
        assert_eq!(s.confidence, Confidence::Low);
    }
}
