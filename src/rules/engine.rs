//! Rule evaluation against recent history.
//!
//! One pure matcher per rule kind, dispatched on the rule's type tag.
//! Matchers inspect only the portion of history their semantics need
//! and return either no-match or a [`RuleMatch`]. Evaluation order
//! across rules never affects correctness: all independently matching
//! rules are reported.

use serde::Serialize;
use uuid::Uuid;

use crate::types::{Color, Outcome};
use crate::wheel;

use super::{Rule, RuleKind, DEFAULT_GAP_WINDOW, DEFAULT_SPIN_THRESHOLD};

/// Cap on group-correlation suggestion lists.
const GROUP_SUGGESTION_CAP: usize = 15;
/// Cap on gap-pattern suggestion lists.
const GAP_SUGGESTION_CAP: usize = 5;
/// Cap on streak-breaker suggestion lists.
const STREAK_SUGGESTION_CAP: usize = 10;
/// Cap on dozen-cycle suggestion lists.
const DOZEN_SUGGESTION_CAP: usize = 12;

// ---------------------------------------------------------------------------
// Evaluation context and match result
// ---------------------------------------------------------------------------

/// Immutable snapshot a rule evaluation runs against.
pub struct EvaluationContext<'a> {
    /// Outcome history, most-recent-first.
    pub history: &'a [Outcome],
    /// Total spins recorded in the session.
    pub session_spins: u32,
    /// Lookback length for window-scoped kinds (cold-number, gap-pattern).
    pub lookback: usize,
}

/// A rule that matched, with its evidence and suggested numbers.
#[derive(Debug, Clone, Serialize)]
pub struct RuleMatch {
    pub rule_id: Uuid,
    pub rule_name: String,
    pub kind: RuleKind,
    pub confidence: u8,
    /// The outcomes (or numbers) that caused the match.
    pub triggered_by: Vec<u8>,
    pub suggestions: Vec<u8>,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Evaluate one rule. The caller has already checked `enabled` and
/// structural validity.
pub fn match_rule(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<RuleMatch> {
    let (triggered_by, suggestions, reason) = match rule.kind {
        RuleKind::Adjacent => match_adjacent(rule, ctx)?,
        RuleKind::Pair => match_pair(rule, ctx)?,
        RuleKind::DelayedPair => match_delayed_pair(rule, ctx)?,
        RuleKind::GroupCorrelation => match_group_correlation(rule, ctx)?,
        RuleKind::Sequence => match_sequence(rule, ctx)?,
        RuleKind::HotStreak => match_hot_streak(rule, ctx)?,
        RuleKind::ColdNumber => match_cold_number(rule, ctx)?,
        RuleKind::TimeBased => match_time_based(rule, ctx)?,
        RuleKind::ColorAlternation => match_color_alternation(rule, ctx)?,
        RuleKind::ParityAlternation => match_parity_alternation(rule, ctx)?,
        RuleKind::SectorBounce => match_sector_bounce(rule, ctx)?,
        RuleKind::DozenCycle => match_dozen_cycle(rule, ctx)?,
        RuleKind::RepeatingDistance => match_repeating_distance(rule, ctx)?,
        RuleKind::MirrorNumber => match_mirror_number(rule, ctx)?,
        RuleKind::GapPattern => match_gap_pattern(rule, ctx)?,
        RuleKind::StreakBreaker => match_streak_breaker(rule, ctx)?,
    };

    if suggestions.is_empty() {
        return None;
    }

    Some(RuleMatch {
        rule_id: rule.id,
        rule_name: rule.name.clone(),
        kind: rule.kind,
        confidence: rule.confidence,
        triggered_by,
        suggestions,
        reason,
    })
}

type Matched = (Vec<u8>, Vec<u8>, String);

fn push_unique(out: &mut Vec<u8>, n: u8) {
    if !out.contains(&n) {
        out.push(n);
    }
}

// ---------------------------------------------------------------------------
// Per-kind matchers
// ---------------------------------------------------------------------------

fn match_adjacent(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let last = ctx.history.first()?;
    if !rule.triggers.contains(&last.number) {
        return None;
    }
    Some((
        vec![last.number],
        rule.suggestions.clone(),
        format!("{} landed; adjacent pattern active", last.number),
    ))
}

fn match_pair(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let last = ctx.history.first()?;
    if !rule.triggers.contains(&last.number) {
        return None;
    }
    Some((
        vec![last.number],
        rule.suggestions.clone(),
        format!("{} landed; paired numbers expected", last.number),
    ))
}

fn match_delayed_pair(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    // Trigger two spins back, suggestion expected on the upcoming spin.
    let delayed = ctx.history.get(2)?;
    if !rule.triggers.contains(&delayed.number) {
        return None;
    }
    Some((
        vec![delayed.number],
        rule.suggestions.clone(),
        format!("{} landed two spins back; delayed pair due", delayed.number),
    ))
}

fn match_group_correlation(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let last = ctx.history.first()?;
    if !rule.triggers.contains(&last.number) {
        return None;
    }
    // Rest of the group first, then each member's close wheel neighbors.
    let mut suggestions = Vec::new();
    for &member in &rule.triggers {
        if member != last.number {
            push_unique(&mut suggestions, member);
        }
    }
    for &member in &rule.triggers {
        for n in wheel::neighbors(member, 2) {
            if n != last.number {
                push_unique(&mut suggestions, n);
            }
        }
    }
    suggestions.truncate(GROUP_SUGGESTION_CAP);
    Some((
        vec![last.number],
        suggestions,
        format!("{} is part of a correlated group", last.number),
    ))
}

fn match_sequence(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    // Triggers are chronological (oldest first); history is newest first.
    let k = rule.triggers.len();
    if ctx.history.len() < k {
        return None;
    }
    let recent_chronological: Vec<u8> = ctx.history[..k].iter().rev().map(|o| o.number).collect();
    if recent_chronological != rule.triggers {
        return None;
    }
    Some((
        recent_chronological,
        rule.suggestions.clone(),
        format!("sequence {:?} completed", rule.triggers),
    ))
}

fn match_hot_streak(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let window = &ctx.history[..ctx.history.len().min(5)];
    let hot = rule.triggers.iter().copied().find(|&t| {
        window.iter().filter(|o| o.number == t).count() >= 2
    })?;
    let suggestions = if rule.suggestions.is_empty() {
        vec![hot]
    } else {
        rule.suggestions.clone()
    };
    Some((
        vec![hot],
        suggestions,
        format!("{hot} repeating within the last 5 spins"),
    ))
}

fn match_cold_number(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let window = &ctx.history[..ctx.history.len().min(ctx.lookback)];
    if window.is_empty() {
        return None;
    }
    let cold = rule
        .triggers
        .iter()
        .copied()
        .find(|&t| !window.iter().any(|o| o.number == t))?;
    let suggestions = if rule.suggestions.is_empty() {
        vec![cold]
    } else {
        rule.suggestions.clone()
    };
    Some((
        vec![cold],
        suggestions,
        format!("{cold} absent from the last {} spins", window.len()),
    ))
}

fn match_time_based(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let threshold = rule.spin_threshold.unwrap_or(DEFAULT_SPIN_THRESHOLD);
    if ctx.session_spins < threshold {
        return None;
    }
    Some((
        Vec::new(),
        rule.suggestions.clone(),
        format!("session reached {} spins (threshold {threshold})", ctx.session_spins),
    ))
}

fn match_color_alternation(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    if ctx.history.len() < 3 {
        return None;
    }
    let color = ctx.history[0].color;
    if color == Color::Green || ctx.history[1..3].iter().any(|o| o.color != color) {
        return None;
    }
    let suggestions = if rule.suggestions.is_empty() {
        wheel::opposite_color_numbers(ctx.history[0].number).to_vec()
    } else {
        rule.suggestions.clone()
    };
    Some((
        ctx.history[..3].iter().map(|o| o.number).collect(),
        suggestions,
        format!("three {color} spins in a row; opposite color due"),
    ))
}

fn match_parity_alternation(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    if ctx.history.len() < 3 {
        return None;
    }
    let parity = ctx.history[0].parity?;
    if ctx.history[1..3].iter().any(|o| o.parity != Some(parity)) {
        return None;
    }
    let suggestions = if rule.suggestions.is_empty() {
        wheel::opposite_parity_numbers(ctx.history[0].number).to_vec()
    } else {
        rule.suggestions.clone()
    };
    Some((
        ctx.history[..3].iter().map(|o| o.number).collect(),
        suggestions,
        format!("three {parity} spins in a row; opposite parity due"),
    ))
}

fn match_sector_bounce(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let last = ctx.history.first()?;
    let sector = wheel::numeric_sector(last.number);
    if !rule.triggers.contains(&sector) {
        return None;
    }
    Some((
        vec![last.number],
        rule.suggestions.clone(),
        format!("{} landed in decade sector {sector}", last.number),
    ))
}

fn match_dozen_cycle(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    if ctx.history.len() < 5 {
        return None;
    }
    let window = &ctx.history[..5];
    let mut counts = [0usize; 4]; // index 1-3; zeros don't count
    for outcome in window {
        if let Some(d) = outcome.dozen {
            counts[d as usize] += 1;
        }
    }
    let heavy = (1..=3u8).find(|&d| counts[d as usize] >= 3)?;
    let suggestions = if rule.suggestions.is_empty() {
        let mut others: Vec<u8> = (1..=3u8)
            .filter(|&d| d != heavy)
            .flat_map(wheel::dozen_numbers)
            .collect();
        others.sort_unstable();
        others.truncate(DOZEN_SUGGESTION_CAP);
        others
    } else {
        rule.suggestions.clone()
    };
    Some((
        window.iter().map(|o| o.number).collect(),
        suggestions,
        format!("dozen {heavy} claimed {} of the last 5 spins", counts[heavy as usize]),
    ))
}

fn match_repeating_distance(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    if ctx.history.len() < 2 {
        return None;
    }
    let last = ctx.history[0].number;
    let previous = ctx.history[1].number;
    // A repeat projects distance 0, i.e. the repeated number itself.
    let distance = last.abs_diff(previous);
    let mut suggestions = Vec::new();
    if last >= distance {
        push_unique(&mut suggestions, last - distance);
    }
    if last as u16 + distance as u16 <= 36 {
        push_unique(&mut suggestions, last + distance);
    }
    // Configured overrides win when present.
    if !rule.suggestions.is_empty() {
        suggestions = rule.suggestions.clone();
    }
    if suggestions.is_empty() {
        return None;
    }
    Some((
        vec![previous, last],
        suggestions,
        format!("distance {distance} between the last two spins"),
    ))
}

fn match_mirror_number(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let last = ctx.history.first()?;
    let mirror = wheel::mirror(last.number)?;
    let suggestions = if rule.suggestions.is_empty() {
        vec![mirror]
    } else {
        rule.suggestions.clone()
    };
    Some((
        vec![last.number],
        suggestions,
        format!("{mirror} sits opposite {} on the wheel", last.number),
    ))
}

fn match_gap_pattern(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    let gap = rule.gap_window.unwrap_or(DEFAULT_GAP_WINDOW);
    let window = &ctx.history[..ctx.history.len().min(ctx.lookback)];
    if window.len() <= gap {
        return None;
    }
    let (recent, older) = window.split_at(gap);

    // Numbers seen before the gap but silent during it.
    let mut gapped: Vec<u8> = Vec::new();
    for outcome in older {
        if !recent.iter().any(|o| o.number == outcome.number) {
            push_unique(&mut gapped, outcome.number);
        }
    }
    if gapped.is_empty() {
        return None;
    }
    let mut suggestions = if rule.suggestions.is_empty() {
        gapped.clone()
    } else {
        rule.suggestions.clone()
    };
    suggestions.truncate(GAP_SUGGESTION_CAP);
    Some((
        gapped,
        suggestions,
        format!("numbers silent for the last {gap} spins after earlier hits"),
    ))
}

fn match_streak_breaker(rule: &Rule, ctx: &EvaluationContext<'_>) -> Option<Matched> {
    if ctx.history.len() < 5 {
        return None;
    }
    let window = &ctx.history[..5];
    let mut counts = [0usize; 37];
    for outcome in window {
        counts[outcome.number as usize] += 1;
    }
    // most recent repeater wins
    let streaker = window
        .iter()
        .map(|o| o.number)
        .find(|&n| counts[n as usize] >= 2)?;

    let mut suggestions = if rule.suggestions.is_empty() {
        let mut out = Vec::new();
        for &n in wheel::opposite_color_numbers(streaker) {
            push_unique(&mut out, n);
        }
        for &n in wheel::opposite_parity_numbers(streaker) {
            push_unique(&mut out, n);
        }
        out
    } else {
        rule.suggestions.clone()
    };
    suggestions.truncate(STREAK_SUGGESTION_CAP);
    Some((
        vec![streaker],
        suggestions,
        format!("{streaker} repeating; betting against the streak"),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
