//! Bankroll discipline: stop conditions, tilt detection, stake limits.
//!
//! All functions are pure over a state snapshot so they stay trivially
//! testable; the session engine applies their verdicts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::StopReason;

use super::{BetRecord, SessionConfig, SessionState};

/// Relative stake increase treated as escalation.
const ESCALATION_RATIO: Decimal = dec!(1.5);
/// Unvalidated bets in the last 10 that flag tilt.
const TILT_VIOLATION_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Profit and stop conditions
// ---------------------------------------------------------------------------

/// Current profit as a percentage of the initial bankroll.
pub fn profit_percent(state: &SessionState) -> Decimal {
    if state.initial_bankroll.is_zero() {
        return Decimal::ZERO;
    }
    (state.current_bankroll - state.initial_bankroll) / state.initial_bankroll * dec!(100)
}

/// All stop conditions that hold, in evaluation order: stop-loss,
/// take-profit, max-spins, max-duration. The first entry becomes the
/// recorded stop reason; every entry warrants its own alert.
pub fn check_stop(
    state: &SessionState,
    config: &SessionConfig,
    now: DateTime<Utc>,
) -> Vec<StopReason> {
    let mut reasons = Vec::new();
    let profit_pct = profit_percent(state);

    if profit_pct <= config.stop_loss_percent {
        reasons.push(StopReason::StopLossHit);
    }

    let take_profit = config.take_profit_levels.iter().any(|&level| {
        state.current_bankroll >= state.initial_bankroll * (dec!(1) + level / dec!(100))
    });
    if take_profit {
        reasons.push(StopReason::TakeProfitReached);
    }

    if let Some(max_spins) = config.max_spins {
        if state.total_spins >= max_spins {
            reasons.push(StopReason::MaxSpinsReached);
        }
    }

    if let Some(max_minutes) = config.max_duration_minutes {
        if (now - state.started_at).num_minutes() >= max_minutes {
            reasons.push(StopReason::MaxDurationReached);
        }
    }

    reasons
}

// ---------------------------------------------------------------------------
// Tilt detection
// ---------------------------------------------------------------------------

/// Detect stake escalation or rule-violation clustering.
///
/// Flags tilt when the newest bet stakes more than 50% above the
/// oldest of the last 5 (two bets are enough to compare), or when 3
/// of the last 10 bets failed validation. A tilt flag never stops the
/// session by itself.
///
/// `bets` is chronological (oldest first).
pub fn detect_tilt(bets: &[BetRecord]) -> Option<String> {
    if bets.len() >= 2 {
        let window = &bets[bets.len().saturating_sub(5)..];
        let oldest = window[0].total_stake;
        let newest = window[window.len() - 1].total_stake;
        if !oldest.is_zero() && newest > oldest * ESCALATION_RATIO {
            return Some(format!(
                "stake escalated from {oldest} to {newest} over the last {} bets",
                window.len()
            ));
        }
    }

    let tail = &bets[bets.len().saturating_sub(10)..];
    let unvalidated = tail.iter().filter(|b| !b.validated).count();
    if unvalidated >= TILT_VIOLATION_COUNT {
        return Some(format!(
            "{unvalidated} of the last {} bets violated discipline rules",
            tail.len()
        ));
    }

    None
}

// ---------------------------------------------------------------------------
// Stake guidance and validation
// ---------------------------------------------------------------------------

/// Flat-bet baseline: the minimum percentage applied to the current
/// bankroll.
pub fn recommended_stake(state: &SessionState, config: &SessionConfig) -> Decimal {
    state.current_bankroll * config.flat_bet_min_percent / dec!(100)
}

/// Upper bound the discipline policy tolerates for one bet.
pub fn recommended_max_stake(state: &SessionState, config: &SessionConfig) -> Decimal {
    state.current_bankroll * config.flat_bet_max_percent / dec!(100)
}

/// Validate a proposed total stake. Returns the violation list; empty
/// means the bet passes.
pub fn validate_stake(
    state: &SessionState,
    config: &SessionConfig,
    total_stake: Decimal,
    previous_stake: Option<Decimal>,
) -> Vec<String> {
    let mut violations = Vec::new();

    if total_stake <= Decimal::ZERO {
        violations.push("stake must be positive".to_string());
        return violations;
    }

    let min = recommended_stake(state, config);
    let max = recommended_max_stake(state, config);
    if total_stake < min {
        violations.push(format!(
            "stake {total_stake} below flat-bet minimum {min}"
        ));
    }
    if total_stake > max {
        violations.push(format!(
            "stake {total_stake} above flat-bet maximum {max}"
        ));
    }
    if total_stake > state.current_bankroll {
        violations.push(format!(
            "stake {total_stake} exceeds bankroll {}",
            state.current_bankroll
        ));
    }

    if let Some(previous) = previous_stake {
        if !previous.is_zero() && total_stake > previous * ESCALATION_RATIO {
            violations.push(format!(
                "stake jumped more than 50% (from {previous} to {total_stake}); possible progressive betting"
            ));
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
