//! Session health summaries.
//!
//! Translates the discipline state into a human-facing status with
//! ordered warnings and recommendations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

use super::{discipline, BetRecord, SessionConfig, SessionState};

/// Points above stop-loss considered critical.
const CRITICAL_STOP_DISTANCE: Decimal = dec!(20);
/// Points above stop-loss considered worth a warning.
const WARNING_STOP_DISTANCE: Decimal = dec!(40);
/// Points below a take-profit level worth mentioning.
const TAKE_PROFIT_NOTE_DISTANCE: Decimal = dec!(10);
/// Violation count that escalates to a warning.
const VIOLATION_WARNING_COUNT: u32 = 5;
/// Tilt-event count that escalates to a warning.
const TILT_WARNING_COUNT: u32 = 2;
/// Remaining spins worth a countdown note.
const SPINS_REMAINING_NOTE: u32 = 10;
/// Recent bets averaged for the overbetting check.
const RECENT_BET_SAMPLE: usize = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    Ok,
    Warning,
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Ok => write!(f, "OK"),
            HealthStatus::Warning => write!(f, "WARNING"),
            HealthStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One health evaluation of a session.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub profit_percent: Decimal,
    /// Percentage points between current profit and the stop-loss line.
    pub stop_loss_distance: Decimal,
    /// Percentage points to the nearest unreached take-profit level.
    pub nearest_take_profit: Option<Decimal>,
    pub spins_remaining: Option<u32>,
    pub tilt: bool,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Summarize session health from the state, config, and recent bets.
pub fn health_snapshot(
    state: &SessionState,
    config: &SessionConfig,
    bets: &[BetRecord],
) -> HealthSnapshot {
    let mut status = HealthStatus::Ok;
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    fn escalate(status: &mut HealthStatus, to: HealthStatus) {
        if to > *status {
            *status = to;
        }
    }

    let profit_pct = discipline::profit_percent(state);
    let stop_distance = profit_pct - config.stop_loss_percent;

    if stop_distance < CRITICAL_STOP_DISTANCE {
        escalate(&mut status, HealthStatus::Critical);
        warnings.push(format!(
            "within {stop_distance:.1} points of the stop-loss line"
        ));
        recommendations.push("reduce stakes or stop the session".to_string());
    } else if stop_distance < WARNING_STOP_DISTANCE {
        escalate(&mut status, HealthStatus::Warning);
        warnings.push(format!(
            "approaching stop-loss ({stop_distance:.1} points away)"
        ));
    }

    let nearest_take_profit = config
        .take_profit_levels
        .iter()
        .map(|&level| level - profit_pct)
        .filter(|d| *d > Decimal::ZERO)
        .min();
    if let Some(distance) = nearest_take_profit {
        if distance < TAKE_PROFIT_NOTE_DISTANCE {
            recommendations.push(format!(
                "take-profit level within {distance:.1} points; consider banking the win"
            ));
        }
    }

    let tilt = discipline::detect_tilt(bets).is_some();
    if tilt {
        escalate(&mut status, HealthStatus::Warning);
        warnings.push("tilt pattern detected in recent bets".to_string());
        recommendations.push("take a break before the next bet".to_string());
    }

    if state.violation_count > VIOLATION_WARNING_COUNT {
        escalate(&mut status, HealthStatus::Warning);
        warnings.push(format!(
            "{} discipline violations this session",
            state.violation_count
        ));
    }
    if state.tilt_events > TILT_WARNING_COUNT {
        escalate(&mut status, HealthStatus::Warning);
        warnings.push(format!("{} tilt events this session", state.tilt_events));
    }

    // Overbetting: recent average stake vs the recommended maximum.
    if !bets.is_empty() {
        let sample = &bets[bets.len().saturating_sub(RECENT_BET_SAMPLE)..];
        let avg: Decimal =
            sample.iter().map(|b| b.total_stake).sum::<Decimal>() / Decimal::from(sample.len());
        let max = discipline::recommended_max_stake(state, config);
        if avg > max {
            escalate(&mut status, HealthStatus::Warning);
            warnings.push(format!(
                "average recent stake {avg} exceeds the recommended maximum {max}"
            ));
            recommendations.push(format!(
                "flatten stakes toward {}",
                discipline::recommended_stake(state, config)
            ));
        }
    }

    let spins_remaining = config
        .max_spins
        .map(|max| max.saturating_sub(state.total_spins));
    if let Some(remaining) = spins_remaining {
        if remaining <= SPINS_REMAINING_NOTE {
            recommendations.push(format!("{remaining} spins left in the session budget"));
        }
    }

    HealthSnapshot {
        status,
        warnings,
        recommendations,
        profit_percent: profit_pct,
        stop_loss_distance: stop_distance,
        nearest_take_profit,
        spins_remaining,
        tilt,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{bet, config, state};

    #[test]
    fn test_fresh_session_is_ok_with_wide_stop_loss() {
        let mut cfg = config();
        cfg.stop_loss_percent = dec!(-50);
        let s = state(dec!(500));
        let h = health_snapshot(&s, &cfg, &[]);
        assert_eq!(h.status, HealthStatus::Ok);
        assert!(h.warnings.is_empty());
        assert_eq!(h.profit_percent, Decimal::ZERO);
        assert_eq!(h.stop_loss_distance, dec!(50));
    }

    #[test]
    fn test_band_edges_are_strict() {
        // exactly 20 points from the line: warning, not critical
        let s = state(dec!(500));
        let h = health_snapshot(&s, &config(), &[]);
        assert_eq!(h.stop_loss_distance, dec!(20));
        assert_eq!(h.status, HealthStatus::Warning);

        // exactly 40 points: ok
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(600);
        let h = health_snapshot(&s, &config(), &[]);
        assert_eq!(h.stop_loss_distance, dec!(40));
        assert_eq!(h.status, HealthStatus::Ok);
    }

    #[test]
    fn test_critical_near_stop_loss() {
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(420); // -16%, 4 points above the line
        let h = health_snapshot(&s, &config(), &[]);
        assert_eq!(h.status, HealthStatus::Critical);
        assert!(h.warnings.iter().any(|w| w.contains("stop-loss")));
        assert!(!h.recommendations.is_empty());
    }

    #[test]
    fn test_warning_band() {
        // +5% profit is 25 points above the -20% line: warning band
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(525);
        let h = health_snapshot(&s, &config(), &[]);
        assert_eq!(h.status, HealthStatus::Warning);
        assert!(h.warnings.iter().any(|w| w.contains("approaching")));
    }

    #[test]
    fn test_ok_far_from_stop_loss() {
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(650); // +30%, 50 points above the line
        let h = health_snapshot(&s, &config(), &[]);
        assert_eq!(h.status, HealthStatus::Ok);
    }

    #[test]
    fn test_take_profit_note() {
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(825); // +65%, 5 points below the 70 level
        let h = health_snapshot(&s, &config(), &[]);
        assert!(h
            .recommendations
            .iter()
            .any(|r| r.contains("take-profit")));
        assert_eq!(h.nearest_take_profit, Some(dec!(5)));
    }

    #[test]
    fn test_tilt_flag_escalates() {
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(650);
        let bets: Vec<BetRecord> = (0..3).map(|_| bet(dec!(5), false)).collect();
        let h = health_snapshot(&s, &config(), &bets);
        assert!(h.tilt);
        assert_eq!(h.status, HealthStatus::Warning);
    }

    #[test]
    fn test_violation_and_tilt_counters() {
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(650);
        s.violation_count = 6;
        s.tilt_events = 3;
        let h = health_snapshot(&s, &config(), &[]);
        assert_eq!(h.status, HealthStatus::Warning);
        assert!(h.warnings.iter().any(|w| w.contains("violations")));
        assert!(h.warnings.iter().any(|w| w.contains("tilt events")));
    }

    #[test]
    fn test_overbetting_warning() {
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(650);
        // recommended max = 650 * 5% = 32.5; average 40 is over
        let bets: Vec<BetRecord> = (0..5).map(|_| bet(dec!(40), true)).collect();
        let h = health_snapshot(&s, &config(), &bets);
        assert_eq!(h.status, HealthStatus::Warning);
        assert!(h
            .warnings
            .iter()
            .any(|w| w.contains("recommended maximum")));
    }

    #[test]
    fn test_spins_remaining_note() {
        let mut cfg = config();
        cfg.max_spins = Some(100);
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(650);
        s.total_spins = 95;
        let h = health_snapshot(&s, &cfg, &[]);
        assert_eq!(h.spins_remaining, Some(5));
        assert!(h.recommendations.iter().any(|r| r.contains("spins left")));
    }

    #[test]
    fn test_critical_outranks_warning() {
        let mut s = state(dec!(500));
        s.current_bankroll = dec!(405); // deep in the critical band
        s.violation_count = 10;
        let h = health_snapshot(&s, &config(), &[]);
        assert_eq!(h.status, HealthStatus::Critical);
        assert!(h.warnings.len() >= 2);
    }
}
