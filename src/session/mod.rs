//! Session lifecycle and state machine.
//!
//! A [`SessionEngine`] owns one session's history, bet log, and
//! [`SessionState`]. Every recorded spin or bet mutates the state
//! exactly once and returns the updated snapshot plus newly raised
//! alerts. Callers must serialize access per session (the API layer
//! wraps each engine in a `tokio::sync::Mutex`).

pub mod discipline;
pub mod health;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis;
use crate::rules::{EvaluationContext, RuleMatch, RuleStore};
use crate::suggest::{self, BetSuggestion, SuggestionInputs};
use crate::types::{
    Alert, AlertKind, AlertSeverity, EngineError, Outcome, SessionStatus, StopReason, WeightedPick,
};

pub use health::{health_snapshot, HealthSnapshot, HealthStatus};

/// History kept in memory per session.
const MAX_HISTORY: usize = 150;
/// Bet log kept in memory per session.
const MAX_BET_LOG: usize = 50;
/// Straight-up payout: a winning pick returns stake * 36.
const STRAIGHT_UP_RETURN: Decimal = dec!(36);
/// Minimum share of bet numbers that must appear in the suggested
/// patterns for the bet to count as pattern-following.
const PATTERN_MATCH_RATIO: f64 = 0.5;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-session discipline and analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub initial_bankroll: Decimal,
    /// Negative percentage, e.g. -20 stops at a 20% loss.
    pub stop_loss_percent: Decimal,
    /// Profit percentages checked in the given order, e.g. [30, 70].
    pub take_profit_levels: Vec<Decimal>,
    pub flat_bet_min_percent: Decimal,
    pub flat_bet_max_percent: Decimal,
    pub max_spins: Option<u32>,
    pub max_duration_minutes: Option<i64>,
    /// Lookback window for the analytics functions.
    pub lookback: usize,
    /// Minimum occurrences for a number to count as hot.
    pub hot_min_freq: usize,
    /// Per-number stake of the high-confidence tier.
    pub bingo_stake: Decimal,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.initial_bankroll <= Decimal::ZERO {
            return Err(EngineError::Validation(
                "initial bankroll must be positive".into(),
            ));
        }
        if self.stop_loss_percent >= Decimal::ZERO {
            return Err(EngineError::Validation(
                "stop-loss percent must be negative".into(),
            ));
        }
        if self.flat_bet_min_percent <= Decimal::ZERO
            || self.flat_bet_max_percent < self.flat_bet_min_percent
        {
            return Err(EngineError::Validation(
                "flat-bet percentages must satisfy 0 < min <= max".into(),
            ));
        }
        if self.take_profit_levels.iter().any(|&l| l <= Decimal::ZERO) {
            return Err(EngineError::Validation(
                "take-profit levels must be positive".into(),
            ));
        }
        if self.lookback == 0 {
            return Err(EngineError::Validation("lookback must be positive".into()));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            initial_bankroll: dec!(500),
            stop_loss_percent: dec!(-20),
            take_profit_levels: vec![dec!(30), dec!(70)],
            flat_bet_min_percent: dec!(1),
            flat_bet_max_percent: dec!(5),
            max_spins: Some(200),
            max_duration_minutes: Some(240),
            lookback: 30,
            hot_min_freq: 3,
            bingo_stake: dec!(2),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Snapshot of one session's discipline state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub initial_bankroll: Decimal,
    pub current_bankroll: Decimal,
    /// Highest profit reached; never decreases.
    pub peak_profit: Decimal,
    pub total_spins: u32,
    pub total_bets: u32,
    pub violation_count: u32,
    pub tilt_events: u32,
    pub status: SessionStatus,
    pub stop_reason: Option<StopReason>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn new(initial_bankroll: Decimal) -> Self {
        SessionState {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            initial_bankroll,
            current_bankroll: initial_bankroll,
            peak_profit: Decimal::ZERO,
            total_spins: 0,
            total_bets: 0,
            violation_count: 0,
            tilt_events: 0,
            status: SessionStatus::Active,
            stop_reason: None,
            stopped_at: None,
        }
    }

    pub fn profit(&self) -> Decimal {
        self.current_bankroll - self.initial_bankroll
    }
}

/// One placed bet with its validation verdict and settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    pub id: Uuid,
    pub picks: Vec<WeightedPick>,
    pub total_stake: Decimal,
    pub validated: bool,
    pub violations: Vec<String>,
    /// Filled in when the next spin settles the bet.
    pub payout: Option<Decimal>,
    pub placed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns one session end to end.
pub struct SessionEngine {
    config: SessionConfig,
    state: SessionState,
    /// Most-recent-first, bounded to [`MAX_HISTORY`].
    history: Vec<Outcome>,
    /// Chronological bet log, bounded to [`MAX_BET_LOG`].
    bets: Vec<BetRecord>,
    /// Bets placed since the last spin, awaiting settlement.
    pending: Vec<BetRecord>,
    /// Rule matches from the latest evaluation, used for hit tracking
    /// and pattern-following checks.
    last_matches: Vec<RuleMatch>,
}

impl SessionEngine {
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let state = SessionState::new(config.initial_bankroll);
        info!(
            session = %state.id,
            bankroll = %state.initial_bankroll,
            stop_loss = %config.stop_loss_percent,
            "Session started"
        );
        Ok(SessionEngine {
            config,
            state,
            history: Vec::new(),
            bets: Vec::new(),
            pending: Vec::new(),
            last_matches: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> &[Outcome] {
        &self.history
    }

    pub fn bets(&self) -> &[BetRecord] {
        &self.bets
    }

    pub fn last_matches(&self) -> &[RuleMatch] {
        &self.last_matches
    }

    // -- spins ---------------------------------------------------------------

    /// Record a spin: settle pending bets, track rule hits, re-evaluate
    /// rules, and run the discipline checks.
    pub fn record_outcome(
        &mut self,
        number: u8,
        rules: &RuleStore,
    ) -> Result<(SessionState, Vec<Alert>), EngineError> {
        self.require_active()?;
        let outcome = Outcome::new(number, self.state.total_spins + 1)?;
        let mut alerts = Vec::new();

        self.settle_pending(&outcome);

        // Rules whose previous suggestions contained the winner scored a hit.
        let hit_ids: Vec<Uuid> = self
            .last_matches
            .iter()
            .filter(|m| m.suggestions.contains(&number))
            .map(|m| m.rule_id)
            .collect();
        if !hit_ids.is_empty() {
            rules.record_hits(&hit_ids);
        }

        self.history.insert(0, outcome);
        self.history.truncate(MAX_HISTORY);
        self.state.total_spins += 1;

        let profit = self.state.profit();
        if profit > self.state.peak_profit {
            self.state.peak_profit = profit;
        }

        self.last_matches = rules.evaluate(&EvaluationContext {
            history: &self.history,
            session_spins: self.state.total_spins,
            lookback: self.config.lookback,
        });

        // The first tripped limit becomes the stop reason; the rest
        // still raise their own alerts.
        let reasons = discipline::check_stop(&self.state, &self.config, Utc::now());
        if let Some((&first, rest)) = reasons.split_first() {
            self.stop_with(first, &mut alerts);
            for &reason in rest {
                alerts.push(Alert::new(
                    self.state.id,
                    alert_kind(reason),
                    alert_severity(reason),
                    format!("discipline limit also reached: {reason}"),
                ));
            }
        }

        Ok((self.state.clone(), alerts))
    }

    /// Bulk-import spins observed before the session joined the table.
    /// They feed the analytics history but trigger no discipline checks
    /// or rule bookkeeping.
    pub fn import_history(&mut self, numbers: &[u8]) -> Result<usize, EngineError> {
        self.require_active()?;
        for &number in numbers {
            let outcome = Outcome::new(number, self.state.total_spins + 1)?;
            self.history.insert(0, outcome);
            self.history.truncate(MAX_HISTORY);
            self.state.total_spins += 1;
        }
        info!(session = %self.state.id, imported = numbers.len(), "Historical spins imported");
        Ok(numbers.len())
    }

    // -- bets ----------------------------------------------------------------

    /// Record a bet: validate the stake, deduct it, and flag tilt.
    /// Violating bets are accepted but marked unvalidated.
    pub fn record_bet(
        &mut self,
        picks: Vec<WeightedPick>,
    ) -> Result<(SessionState, Vec<Alert>), EngineError> {
        self.require_active()?;
        if picks.is_empty() {
            return Err(EngineError::Validation("a bet needs at least one pick".into()));
        }
        if let Some(bad) = picks.iter().find(|p| p.number > 36) {
            return Err(EngineError::Validation(format!(
                "pick {} outside 0-36",
                bad.number
            )));
        }

        let total_stake: Decimal = picks.iter().map(|p| p.stake).sum();
        let previous = self.bets.last().map(|b| b.total_stake);
        let mut violations =
            discipline::validate_stake(&self.state, &self.config, total_stake, previous);

        if !self.matches_patterns(&picks) {
            violations.push("bet diverges from the suggested patterns".to_string());
        }

        let mut alerts = Vec::new();
        let validated = violations.is_empty();
        if !validated {
            self.state.violation_count += 1;
            warn!(
                session = %self.state.id,
                violations = violations.len(),
                "Bet violates discipline rules"
            );
            alerts.push(Alert::new(
                self.state.id,
                AlertKind::BetRuleViolation,
                AlertSeverity::Warning,
                violations.join("; "),
            ));
        }

        self.state.current_bankroll -= total_stake;
        self.state.total_bets += 1;

        let record = BetRecord {
            id: Uuid::new_v4(),
            picks,
            total_stake,
            validated,
            violations,
            payout: None,
            placed_at: Utc::now(),
        };
        self.pending.push(record.clone());
        self.bets.push(record);
        if self.bets.len() > MAX_BET_LOG {
            self.bets.remove(0);
        }

        if let Some(evidence) = discipline::detect_tilt(&self.bets) {
            self.state.tilt_events += 1;
            alerts.push(Alert::new(
                self.state.id,
                AlertKind::TiltDetected,
                AlertSeverity::Warning,
                evidence,
            ));
        }

        if self.state.current_bankroll <= Decimal::ZERO {
            self.stop_with(StopReason::BankrollDepleted, &mut alerts);
        }

        Ok((self.state.clone(), alerts))
    }

    /// Stop the session manually.
    pub fn stop(&mut self) -> Result<(SessionState, Vec<Alert>), EngineError> {
        self.require_active()?;
        let mut alerts = Vec::new();
        self.stop_with(StopReason::ManualStop, &mut alerts);
        Ok((self.state.clone(), alerts))
    }

    // -- queries ---------------------------------------------------------------

    /// Synthesize a bet suggestion from the current history and rules.
    pub fn suggestion(&self, rules: &RuleStore) -> BetSuggestion {
        let hot = analysis::hot_numbers(&self.history, self.config.lookback, self.config.hot_min_freq);
        let missing = analysis::missing_numbers(&self.history, self.config.lookback, 10);
        let section = analysis::section_signal(&self.history, self.config.lookback);
        let matches = rules.evaluate(&EvaluationContext {
            history: &self.history,
            session_spins: self.state.total_spins,
            lookback: self.config.lookback,
        });

        suggest::synthesize(
            &SuggestionInputs {
                hot_numbers: &hot,
                missing_numbers: &missing,
                section: section.as_ref(),
                rule_matches: &matches,
            },
            self.config.bingo_stake,
            discipline::recommended_max_stake(&self.state, &self.config),
            suggest::DEFAULT_MAX_PICKS,
        )
    }

    /// Current health summary.
    pub fn health(&self) -> HealthSnapshot {
        health_snapshot(&self.state, &self.config, &self.bets)
    }

    // -- internals -------------------------------------------------------------

    fn require_active(&self) -> Result<(), EngineError> {
        if self.state.status.is_active() {
            Ok(())
        } else {
            Err(EngineError::State(format!(
                "session {} is {}",
                self.state.id, self.state.status
            )))
        }
    }

    fn settle_pending(&mut self, outcome: &Outcome) {
        for pending in self.pending.drain(..) {
            let payout: Decimal = pending
                .picks
                .iter()
                .filter(|p| p.number == outcome.number)
                .map(|p| p.stake * STRAIGHT_UP_RETURN)
                .sum();
            self.state.current_bankroll += payout;
            if let Some(record) = self.bets.iter_mut().find(|b| b.id == pending.id) {
                record.payout = Some(payout);
            }
            if payout > Decimal::ZERO {
                info!(
                    session = %self.state.id,
                    number = outcome.number,
                    %payout,
                    "Winning bet settled"
                );
            }
        }
    }

    /// At least half of the bet numbers must appear in the latest rule
    /// suggestions for the bet to count as pattern-following. With no
    /// active matches, any bet passes.
    fn matches_patterns(&self, picks: &[WeightedPick]) -> bool {
        if self.last_matches.is_empty() || picks.is_empty() {
            return true;
        }
        let suggested: Vec<u8> = self
            .last_matches
            .iter()
            .flat_map(|m| m.suggestions.iter().copied())
            .collect();
        let covered = picks
            .iter()
            .filter(|p| suggested.contains(&p.number))
            .count();
        covered as f64 / picks.len() as f64 >= PATTERN_MATCH_RATIO
    }

    fn stop_with(&mut self, reason: StopReason, alerts: &mut Vec<Alert>) {
        self.state.status = SessionStatus::Stopped;
        self.state.stop_reason = Some(reason);
        self.state.stopped_at = Some(Utc::now());
        info!(
            session = %self.state.id,
            %reason,
            profit = %self.state.profit(),
            "Session stopped"
        );
        alerts.push(Alert::new(
            self.state.id,
            alert_kind(reason),
            alert_severity(reason),
            format!("session stopped: {reason} (profit {})", self.state.profit()),
        ));
    }
}

fn alert_kind(reason: StopReason) -> AlertKind {
    match reason {
        StopReason::StopLossHit => AlertKind::StopLossHit,
        StopReason::TakeProfitReached => AlertKind::TakeProfitReached,
        StopReason::MaxSpinsReached => AlertKind::MaxSpinsReached,
        StopReason::MaxDurationReached => AlertKind::MaxDurationReached,
        StopReason::TiltDetected => AlertKind::TiltDetected,
        _ => AlertKind::SessionEnded,
    }
}

fn alert_severity(reason: StopReason) -> AlertSeverity {
    match reason {
        StopReason::StopLossHit | StopReason::TiltDetected | StopReason::BankrollDepleted => {
            AlertSeverity::Critical
        }
        _ => AlertSeverity::Info,
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
